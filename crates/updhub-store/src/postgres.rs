//! Postgres implementations of the store traits.
//!
//! Table and column names are inherited from the original service's schema
//! (`atualizacao`, `atualizacao_autorizacao`) so an existing database can
//! be pointed at this server unchanged. Row structs map nullable columns
//! to domain types explicitly — nullable authorization flags become
//! `false`, never an error.

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use updhub_core::{ModuleRelease, ReleaseSnapshot};

use crate::{AuthorizationRecord, AuthorizationStore, LedgerEntry, StoreError, VersionLedger};

/// Initialize the connection pool and run embedded migrations.
///
/// Returns `Ok(None)` when `DATABASE_URL` is not set — the caller falls
/// back to the in-memory stores (development and test mode). Returns `Err`
/// when the URL is set but the connection or a migration fails.
pub async fn init_pool() -> Result<Option<PgPool>, StoreError> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(
                "DATABASE_URL not set — using in-memory stores. \
                 Authorizations and the version ledger will not survive restarts."
            );
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(&url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(sqlx::Error::from)?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}

/// Authorization store backed by the `atualizacao_autorizacao` table.
#[derive(Debug, Clone)]
pub struct PgAuthorizationStore {
    pool: PgPool,
}

impl PgAuthorizationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuthorizationStore for PgAuthorizationStore {
    async fn get(&self, serial: &str) -> Result<Option<AuthorizationRecord>, StoreError> {
        let row = sqlx::query_as::<_, AuthorizationRow>(
            "SELECT numero_serie_atualizacao, autoriza_folha, autoriza_fiscal,
             autoriza_contabil, documento
             FROM atualizacao_autorizacao
             WHERE numero_serie_atualizacao = $1",
        )
        .bind(serial)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(AuthorizationRow::into_record))
    }

    async fn upsert(&self, record: &AuthorizationRecord) -> Result<(), StoreError> {
        // Single statement, atomic at the store level.
        sqlx::query(
            "INSERT INTO atualizacao_autorizacao
             (numero_serie_atualizacao, autoriza_folha, autoriza_fiscal,
              autoriza_contabil, documento)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (numero_serie_atualizacao) DO UPDATE SET
               autoriza_folha = EXCLUDED.autoriza_folha,
               autoriza_fiscal = EXCLUDED.autoriza_fiscal,
               autoriza_contabil = EXCLUDED.autoriza_contabil,
               documento = EXCLUDED.documento",
        )
        .bind(&record.serial)
        .bind(record.payroll)
        .bind(record.fiscal)
        .bind(record.accounting)
        .bind(&record.descriptor)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Version ledger backed by the append-only `atualizacao` table.
#[derive(Debug, Clone)]
pub struct PgVersionLedger {
    pool: PgPool,
}

impl PgVersionLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl VersionLedger for PgVersionLedger {
    async fn latest(&self) -> Result<Option<LedgerEntry>, StoreError> {
        let row = sqlx::query_as::<_, LedgerRow>(
            "SELECT versao_folha, arquivo_folha, versao_fiscal, arquivo_fiscal,
             versao_contabil, arquivo_contabil, data_publicacao
             FROM atualizacao
             ORDER BY data_publicacao DESC, id DESC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(LedgerRow::into_entry))
    }

    async fn append(&self, snapshot: &ReleaseSnapshot) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO atualizacao
             (versao_folha, arquivo_folha, versao_fiscal, arquivo_fiscal,
              versao_contabil, arquivo_contabil)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(snapshot.payroll.as_ref().map(|r| r.version.as_str()))
        .bind(snapshot.payroll.as_ref().map(|r| r.artifact.as_str()))
        .bind(snapshot.fiscal.as_ref().map(|r| r.version.as_str()))
        .bind(snapshot.fiscal.as_ref().map(|r| r.artifact.as_str()))
        .bind(snapshot.accounting.as_ref().map(|r| r.version.as_str()))
        .bind(snapshot.accounting.as_ref().map(|r| r.artifact.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct AuthorizationRow {
    numero_serie_atualizacao: String,
    autoriza_folha: Option<bool>,
    autoriza_fiscal: Option<bool>,
    autoriza_contabil: Option<bool>,
    documento: Option<String>,
}

impl AuthorizationRow {
    fn into_record(self) -> AuthorizationRecord {
        AuthorizationRecord {
            serial: self.numero_serie_atualizacao,
            // Nullable flag columns: absent means not authorized.
            payroll: self.autoriza_folha.unwrap_or(false),
            fiscal: self.autoriza_fiscal.unwrap_or(false),
            accounting: self.autoriza_contabil.unwrap_or(false),
            descriptor: self.documento,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LedgerRow {
    versao_folha: Option<String>,
    arquivo_folha: Option<String>,
    versao_fiscal: Option<String>,
    arquivo_fiscal: Option<String>,
    versao_contabil: Option<String>,
    arquivo_contabil: Option<String>,
    data_publicacao: DateTime<Utc>,
}

impl LedgerRow {
    fn into_entry(self) -> LedgerEntry {
        LedgerEntry {
            snapshot: ReleaseSnapshot {
                payroll: module_release("folha", self.versao_folha, self.arquivo_folha),
                fiscal: module_release("fiscal", self.versao_fiscal, self.arquivo_fiscal),
                accounting: module_release(
                    "contabil",
                    self.versao_contabil,
                    self.arquivo_contabil,
                ),
            },
            published_at: self.data_publicacao,
        }
    }
}

/// A module slot is published iff its version column is non-null. A row
/// with a version but no artifact is legacy inconsistency — keep the
/// version and warn rather than dropping the slot.
fn module_release(
    module: &str,
    version: Option<String>,
    artifact: Option<String>,
) -> Option<ModuleRelease> {
    let version = version?;
    let artifact = artifact.unwrap_or_else(|| {
        tracing::warn!(module, %version, "ledger row has a version but no artifact filename");
        String::new()
    });
    Some(ModuleRelease { version, artifact })
}
