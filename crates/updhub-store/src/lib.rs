//! # updhub-store — Persistence Adapters
//!
//! Two logical tables back the service, both owned by the external store:
//!
//! - **authorization-by-serial** (`atualizacao_autorizacao`): one row per
//!   client serial number with three independent module authorization
//!   flags and an optional free-text descriptor. Upsert-only, last write
//!   wins, no history.
//! - **version ledger** (`atualizacao`): append-only publication events,
//!   each a whole-row snapshot of all three modules' version/artifact
//!   state, timestamped by the store at insert.
//!
//! The [`AuthorizationStore`] and [`VersionLedger`] traits are object-safe
//! so the API layer can run against Postgres ([`postgres`]) in production
//! and the in-memory implementations ([`memory`]) in development and tests.
//! Connections are acquired per operation from the sqlx pool and released
//! on every exit path.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use updhub_core::ReleaseSnapshot;

pub use memory::{MemoryAuthorizationStore, MemoryVersionLedger};
pub use postgres::{init_pool, PgAuthorizationStore, PgVersionLedger};

/// Store backend failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection, query, or migration failure.
    #[error("store backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Module authorization flags for one client installation.
///
/// At most one record exists per serial number. Missing records are not an
/// error — callers map "not found" to all-flags-false with no descriptor
/// (unauthorized by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    /// Opaque client-installation identifier, the record key.
    pub serial: String,
    /// Payroll module authorized.
    pub payroll: bool,
    /// Fiscal module authorized.
    pub fiscal: bool,
    /// Accounting module authorized.
    pub accounting: bool,
    /// Free-form descriptor reported by the client (e.g. a tax document
    /// number). Not interpreted by the service.
    pub descriptor: Option<String>,
}

/// One immutable publication event in the version ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Full post-merge release state at publication time.
    pub snapshot: ReleaseSnapshot,
    /// Publication timestamp, assigned by the store at insert.
    pub published_at: DateTime<Utc>,
}

/// Authorization flags keyed by client serial number.
#[async_trait]
pub trait AuthorizationStore: Send + Sync {
    /// Look up the authorization record for a serial. `Ok(None)` means no
    /// record exists — the caller decides what that implies.
    async fn get(&self, serial: &str) -> Result<Option<AuthorizationRecord>, StoreError>;

    /// Insert or replace the record for `record.serial`.
    ///
    /// Idempotent; repeated identical calls change nothing observable.
    /// Concurrent upserts to the same serial are last-write-wins — each
    /// serial belongs to one real installation, so the race is accepted
    /// rather than guarded with optimistic locking.
    async fn upsert(&self, record: &AuthorizationRecord) -> Result<(), StoreError>;
}

/// Append-only ledger of publication events.
#[async_trait]
pub trait VersionLedger: Send + Sync {
    /// The entry with the maximum publication timestamp, ties broken by
    /// insertion order (most recently inserted wins — the store assigns
    /// timestamps with limited resolution).
    async fn latest(&self) -> Result<Option<LedgerEntry>, StoreError>;

    /// Append one publication event. Always inserts, never updates, even
    /// when only one module changed — storage growth is the price of an
    /// immutable history and trivial "latest" semantics.
    async fn append(&self, snapshot: &ReleaseSnapshot) -> Result<(), StoreError>;
}
