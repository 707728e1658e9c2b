//! # Admin Publish Endpoint
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/admin/publicar` | `publish_modules` |
//!
//! Multipart upload of new module artifacts. Each uploaded file is relayed
//! to the transfer destination (renamed and, for executables, zipped),
//! then the resulting version/artifact pairs are merged with the latest
//! ledger snapshot and appended as one new ledger entry. All-or-nothing:
//! any relay failure aborts the request before the ledger write.
//!
//! ## Multipart fields
//!
//! - `credencial` — admin credential (required).
//! - `arquivo_folha` / `arquivo_fiscal` / `arquivo_contabil` — module
//!   file, with its original client-side filename (each optional).
//! - `timestamp_folha` / `timestamp_fiscal` / `timestamp_contabil` —
//!   client-side upload timestamp in milliseconds since epoch (required
//!   alongside the matching file).

use std::collections::BTreeMap;

use axum::extract::multipart::Multipart;
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use updhub_core::{reconcile, ModuleKey, ModuleRelease};

use crate::error::AppError;
use crate::state::AppState;

/// Uploads may carry three installers; keep headroom above the default
/// request body cap.
const PUBLISH_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Final per-module version/artifact map after the publish.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub versao_folha: Option<String>,
    pub versao_fiscal: Option<String>,
    pub versao_contabil: Option<String>,
    pub arquivo_folha: Option<String>,
    pub arquivo_fiscal: Option<String>,
    pub arquivo_contabil: Option<String>,
}

/// One module's parsed upload parts.
#[derive(Debug, Default)]
struct ModuleUpload {
    file: Option<(String, Vec<u8>)>,
    timestamp_millis: Option<i64>,
}

/// Everything extracted from the multipart body.
#[derive(Debug, Default)]
struct PublishForm {
    credential: Option<String>,
    uploads: BTreeMap<ModuleKey, ModuleUpload>,
}

/// Build the admin publish router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/publicar", post(publish_modules))
        .layer(DefaultBodyLimit::max(PUBLISH_BODY_LIMIT))
}

/// POST /admin/publicar — relay uploaded module artifacts and record the
/// post-merge publication state in the version ledger.
#[utoipa::path(
    post,
    path = "/admin/publicar",
    request_body(content = String, content_type = "multipart/form-data", description = "Admin credential plus up to three (file, timestamp) pairs"),
    responses(
        (status = 200, description = "Publication recorded", body = PublishResponse),
        (status = 400, description = "Wrong-slot filename, missing timestamp, or malformed multipart", body = crate::error::ErrorBody),
        (status = 401, description = "Bad admin credential", body = crate::error::ErrorBody),
        (status = 500, description = "Relay unconfigured, transfer failure, or store failure", body = crate::error::ErrorBody),
    ),
    tag = "publish"
)]
pub async fn publish_modules(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<PublishResponse>, AppError> {
    let form = parse_form(multipart).await?;

    if !state.has_admin_credential() {
        return Err(AppError::Config("no admin credential configured".into()));
    }
    let presented = form
        .credential
        .as_deref()
        .ok_or_else(|| AppError::Unauthorized("missing admin credential".into()))?;
    if !state.admin_credential_matches(presented) {
        return Err(AppError::Unauthorized("wrong admin credential".into()));
    }

    let relay = state
        .relay
        .as_ref()
        .ok_or_else(|| AppError::Config("transfer destination not configured".into()))?;

    // Relay every uploaded module before touching the ledger: a transfer
    // failure must leave no partial ledger entry behind.
    let mut updates: BTreeMap<ModuleKey, ModuleRelease> = BTreeMap::new();
    for (module, upload) in &form.uploads {
        let Some((filename, payload)) = &upload.file else {
            continue;
        };
        let timestamp = upload.timestamp_millis.ok_or_else(|| {
            AppError::Validation(format!("missing timestamp_{module} for uploaded file"))
        })?;

        let published = relay.publish(*module, filename, payload, timestamp).await?;
        updates.insert(
            *module,
            ModuleRelease::new(published.version, published.filename),
        );
    }

    if updates.is_empty() {
        return Err(AppError::Validation("no module file uploaded".into()));
    }

    // Read-merge-append without locking: two concurrent publishes can
    // interleave here and the later append wins with a merge computed
    // against a stale prior. Accepted — publishing is a single-admin
    // operation.
    let prior = state.ledger.latest().await?;
    let merged = reconcile(prior.as_ref().map(|e| &e.snapshot), &updates);
    state.ledger.append(&merged).await?;

    tracing::info!(
        modules = ?updates.keys().collect::<Vec<_>>(),
        "publication recorded"
    );

    Ok(Json(PublishResponse {
        versao_folha: merged.payroll.as_ref().map(|r| r.version.clone()),
        versao_fiscal: merged.fiscal.as_ref().map(|r| r.version.clone()),
        versao_contabil: merged.accounting.as_ref().map(|r| r.version.clone()),
        arquivo_folha: merged.payroll.as_ref().map(|r| r.artifact.clone()),
        arquivo_fiscal: merged.fiscal.as_ref().map(|r| r.artifact.clone()),
        arquivo_contabil: merged.accounting.as_ref().map(|r| r.artifact.clone()),
    }))
}

/// Drain the multipart stream into a [`PublishForm`]. Unknown fields are
/// ignored so the admin form can evolve without breaking the server.
async fn parse_form(mut multipart: Multipart) -> Result<PublishForm, AppError> {
    let mut form = PublishForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "credencial" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable credencial: {e}")))?;
                form.credential = Some(value);
            }
            "arquivo_folha" | "arquivo_fiscal" | "arquivo_contabil" => {
                let module = module_for_field(&name);
                let filename = field.file_name().map(str::to_string).ok_or_else(|| {
                    AppError::Validation(format!("{name} is missing its original filename"))
                })?;
                let payload = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable {name}: {e}")))?;
                form.uploads.entry(module).or_default().file = Some((filename, payload.to_vec()));
            }
            "timestamp_folha" | "timestamp_fiscal" | "timestamp_contabil" => {
                let module = module_for_field(&name);
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable {name}: {e}")))?;
                let millis = raw.trim().parse::<i64>().map_err(|_| {
                    AppError::Validation(format!("{name} is not a millisecond timestamp: {raw:?}"))
                })?;
                form.uploads.entry(module).or_default().timestamp_millis = Some(millis);
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

/// Map a multipart field name suffix to its module slot.
fn module_for_field(name: &str) -> ModuleKey {
    if name.ends_with("folha") {
        ModuleKey::Payroll
    } else if name.ends_with("fiscal") {
        ModuleKey::Fiscal
    } else {
        ModuleKey::Accounting
    }
}
