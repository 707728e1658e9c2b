//! # Synchronization Endpoint
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/sincronizar/:numero_serie` | `synchronize` |
//!
//! A client installation reports which modules it found installed, gated
//! by the time-coded synchronization password. A valid request upserts the
//! serial's authorization flags — the found flags become the authorized
//! flags, last write wins.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use updhub_store::AuthorizationRecord;

use crate::error::AppError;
use crate::state::AppState;

/// Synchronization request body. Field names are the original wire
/// contract.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncRequest {
    /// 12-character time-coded password; see `updhub_core::password`.
    pub senha_sincronizar: String,
    /// Client found the payroll module installed.
    #[serde(default)]
    pub folha_encontrado: bool,
    /// Client found the fiscal module installed.
    #[serde(default)]
    pub fiscal_encontrado: bool,
    /// Client found the accounting module installed.
    #[serde(default)]
    pub contabil_encontrado: bool,
    /// Free-form descriptor (e.g. the installation's document number).
    #[serde(default)]
    pub documento: Option<String>,
}

/// Echoed authorization state after a successful synchronization.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub autoriza_folha: bool,
    pub autoriza_fiscal: bool,
    pub autoriza_contabil: bool,
    #[serde(rename = "numeroSerieAutualizacao")]
    pub numero_serie_autualizacao: String,
    pub documento: Option<String>,
}

/// Build the synchronization router.
pub fn router() -> Router<AppState> {
    Router::new().route("/sincronizar/:numero_serie", post(synchronize))
}

/// POST /sincronizar/:numero_serie — validate the synchronization password
/// and upsert the serial's authorization flags.
///
/// The password embeds today's date in UTC; clients must mint it from the
/// UTC calendar date, not their local zone.
#[utoipa::path(
    post,
    path = "/sincronizar/{numero_serie}",
    params(("numero_serie" = String, Path, description = "Client installation serial number")),
    request_body = SyncRequest,
    responses(
        (status = 200, description = "Authorization upserted", body = SyncResponse),
        (status = 400, description = "Malformed or mismatched password", body = crate::error::ErrorBody),
        (status = 500, description = "Store failure", body = crate::error::ErrorBody),
    ),
    tag = "sync"
)]
pub async fn synchronize(
    State(state): State<AppState>,
    Path(numero_serie): Path<String>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    updhub_core::password::validate(&request.senha_sincronizar, Utc::now().date_naive())?;

    let record = AuthorizationRecord {
        serial: numero_serie,
        payroll: request.folha_encontrado,
        fiscal: request.fiscal_encontrado,
        accounting: request.contabil_encontrado,
        descriptor: request.documento,
    };
    state.auth_store.upsert(&record).await?;

    tracing::info!(serial = %record.serial, "client synchronized");

    Ok(Json(SyncResponse {
        autoriza_folha: record.payroll,
        autoriza_fiscal: record.fiscal,
        autoriza_contabil: record.accounting,
        numero_serie_autualizacao: record.serial,
        documento: record.descriptor,
    }))
}
