//! # Update Status Endpoint
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/atualizacao/:numero_serie` | `update_status` |
//!
//! Read-only view a client installation polls to learn what it is
//! authorized to run and which artifact versions are current. Missing data
//! is not an error: an unknown serial reports all-false flags and a null
//! serial, an empty ledger reports null versions — always HTTP 200.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use updhub_core::ReleaseSnapshot;

use crate::error::AppError;
use crate::state::AppState;

/// Combined authorization and version view for one client installation.
///
/// Field names (including the `numeroSerieAutualizacao` spelling) are the
/// original service's wire contract — deployed clients parse these keys.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub autoriza_folha: bool,
    pub autoriza_fiscal: bool,
    pub autoriza_contabil: bool,
    #[serde(rename = "numeroSerieAutualizacao")]
    pub numero_serie_autualizacao: Option<String>,
    pub versao_folha: Option<String>,
    pub versao_fiscal: Option<String>,
    pub versao_contabil: Option<String>,
    pub arquivo_folha: Option<String>,
    pub arquivo_fiscal: Option<String>,
    pub arquivo_contabil: Option<String>,
}

impl UpdateStatusResponse {
    /// Fill the version/artifact fields from a ledger snapshot.
    pub(crate) fn with_snapshot(mut self, snapshot: &ReleaseSnapshot) -> Self {
        self.versao_folha = snapshot.payroll.as_ref().map(|r| r.version.clone());
        self.arquivo_folha = snapshot.payroll.as_ref().map(|r| r.artifact.clone());
        self.versao_fiscal = snapshot.fiscal.as_ref().map(|r| r.version.clone());
        self.arquivo_fiscal = snapshot.fiscal.as_ref().map(|r| r.artifact.clone());
        self.versao_contabil = snapshot.accounting.as_ref().map(|r| r.version.clone());
        self.arquivo_contabil = snapshot.accounting.as_ref().map(|r| r.artifact.clone());
        self
    }

    fn unauthorized() -> Self {
        Self {
            autoriza_folha: false,
            autoriza_fiscal: false,
            autoriza_contabil: false,
            numero_serie_autualizacao: None,
            versao_folha: None,
            versao_fiscal: None,
            versao_contabil: None,
            arquivo_folha: None,
            arquivo_fiscal: None,
            arquivo_contabil: None,
        }
    }
}

/// Build the update status router.
pub fn router() -> Router<AppState> {
    Router::new().route("/atualizacao/:numero_serie", get(update_status))
}

/// GET /atualizacao/:numero_serie — authorization flags and latest
/// published versions for one client installation.
#[utoipa::path(
    get,
    path = "/atualizacao/{numero_serie}",
    params(("numero_serie" = String, Path, description = "Client installation serial number")),
    responses(
        (status = 200, description = "Authorization and version state (missing data maps to false/null)", body = UpdateStatusResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorBody),
    ),
    tag = "updates"
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(numero_serie): Path<String>,
) -> Result<Json<UpdateStatusResponse>, AppError> {
    // Unknown serial is unauthorized-by-default, not an error.
    let mut response = match state.auth_store.get(&numero_serie).await? {
        Some(record) => UpdateStatusResponse {
            autoriza_folha: record.payroll,
            autoriza_fiscal: record.fiscal,
            autoriza_contabil: record.accounting,
            numero_serie_autualizacao: Some(record.serial),
            ..UpdateStatusResponse::unauthorized()
        },
        None => UpdateStatusResponse::unauthorized(),
    };

    if let Some(entry) = state.ledger.latest().await? {
        response = response.with_snapshot(&entry.snapshot);
    }

    Ok(Json(response))
}
