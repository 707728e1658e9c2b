//! # updhub-api — HTTP Surface
//!
//! Licensing-and-update coordination service: tracks which software
//! modules (payroll, fiscal, accounting) a client installation is
//! authorized to use, records the latest published artifact per module,
//! and lets an administrator publish new module artifacts.
//!
//! ## API Surface
//!
//! | Path                          | Module              | Caller |
//! |-------------------------------|---------------------|--------|
//! | `GET /atualizacao/:serie`     | [`routes::updates`] | client |
//! | `POST /sincronizar/:serie`    | [`routes::sync`]    | client |
//! | `POST /admin/publicar`        | [`routes::publish`] | admin  |
//! | `GET /openapi.json`           | [`openapi`]         | tooling|
//! | `GET /health/{liveness,readiness}` | here           | probes |
//!
//! Requests are handled independently — no background tasks, no in-process
//! queues; the only shared resources are the store and the transfer sink.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the application router.
///
/// Health probes stay outside the request body limit and are always
/// reachable; the publish route overrides the default body cap with its
/// own upload-sized limit.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::updates::router())
        .merge(routes::sync::router())
        .merge(routes::publish::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(512 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(health).merge(api)
}

/// GET /health/liveness — 200 while the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// GET /health/readiness — verifies the store answers a read.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.ledger.latest().await {
        Ok(_) => (StatusCode::OK, "ready").into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "store unreachable").into_response()
        }
    }
}
