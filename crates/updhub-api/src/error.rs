//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from updhub-store and updhub-relay to HTTP status
//! codes and a JSON error body. Backend details (store, relay,
//! configuration) are logged but never exposed in responses.
//!
//! Validation failures map to **400** — the wire contract inherited from
//! the original service, which deployed clients check by status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use updhub_relay::RelayError;
use updhub_store::StoreError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Client sent something the request contract rejects: a malformed or
    /// mismatched synchronization password, a wrong-slot filename, a
    /// missing upload timestamp, malformed multipart framing (400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Admin credential missing or wrong (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Server-side configuration is incomplete (500). Operator-visible
    /// via logs only.
    #[error("configuration error: {0}")]
    Config(String),

    /// Persistent store failure (500). Details are logged, not returned.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Artifact relay or packaging failure (500). Details are logged,
    /// not returned.
    #[error("relay error: {0}")]
    Relay(String),
}

impl AppError {
    /// HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            Self::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            Self::Relay(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RELAY_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose backend or configuration details to clients.
        let message = match &self {
            Self::Config(_) => "server configuration is incomplete".to_string(),
            Self::Store(_) => "persistent store is unavailable".to_string(),
            Self::Relay(_) => "artifact transfer failed".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Config(_) => tracing::error!(error = %self, "incomplete configuration"),
            Self::Store(_) => tracing::error!(error = %self, "store failure"),
            Self::Relay(_) => tracing::error!(error = %self, "relay failure"),
            Self::Unauthorized(_) => tracing::warn!(error = %self, "rejected admin credential"),
            Self::Validation(_) => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Relay errors split by blame: bad input from the admin is a 400,
/// delivery trouble is a 500.
impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::NameMismatch { .. } | RelayError::BadTimestamp { .. } => {
                Self::Validation(err.to_string())
            }
            RelayError::Packaging { .. }
            | RelayError::Transfer { .. }
            | RelayError::CredentialsRejected { .. } => Self::Relay(err.to_string()),
        }
    }
}

/// Password failures are user-visible validation errors.
impl From<updhub_core::PasswordError> for AppError {
    fn from(err: updhub_core::PasswordError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use updhub_core::ModuleKey;

    /// Extract status and decoded body from a response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[test]
    fn validation_is_400() {
        let (status, code) = AppError::Validation("bad password".into()).status_and_code();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(code, "VALIDATION_ERROR");
    }

    #[test]
    fn unauthorized_is_401() {
        let (status, code) = AppError::Unauthorized("wrong credential".into()).status_and_code();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(code, "UNAUTHORIZED");
    }

    #[test]
    fn name_mismatch_converts_to_validation() {
        let err = AppError::from(RelayError::NameMismatch {
            module: ModuleKey::Fiscal,
            filename: "dados.txt".to_string(),
        });
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn transfer_failure_converts_to_relay() {
        let err = AppError::from(RelayError::Transfer {
            reason: "connection reset".to_string(),
        });
        assert!(matches!(err, AppError::Relay(_)));
    }

    #[test]
    fn rejected_credentials_convert_to_relay() {
        let err = AppError::from(RelayError::CredentialsRejected {
            reason: "login refused".to_string(),
        });
        assert!(matches!(err, AppError::Relay(_)));
    }

    #[tokio::test]
    async fn validation_message_reaches_the_client() {
        let (status, body) =
            response_parts(AppError::Validation("password date code mismatch".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.message.contains("password date code mismatch"));
    }

    #[tokio::test]
    async fn relay_details_are_hidden_from_the_client() {
        let (status, body) =
            response_parts(AppError::Relay("PUT https://internal-host/x: HTTP 502".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "RELAY_ERROR");
        assert!(!body.error.message.contains("internal-host"));
    }

    #[tokio::test]
    async fn config_details_are_hidden_from_the_client() {
        let (status, body) =
            response_parts(AppError::Config("UPDHUB_RELAY_PASSWORD missing".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error.code, "CONFIG_ERROR");
        assert!(!body.error.message.contains("UPDHUB_RELAY_PASSWORD"));
    }
}
