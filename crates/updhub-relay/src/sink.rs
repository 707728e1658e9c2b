//! Transfer sink boundary.
//!
//! The relay hands renamed artifacts to an external file-transfer
//! destination addressed by host, credentials, and a target directory.
//! [`TransferSink`] abstracts the transport; [`HttpTransferSink`] is the
//! production implementation (WebDAV-style PUT/MKCOL over HTTP), and
//! [`RecordingSink`] is the in-memory double for tests and development.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::RelayError;

/// External destination for published artifact files.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` across request handlers.
#[async_trait]
pub trait TransferSink: Send + Sync {
    /// Make sure the target directory exists. Callers tolerate most
    /// failures here — an unreachable or already-present directory is
    /// treated as "already in the target directory" and delivery
    /// proceeds. [`RelayError::CredentialsRejected`] is the exception:
    /// it aborts the operation.
    async fn ensure_dir(&self, dir: &str) -> Result<(), RelayError>;

    /// Deliver one file into the target directory. Failures here are
    /// fatal to the surrounding publish.
    async fn store(&self, dir: &str, filename: &str, payload: &[u8]) -> Result<(), RelayError>;
}

/// Connection settings for the HTTP transfer sink.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Base URL of the transfer host, e.g. `https://files.example.com`.
    pub host: String,
    /// Basic-auth username.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Per-request timeout in seconds (default 30).
    pub timeout_secs: u64,
}

impl TransferConfig {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            timeout_secs: 30,
        }
    }
}

/// WebDAV-style HTTP transfer sink: `MKCOL` for directories, `PUT` for
/// file delivery. No built-in retries — a failed transfer surfaces to the
/// caller, which aborts the publish.
#[derive(Debug)]
pub struct HttpTransferSink {
    client: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
}

impl HttpTransferSink {
    pub fn new(config: TransferConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RelayError::Transfer {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.host.trim_end_matches('/').to_string(),
            username: config.username,
            password: config.password,
        })
    }

    fn url(&self, dir: &str, filename: &str) -> String {
        let dir = dir.trim_matches('/');
        if dir.is_empty() {
            format!("{}/{}", self.base_url, filename)
        } else {
            format!("{}/{}/{}", self.base_url, dir, filename)
        }
    }
}

#[async_trait]
impl TransferSink for HttpTransferSink {
    async fn ensure_dir(&self, dir: &str) -> Result<(), RelayError> {
        let url = format!("{}/{}", self.base_url, dir.trim_matches('/'));
        let method =
            reqwest::Method::from_bytes(b"MKCOL").map_err(|e| RelayError::Transfer {
                reason: format!("MKCOL method: {e}"),
            })?;

        let resp = self
            .client
            .request(method, &url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| RelayError::Transfer {
                reason: format!("MKCOL {url}: {e}"),
            })?;

        // 405 Method Not Allowed means the collection already exists.
        if resp.status().is_success() || resp.status() == reqwest::StatusCode::METHOD_NOT_ALLOWED {
            Ok(())
        } else {
            Err(status_error("MKCOL", &url, resp.status()))
        }
    }

    async fn store(&self, dir: &str, filename: &str, payload: &[u8]) -> Result<(), RelayError> {
        let url = self.url(dir, filename);

        let resp = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .body(payload.to_vec())
            .send()
            .await
            .map_err(|e| RelayError::Transfer {
                reason: format!("PUT {url}: {e}"),
            })?;

        if resp.status().is_success() {
            tracing::info!(%url, bytes = payload.len(), "artifact delivered");
            Ok(())
        } else {
            Err(status_error("PUT", &url, resp.status()))
        }
    }
}

/// Map a non-success response to a relay error: auth-status responses
/// mean the credentials were rejected, anything else is a plain transfer
/// failure.
fn status_error(method: &str, url: &str, status: reqwest::StatusCode) -> RelayError {
    let reason = format!("{method} {url}: HTTP {status}");
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            RelayError::CredentialsRejected { reason }
        }
        _ => RelayError::Transfer { reason },
    }
}

/// One file captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub dir: String,
    pub filename: String,
    pub payload: Vec<u8>,
}

/// In-memory sink that records every delivery. Failure modes are
/// constructor-selected so tests can exercise both the tolerated
/// directory-change path and the fatal transfer path deterministically.
#[derive(Debug, Default)]
pub struct RecordingSink {
    stored: Mutex<Vec<StoredFile>>,
    fail_dir: bool,
    fail_store: bool,
    reject_credentials: bool,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose `ensure_dir` always fails (store still succeeds).
    pub fn with_unreachable_dir() -> Self {
        Self {
            fail_dir: true,
            ..Self::default()
        }
    }

    /// Sink that rejects the relay credentials on every call.
    pub fn with_rejected_credentials() -> Self {
        Self {
            reject_credentials: true,
            ..Self::default()
        }
    }

    /// Sink whose `store` always fails.
    pub fn with_failing_store() -> Self {
        Self {
            fail_store: true,
            ..Self::default()
        }
    }

    /// Files delivered so far, in order.
    pub fn stored(&self) -> Vec<StoredFile> {
        self.stored.lock().clone()
    }
}

#[async_trait]
impl TransferSink for RecordingSink {
    async fn ensure_dir(&self, dir: &str) -> Result<(), RelayError> {
        if self.reject_credentials {
            Err(RelayError::CredentialsRejected {
                reason: format!("login refused entering {dir}"),
            })
        } else if self.fail_dir {
            Err(RelayError::Transfer {
                reason: format!("cannot enter directory {dir}"),
            })
        } else {
            Ok(())
        }
    }

    async fn store(&self, dir: &str, filename: &str, payload: &[u8]) -> Result<(), RelayError> {
        if self.reject_credentials {
            return Err(RelayError::CredentialsRejected {
                reason: format!("login refused storing {filename}"),
            });
        }
        if self.fail_store {
            return Err(RelayError::Transfer {
                reason: format!("connection lost while storing {filename}"),
            });
        }
        self.stored.lock().push(StoredFile {
            dir: dir.to_string(),
            filename: filename.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
