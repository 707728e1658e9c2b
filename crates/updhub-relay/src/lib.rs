//! # updhub-relay — Artifact Relay
//!
//! Turns an admin's raw module upload into a canonical, timestamped
//! artifact on the external transfer destination:
//!
//! 1. guard: the original filename must name the module it is uploaded
//!    for (`folha` / `fiscal` / `contabil`), case-insensitively;
//! 2. rename: the client upload timestamp becomes a `.YYYY.MM.DD.HH.MM.SS`
//!    filename suffix and a `YYYY.MM.DD.HH:MM:SS` version label (UTC);
//! 3. package: bare `.exe` payloads are wrapped in a single-entry zip;
//! 4. deliver: the renamed payload goes to the [`sink::TransferSink`].
//!    A failed directory change is tolerated unless the destination
//!    rejected the credentials; a failed transfer aborts the surrounding
//!    publish before any ledger write.

pub mod naming;
pub mod package;
pub mod sink;

use std::sync::Arc;

use thiserror::Error;

use updhub_core::ModuleKey;

pub use naming::{derive_name, validate_slot_name, ArtifactName};
pub use package::package_executable;
pub use sink::{HttpTransferSink, RecordingSink, StoredFile, TransferConfig, TransferSink};

/// Artifact relay failures.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The uploaded filename does not belong in the module slot it was
    /// uploaded for.
    #[error("file {filename:?} does not look like a {module} artifact")]
    NameMismatch {
        /// Slot the file was uploaded into.
        module: ModuleKey,
        /// Original (client-side) filename.
        filename: String,
    },

    /// Client upload timestamp is not a representable instant.
    #[error("upload timestamp {millis} ms is out of range")]
    BadTimestamp { millis: i64 },

    /// Zip repackaging failed.
    #[error("failed to package artifact: {reason}")]
    Packaging { reason: String },

    /// The transfer destination rejected the relay credentials. Always
    /// fatal, even on the otherwise-tolerated directory change.
    #[error("transfer credentials rejected: {reason}")]
    CredentialsRejected { reason: String },

    /// The transfer destination rejected the delivery or is unreachable.
    #[error("artifact transfer failed: {reason}")]
    Transfer { reason: String },
}

/// A successfully relayed artifact: what the ledger records for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    /// Version label derived from the upload timestamp.
    pub version: String,
    /// Final filename on the transfer destination.
    pub filename: String,
}

/// Orchestrates guard → rename → package → deliver for one module upload.
pub struct ArtifactRelay {
    sink: Arc<dyn TransferSink>,
    target_dir: String,
}

impl ArtifactRelay {
    pub fn new(sink: Arc<dyn TransferSink>, target_dir: impl Into<String>) -> Self {
        Self {
            sink,
            target_dir: target_dir.into(),
        }
    }

    /// Relay one uploaded file into its module slot.
    ///
    /// # Errors
    ///
    /// [`RelayError::NameMismatch`] / [`RelayError::BadTimestamp`] for
    /// rejected input; [`RelayError::Packaging`] / [`RelayError::Transfer`]
    /// / [`RelayError::CredentialsRejected`] for delivery failures.
    /// Directory-change failures on the sink are logged and ignored — the
    /// destination is then assumed to already be the target directory —
    /// except credential rejection, which is fatal everywhere.
    pub async fn publish(
        &self,
        module: ModuleKey,
        original_filename: &str,
        payload: &[u8],
        client_timestamp_millis: i64,
    ) -> Result<PublishedArtifact, RelayError> {
        validate_slot_name(module, original_filename)?;
        let name = derive_name(original_filename, client_timestamp_millis)?;

        let delivered;
        let payload = if name.repackage {
            delivered = package_executable(&original_filename.to_lowercase(), payload)?;
            &delivered[..]
        } else {
            payload
        };

        // A missing directory is tolerated (the destination is assumed to
        // already be the target directory), but rejected credentials mean
        // nothing can be delivered at all.
        if let Err(e) = self.sink.ensure_dir(&self.target_dir).await {
            if matches!(e, RelayError::CredentialsRejected { .. }) {
                return Err(e);
            }
            tracing::debug!(
                dir = %self.target_dir,
                error = %e,
                "directory change failed — assuming destination is already the target directory"
            );
        }

        self.sink
            .store(&self.target_dir, &name.filename, payload)
            .await?;

        tracing::info!(
            %module,
            filename = %name.filename,
            version = %name.version,
            "module artifact published"
        );

        Ok(PublishedArtifact {
            version: name.version,
            filename: name.filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: i64 = 1_700_000_000_000; // 2023-11-14T22:13:20Z

    fn relay_with(sink: Arc<RecordingSink>) -> ArtifactRelay {
        ArtifactRelay::new(sink, "atualizacoes")
    }

    #[tokio::test]
    async fn executable_is_zipped_renamed_and_delivered() {
        let sink = Arc::new(RecordingSink::new());
        let relay = relay_with(sink.clone());

        let result = relay
            .publish(ModuleKey::Payroll, "Relatorio_FOLHA.exe", b"MZpayload", TS)
            .await
            .unwrap();

        assert_eq!(result.filename, "relatorio_folha.2023.11.14.22.13.20.zip");
        assert_eq!(result.version, "2023.11.14.22:13:20");

        let stored = sink.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].dir, "atualizacoes");
        assert_eq!(stored[0].filename, result.filename);
        // Delivered payload is a zip archive, not the raw executable.
        assert_eq!(&stored[0].payload[..2], b"PK");
    }

    #[tokio::test]
    async fn non_executable_is_delivered_verbatim() {
        let sink = Arc::new(RecordingSink::new());
        let relay = relay_with(sink.clone());

        let result = relay
            .publish(ModuleKey::Fiscal, "tabelas_fiscal.dat", b"raw bytes", TS)
            .await
            .unwrap();

        assert_eq!(result.filename, "tabelas_fiscal.2023.11.14.22.13.20.dat");
        assert_eq!(sink.stored()[0].payload, b"raw bytes");
    }

    #[tokio::test]
    async fn wrong_slot_filename_never_reaches_the_sink() {
        let sink = Arc::new(RecordingSink::new());
        let relay = relay_with(sink.clone());

        let err = relay
            .publish(ModuleKey::Fiscal, "dados.txt", b"x", TS)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::NameMismatch { .. }));
        assert!(sink.stored().is_empty());
    }

    #[tokio::test]
    async fn directory_failure_is_tolerated() {
        let sink = Arc::new(RecordingSink::with_unreachable_dir());
        let relay = relay_with(sink.clone());

        relay
            .publish(ModuleKey::Accounting, "contabil.exe", b"MZ", TS)
            .await
            .unwrap();

        assert_eq!(sink.stored().len(), 1);
    }

    #[tokio::test]
    async fn rejected_credentials_on_directory_change_are_fatal() {
        let sink = Arc::new(RecordingSink::with_rejected_credentials());
        let relay = relay_with(sink.clone());

        let err = relay
            .publish(ModuleKey::Payroll, "folha.exe", b"MZ", TS)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::CredentialsRejected { .. }));
        assert!(sink.stored().is_empty());
    }

    #[tokio::test]
    async fn transfer_failure_is_fatal() {
        let sink = Arc::new(RecordingSink::with_failing_store());
        let relay = relay_with(sink.clone());

        let err = relay
            .publish(ModuleKey::Accounting, "contabil.exe", b"MZ", TS)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Transfer { .. }));
    }
}
