//! Shared application state.
//!
//! The service holds no long-lived domain state of its own — every request
//! goes through the store trait objects. `AppState` is cheaply cloneable
//! (everything behind `Arc`) and carries the optional relay and admin
//! credential from configuration.

use std::sync::Arc;

use subtle::ConstantTimeEq;

use updhub_relay::ArtifactRelay;
use updhub_store::{
    AuthorizationStore, MemoryAuthorizationStore, MemoryVersionLedger, VersionLedger,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_store: Arc<dyn AuthorizationStore>,
    pub ledger: Arc<dyn VersionLedger>,
    /// Artifact relay; `None` when the transfer destination is not
    /// configured, which makes the publish endpoint answer 500.
    pub relay: Option<Arc<ArtifactRelay>>,
    /// Admin publish credential; `None` disables publishing.
    admin_credential: Option<String>,
}

impl AppState {
    pub fn new(
        auth_store: Arc<dyn AuthorizationStore>,
        ledger: Arc<dyn VersionLedger>,
        relay: Option<Arc<ArtifactRelay>>,
        admin_credential: Option<String>,
    ) -> Self {
        Self {
            auth_store,
            ledger,
            relay,
            admin_credential,
        }
    }

    /// In-memory state with no relay and no admin credential. Development
    /// and test mode.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryAuthorizationStore::new()),
            Arc::new(MemoryVersionLedger::new()),
            None,
            None,
        )
    }

    /// Whether an admin credential is configured at all.
    pub fn has_admin_credential(&self) -> bool {
        self.admin_credential.is_some()
    }

    /// Constant-time comparison of a presented admin credential against
    /// the configured one. `false` when none is configured.
    pub fn admin_credential_matches(&self, presented: &str) -> bool {
        match &self.admin_credential {
            Some(expected) => expected
                .as_bytes()
                .ct_eq(presented.as_bytes())
                .into(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_credential(credential: &str) -> AppState {
        AppState::new(
            Arc::new(MemoryAuthorizationStore::new()),
            Arc::new(MemoryVersionLedger::new()),
            None,
            Some(credential.to_string()),
        )
    }

    #[test]
    fn matching_credential_is_accepted() {
        let state = state_with_credential("segredo-admin");
        assert!(state.admin_credential_matches("segredo-admin"));
    }

    #[test]
    fn wrong_and_prefix_credentials_are_rejected() {
        let state = state_with_credential("segredo-admin");
        assert!(!state.admin_credential_matches("errado"));
        assert!(!state.admin_credential_matches("segredo"));
        assert!(!state.admin_credential_matches("segredo-admin-x"));
    }

    #[test]
    fn unconfigured_credential_rejects_everything() {
        let state = AppState::in_memory();
        assert!(!state.has_admin_credential());
        assert!(!state.admin_credential_matches(""));
        assert!(!state.admin_credential_matches("qualquer"));
    }
}
