//! Server entrypoint: configuration from the environment, Postgres when
//! `DATABASE_URL` is set (in-memory stores otherwise), then serve.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use updhub_api::config::AppConfig;
use updhub_api::state::AppState;
use updhub_relay::{ArtifactRelay, HttpTransferSink, TransferConfig};
use updhub_store::{
    AuthorizationStore, MemoryAuthorizationStore, MemoryVersionLedger, PgAuthorizationStore,
    PgVersionLedger, VersionLedger,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let (auth_store, ledger): (Arc<dyn AuthorizationStore>, Arc<dyn VersionLedger>) =
        match updhub_store::init_pool().await? {
            Some(pool) => (
                Arc::new(PgAuthorizationStore::new(pool.clone())),
                Arc::new(PgVersionLedger::new(pool)),
            ),
            None => (
                Arc::new(MemoryAuthorizationStore::new()),
                Arc::new(MemoryVersionLedger::new()),
            ),
        };

    let relay = match &config.relay {
        Some(settings) => {
            let sink = HttpTransferSink::new(TransferConfig::new(
                settings.host.clone(),
                settings.username.clone(),
                settings.password.clone(),
            ))?;
            Some(Arc::new(ArtifactRelay::new(
                Arc::new(sink),
                settings.target_dir.clone(),
            )))
        }
        None => None,
    };

    let state = AppState::new(auth_store, ledger, relay, config.admin_credential.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "updhub listening");
    axum::serve(listener, updhub_api::app(state)).await?;

    Ok(())
}
