//! Environment-provided configuration.
//!
//! Recognized variables:
//!
//! | Variable                  | Meaning                                    |
//! |---------------------------|--------------------------------------------|
//! | `UPDHUB_PORT`             | Listen port (default 8080)                 |
//! | `UPDHUB_ADMIN_CREDENTIAL` | Credential required by `/admin/publicar`   |
//! | `UPDHUB_RELAY_HOST`       | Transfer destination base URL              |
//! | `UPDHUB_RELAY_USER`       | Transfer destination username              |
//! | `UPDHUB_RELAY_PASSWORD`   | Transfer destination password              |
//! | `UPDHUB_RELAY_DIR`        | Target directory on the destination        |
//! | `DATABASE_URL`            | Postgres URL (read by updhub-store)        |
//!
//! The relay is configured only when all four `UPDHUB_RELAY_*` variables
//! are present; a partial set is logged and treated as unconfigured, and
//! the publish endpoint answers 500 until the operator completes it.

/// Server configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Credential the admin must present to publish. `None` disables the
    /// publish endpoint (it answers as unconfigured).
    pub admin_credential: Option<String>,
    pub relay: Option<RelaySettings>,
}

/// Transfer destination settings for the artifact relay.
#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub target_dir: String,
}

impl AppConfig {
    /// Resolve configuration from process environment variables.
    pub fn from_env() -> Self {
        let port = std::env::var("UPDHUB_PORT")
            .ok()
            .and_then(|raw| match raw.parse() {
                Ok(port) => Some(port),
                Err(_) => {
                    tracing::warn!(%raw, "UPDHUB_PORT is not a valid port — using 8080");
                    None
                }
            })
            .unwrap_or(8080);

        let admin_credential = std::env::var("UPDHUB_ADMIN_CREDENTIAL").ok();
        if admin_credential.is_none() {
            tracing::warn!("UPDHUB_ADMIN_CREDENTIAL not set — publish endpoint disabled");
        }

        let relay = relay_settings(
            std::env::var("UPDHUB_RELAY_HOST").ok(),
            std::env::var("UPDHUB_RELAY_USER").ok(),
            std::env::var("UPDHUB_RELAY_PASSWORD").ok(),
            std::env::var("UPDHUB_RELAY_DIR").ok(),
        );

        Self {
            port,
            admin_credential,
            relay,
        }
    }
}

/// Combine the four relay variables: all-or-nothing.
fn relay_settings(
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
    target_dir: Option<String>,
) -> Option<RelaySettings> {
    match (host, username, password, target_dir) {
        (Some(host), Some(username), Some(password), Some(target_dir)) => Some(RelaySettings {
            host,
            username,
            password,
            target_dir,
        }),
        (None, None, None, None) => None,
        _ => {
            tracing::warn!(
                "partial UPDHUB_RELAY_* configuration — relay disabled until all of \
                 HOST, USER, PASSWORD and DIR are set"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn complete_relay_settings_are_accepted() {
        let settings = relay_settings(
            s("https://files.example.com"),
            s("publicador"),
            s("segredo"),
            s("atualizacoes"),
        )
        .unwrap();
        assert_eq!(settings.host, "https://files.example.com");
        assert_eq!(settings.target_dir, "atualizacoes");
    }

    #[test]
    fn absent_relay_settings_disable_the_relay() {
        assert!(relay_settings(None, None, None, None).is_none());
    }

    #[test]
    fn partial_relay_settings_disable_the_relay() {
        assert!(relay_settings(s("https://files.example.com"), s("publicador"), None, None).is_none());
    }
}
