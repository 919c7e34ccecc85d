use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub postgres: PostgresConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub clerk: ClerkConfig,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(true))
            .add_source(
                config::File::with_name(&format!("config/{env}"))
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            // Conventional names used by the Clerk dashboard and most deploy targets.
            .set_override_option("webhook.signing_secret", non_empty_env("WEBHOOK_SECRET"))?
            .set_override_option("clerk.secret_key", non_empty_env("CLERK_SECRET_KEY"))?
            .set_override_option("postgres.uri", non_empty_env("DATABASE_URL"))?;

        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostgresConfig {
    pub uri: String,
    #[serde(default = "PostgresConfig::default_pool_size")]
    pub max_connections: u32,
    #[serde(default = "PostgresConfig::default_run_migrations")]
    pub run_migrations: bool,
}

impl PostgresConfig {
    fn default_pool_size() -> u32 {
        10
    }

    fn default_run_migrations() -> bool {
        true
    }
}

/// Settings for inbound Svix-signed deliveries.
///
/// `signing_secret` stays optional so a missing secret surfaces as a 500 on the
/// webhook route instead of taking the whole process down.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default)]
    pub signing_secret: Option<String>,
    #[serde(default = "WebhookConfig::default_tolerance_seconds")]
    pub tolerance_seconds: i64,
}

impl WebhookConfig {
    fn default_tolerance_seconds() -> i64 {
        300
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            signing_secret: None,
            tolerance_seconds: Self::default_tolerance_seconds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClerkConfig {
    #[serde(default = "ClerkConfig::default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "ClerkConfig::default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl ClerkConfig {
    fn default_api_url() -> String {
        "https://api.clerk.com/v1".to_string()
    }

    fn default_timeout_seconds() -> u64 {
        10
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ClerkConfig {
    fn default() -> Self {
        Self {
            api_url: Self::default_api_url(),
            secret_key: None,
            timeout_seconds: Self::default_timeout_seconds(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERRIDES: [&str; 4] = [
        "WEBHOOK_SECRET",
        "APP__WEBHOOK__SIGNING_SECRET",
        "APP__WEBHOOK__TOLERANCE_SECONDS",
        "CLERK_SECRET_KEY",
    ];

    fn clear_overrides() {
        for key in OVERRIDES {
            std::env::remove_var(key);
        }
    }

    // Environment variables are process-wide, so every case runs inside this one test.
    #[test]
    fn env_overrides_layer_over_default_file() {
        clear_overrides();

        std::env::set_var("WEBHOOK_SECRET", "whsec_abc");
        std::env::set_var("APP__WEBHOOK__TOLERANCE_SECONDS", "600");
        std::env::set_var("CLERK_SECRET_KEY", "sk_test_abc");
        let config = AppConfig::load().unwrap();
        assert_eq!(config.webhook.signing_secret.as_deref(), Some("whsec_abc"));
        assert_eq!(config.webhook.tolerance_seconds, 600);
        assert_eq!(config.clerk.secret_key.as_deref(), Some("sk_test_abc"));

        std::env::set_var("WEBHOOK_SECRET", "   ");
        std::env::remove_var("APP__WEBHOOK__TOLERANCE_SECONDS");
        let config = AppConfig::load().unwrap();
        assert_eq!(config.webhook.signing_secret, None);
        assert_eq!(config.webhook.tolerance_seconds, 300);

        clear_overrides();
        let config = AppConfig::load().unwrap();
        assert_eq!(config.webhook.signing_secret, None);
        assert_eq!(config.clerk.api_url, "https://api.clerk.com/v1");
        assert_eq!(config.clerk.timeout(), Duration::from_secs(10));
    }
}
