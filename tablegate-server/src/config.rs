//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tablegate_dynamodb::DynamoDbConfig;

/// Secret used when none is configured. Only fit for local development.
pub const DEVELOPMENT_SECRET: &str = "tablegate-development-secret";

/// Gateway settings, loaded from TOML and overridden from the environment.
///
/// ```toml
/// listen_addr = "0.0.0.0:8080"
/// jwt_secret = "change me"
/// token_expiry = 3600
///
/// [dynamodb]
/// endpoint = "http://localhost:8000"
/// region = "us-west-2"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// HMAC secret for session tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,

    /// Session token lifetime in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    /// Seconds to cache role lookups; 0 disables the cache.
    #[serde(default = "default_role_cache_ttl")]
    pub role_cache_ttl: u64,

    #[serde(default)]
    pub dynamodb: DynamoDbConfig,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_jwt_secret() -> String {
    DEVELOPMENT_SECRET.to_string()
}

fn default_token_expiry() -> u64 {
    3600
}

fn default_request_timeout() -> u64 {
    30
}

fn default_role_cache_ttl() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            jwt_secret: default_jwt_secret(),
            token_expiry: default_token_expiry(),
            request_timeout: default_request_timeout(),
            role_cache_ttl: default_role_cache_ttl(),
            dynamodb: DynamoDbConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from environment-style variables.
    ///
    /// Recognised: `TABLEGATE_LISTEN_ADDR`, `TABLEGATE_JWT_SECRET` (and
    /// `JWT_SECRET_KEY`), `TABLEGATE_TOKEN_EXPIRY`, `TABLEGATE_ROLE_CACHE_TTL`,
    /// plus everything [`DynamoDbConfig::apply_env`] reads. Numbers that do
    /// not parse are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("TABLEGATE_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(secret) =
            lookup("TABLEGATE_JWT_SECRET").or_else(|| lookup("JWT_SECRET_KEY"))
        {
            self.jwt_secret = secret;
        }
        if let Some(expiry) = lookup("TABLEGATE_TOKEN_EXPIRY").and_then(|v| v.parse().ok()) {
            self.token_expiry = expiry;
        }
        if let Some(ttl) = lookup("TABLEGATE_ROLE_CACHE_TTL").and_then(|v| v.parse().ok()) {
            self.role_cache_ttl = ttl;
        }
        self.dynamodb.apply_env(lookup);
    }

    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_SECRET
    }

    pub fn token_expiry_duration(&self) -> Duration {
        Duration::from_secs(self.token_expiry)
    }

    pub fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// `None` when caching is off.
    pub fn role_cache_duration(&self) -> Option<Duration> {
        (self.role_cache_ttl > 0).then(|| Duration::from_secs(self.role_cache_ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.token_expiry_duration(), Duration::from_secs(3600));
        assert_eq!(config.role_cache_duration(), Some(Duration::from_secs(30)));
        assert!(config.uses_development_secret());
        assert_eq!(config.dynamodb.users_table, "users");
    }

    #[test]
    fn test_load_partial_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
listen_addr = "127.0.0.1:9000"
jwt_secret = "s3cret"
role_cache_ttl = 0

[dynamodb]
endpoint = "http://dynamodb:8000"
roles_table = "gateway_roles"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path()).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert!(!config.uses_development_secret());
        assert_eq!(config.role_cache_duration(), None);
        assert_eq!(config.token_expiry, 3600);
        assert_eq!(
            config.dynamodb.endpoint.as_deref(),
            Some("http://dynamodb:8000")
        );
        assert_eq!(config.dynamodb.roles_table, "gateway_roles");
        assert_eq!(config.dynamodb.users_table, "users");
        assert_eq!(config.dynamodb.region, "us-west-2");
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listen_addr = ").unwrap();
        assert!(ServerConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("TABLEGATE_LISTEN_ADDR", "127.0.0.1:7000"),
            ("JWT_SECRET_KEY", "legacy"),
            ("TABLEGATE_TOKEN_EXPIRY", "60"),
            ("TABLEGATE_ROLE_CACHE_TTL", "not a number"),
            ("AWS_REGION", "eu-west-1"),
        ]
        .into_iter()
        .collect();

        let mut config = ServerConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.listen_addr, "127.0.0.1:7000");
        assert_eq!(config.jwt_secret, "legacy");
        assert_eq!(config.token_expiry, 60);
        assert_eq!(config.role_cache_ttl, 30);
        assert_eq!(config.dynamodb.region, "eu-west-1");
    }

    #[test]
    fn test_tablegate_secret_wins_over_legacy_name() {
        let mut config = ServerConfig::default();
        config.apply_env(|key| match key {
            "TABLEGATE_JWT_SECRET" => Some("new".to_string()),
            "JWT_SECRET_KEY" => Some("old".to_string()),
            _ => None,
        });
        assert_eq!(config.jwt_secret, "new");
    }
}
