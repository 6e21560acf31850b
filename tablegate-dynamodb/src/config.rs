//! Connection settings shared by the console and the server.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where the DynamoDB tables live and how to reach them.
///
/// Defaults point at a DynamoDB Local instance on `localhost:8000` with
/// the placeholder `local`/`local` keys it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamoDbConfig {
    /// AWS region used for signing.
    #[serde(default = "default_region")]
    pub region: String,

    /// Endpoint override. `None` means the public regional endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: Option<String>,

    /// Table holding `username`, `password` and `role_name`.
    #[serde(default = "default_users_table")]
    pub users_table: String,

    /// Table holding `role_name` and `permissions`.
    #[serde(default = "default_roles_table")]
    pub roles_table: String,

    /// Static access key. Both keys must be set to skip the default
    /// credential chain.
    #[serde(default = "default_local_key")]
    pub access_key_id: Option<String>,

    #[serde(default = "default_local_key")]
    pub secret_access_key: Option<String>,

    /// Named profile for the default credential chain.
    #[serde(default)]
    pub profile: Option<String>,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_region() -> String {
    "us-west-2".to_string()
}

fn default_endpoint() -> Option<String> {
    Some("http://localhost:8000".to_string())
}

fn default_users_table() -> String {
    "users".to_string()
}

fn default_roles_table() -> String {
    "roles".to_string()
}

fn default_local_key() -> Option<String> {
    Some("local".to_string())
}

fn default_timeout() -> u64 {
    30
}

impl Default for DynamoDbConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            endpoint: default_endpoint(),
            users_table: default_users_table(),
            roles_table: default_roles_table(),
            access_key_id: default_local_key(),
            secret_access_key: default_local_key(),
            profile: None,
            timeout: default_timeout(),
        }
    }
}

impl DynamoDbConfig {
    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from environment-style variables.
    ///
    /// Recognised: `DYNAMODB_ENDPOINT`, `AWS_REGION`, `AWS_ACCESS_KEY_ID`,
    /// `AWS_SECRET_ACCESS_KEY`, `AWS_PROFILE`, `TABLEGATE_USERS_TABLE` and
    /// `TABLEGATE_ROLES_TABLE`. An empty `DYNAMODB_ENDPOINT` selects the
    /// regional endpoint.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup("DYNAMODB_ENDPOINT") {
            self.endpoint = (!endpoint.trim().is_empty()).then_some(endpoint);
        }
        if let Some(region) = lookup("AWS_REGION") {
            self.region = region;
        }
        if let Some(key) = lookup("AWS_ACCESS_KEY_ID") {
            self.access_key_id = Some(key);
        }
        if let Some(secret) = lookup("AWS_SECRET_ACCESS_KEY") {
            self.secret_access_key = Some(secret);
        }
        if let Some(profile) = lookup("AWS_PROFILE") {
            self.profile = Some(profile);
        }
        if let Some(table) = lookup("TABLEGATE_USERS_TABLE") {
            self.users_table = table;
        }
        if let Some(table) = lookup("TABLEGATE_ROLES_TABLE") {
            self.roles_table = table;
        }
    }

    /// The endpoint requests go to.
    pub fn resolved_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://dynamodb.{}.amazonaws.com", self.region),
        }
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Static keys, when both are configured.
    pub fn static_keys(&self) -> Option<(&str, &str)> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(key), Some(secret)) => Some((key, secret)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_target_dynamodb_local() {
        let config = DynamoDbConfig::default();
        assert_eq!(config.region, "us-west-2");
        assert_eq!(config.resolved_endpoint(), "http://localhost:8000");
        assert_eq!(config.users_table, "users");
        assert_eq!(config.roles_table, "roles");
        assert_eq!(config.static_keys(), Some(("local", "local")));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("DYNAMODB_ENDPOINT", "http://dynamo:8000/"),
            ("AWS_REGION", "eu-west-1"),
            ("TABLEGATE_ROLES_TABLE", "rbac_roles"),
        ]
        .into_iter()
        .collect();

        let mut config = DynamoDbConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.resolved_endpoint(), "http://dynamo:8000");
        assert_eq!(config.roles_table, "rbac_roles");
        assert_eq!(config.users_table, "users");
    }

    #[test]
    fn test_empty_endpoint_selects_regional_endpoint() {
        let mut config = DynamoDbConfig::default();
        config.apply_env(|key| (key == "DYNAMODB_ENDPOINT").then(String::new));
        assert_eq!(config.endpoint, None);
        assert_eq!(
            config.resolved_endpoint(),
            "https://dynamodb.us-west-2.amazonaws.com"
        );
    }

    #[test]
    fn test_partial_keys_are_not_static() {
        let config = DynamoDbConfig {
            secret_access_key: None,
            ..Default::default()
        };
        assert_eq!(config.static_keys(), None);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: DynamoDbConfig = serde_json::from_str(r#"{"region": "ap-south-1"}"#).unwrap();
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.endpoint.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.timeout_duration(), Duration::from_secs(30));
    }
}
