//! Username/password checks against the `users` table.

use crate::attribute;
use crate::client::DynamoDbClient;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tablegate_core::{AuthError, Authenticator, Principal};

/// Looks users up by `username` and compares the stored `password`.
///
/// `role_name` may hold one role as a string or several as a list or
/// string set.
pub struct UserDirectory {
    client: Arc<DynamoDbClient>,
    table: String,
}

impl UserDirectory {
    pub fn new(client: Arc<DynamoDbClient>, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl Authenticator for UserDirectory {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, AuthError> {
        let params = json!({
            "TableName": self.table,
            "Key": {"username": {"S": username}},
            "ConsistentRead": true,
        });
        let response = self.client.call("GetItem", &params).await?;

        let Some(item) = response.get("Item").and_then(Value::as_object) else {
            log::info!("login failed for unknown user '{}'", username);
            return Ok(None);
        };

        let stored = item
            .get("password")
            .and_then(|v| v.get("S"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if stored.is_empty() || !constant_time_compare(stored, password) {
            log::info!("login failed for user '{}'", username);
            return Ok(None);
        }

        let roles = item
            .get("role_name")
            .and_then(attribute::strings)
            .unwrap_or_default();
        if roles.is_empty() {
            log::warn!("user '{}' has no roles", username);
        }

        Ok(Some(Principal::new(username, roles)))
    }
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
