//! Role lookups against the `roles` table.

use crate::attribute;
use crate::client::DynamoDbClient;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tablegate_core::{Role, RoleStore, RoleStoreError};

/// Reads roles keyed by `role_name`.
///
/// `permissions` may be a list of strings or a string set. A role item
/// without `permissions` grants nothing.
pub struct DynamoDbRoleStore {
    client: Arc<DynamoDbClient>,
    table: String,
}

impl DynamoDbRoleStore {
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
impl RoleStore for DynamoDbRoleStore {
    async fn fetch(&self, name: &str) -> Result<Option<Role>, RoleStoreError> {
        let params = json!({
            "TableName": self.table,
            "Key": {"role_name": {"S": name}},
            "ConsistentRead": true,
        });
        let response = self.client.call("GetItem", &params).await?;

        let Some(item) = response.get("Item").and_then(Value::as_object) else {
            log::debug!("role '{}' not found in {}", name, self.table);
            return Ok(None);
        };

        let permissions = match item.get("permissions") {
            Some(value) => attribute::strings(value).unwrap_or_else(|| {
                log::warn!(
                    "role '{}' has a permissions attribute that is not a string list",
                    name
                );
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(Some(Role::new(name, permissions)))
    }
}
