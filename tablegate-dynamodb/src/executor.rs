//! Runs permitted commands against DynamoDB.

use crate::attribute;
use crate::client::DynamoDbClient;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tablegate_core::parser::verb_action;
use tablegate_core::{
    Action, ExecutionError, ExecutionOutcome, Payload, PermittedCommand, StorageExecutor,
};

/// Sends statements to `ExecuteStatement` and verbs to their operation.
///
/// Reads come back as plain JSON items; only the first page is returned.
pub struct DynamoDbExecutor {
    client: Arc<DynamoDbClient>,
}

impl DynamoDbExecutor {
    pub fn new(client: Arc<DynamoDbClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StorageExecutor for DynamoDbExecutor {
    async fn execute(
        &self,
        permitted: &PermittedCommand,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let command = permitted.command();
        let (operation, params) = match command.payload() {
            Payload::Statement { text } => {
                ("ExecuteStatement".to_string(), json!({ "Statement": text }))
            }
            Payload::Verb { verb, params } => {
                if verb_action(verb).is_none() {
                    return Err(ExecutionError::Unsupported(verb.clone()));
                }
                let mut params = params.clone();
                if verb.starts_with("batch-") {
                    // Batch requests name their tables inside RequestItems.
                    params.remove("TableName");
                }
                (operation_name(verb), Value::Object(params))
            }
        };

        log::info!("executing {} ({})", operation, command);
        let response = self.client.call(&operation, &params).await?;

        if response.get("LastEvaluatedKey").is_some() || response.get("NextToken").is_some() {
            log::debug!("{} returned more pages; only the first is used", operation);
        }

        Ok(match command.action() {
            Action::Read => ExecutionOutcome::items(items(&response)),
            _ => ExecutionOutcome::acknowledged(operation),
        })
    }
}

/// `batch-get-item` to `BatchGetItem`.
pub fn operation_name(verb: &str) -> String {
    verb.split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Items in a read response: `Item`, `Items`, or `Responses` per table.
fn items(response: &Value) -> Vec<Value> {
    if let Some(item) = response.get("Item").and_then(Value::as_object) {
        return vec![attribute::item_to_plain(item)];
    }
    if let Some(items) = response.get("Items").and_then(Value::as_array) {
        return plain_items(items);
    }
    if let Some(tables) = response.get("Responses").and_then(Value::as_object) {
        return tables
            .values()
            .filter_map(Value::as_array)
            .flat_map(|items| plain_items(items))
            .collect();
    }
    Vec::new()
}

fn plain_items(items: &[Value]) -> Vec<Value> {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(attribute::item_to_plain)
        .collect()
}
