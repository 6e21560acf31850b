//! Structured item requests: `/api/{table}/item`.
//!
//! | Method | Action | DynamoDB call |
//! |--------|--------|---------------|
//! | `GET` | `read` | `GetItem` |
//! | `POST` | `write` | `PutItem` |
//! | `PUT` | `update` | `PutItem`, replacing the whole item |
//! | `DELETE` | `delete` | `DeleteItem` |
//!
//! Keys and attributes are plain JSON; key values given in the query
//! string are strings.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tablegate_core::{Action, ExecutionOutcome, ParsedCommand, Principal, Verdict};
use tablegate_dynamodb::attribute;

use super::permitted;
use crate::auth::CurrentUser;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Query string for `GET` and `DELETE`.
#[derive(Debug, Deserialize)]
pub struct KeyQuery {
    /// Name of the key attribute.
    pub key: String,
    pub key_value: String,
}

impl KeyQuery {
    fn to_key(&self) -> ServerResult<Map<String, Value>> {
        if self.key.trim().is_empty() {
            return Err(ServerError::InvalidRequest("key must not be empty".to_string()));
        }
        let mut key = Map::new();
        key.insert(self.key.clone(), json!({"S": self.key_value}));
        Ok(key)
    }
}

/// Body for `POST` and `PUT`.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    pub key: Map<String, Value>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl ItemRequest {
    /// Key and attributes merged into one item, key attributes winning.
    fn to_item(&self) -> ServerResult<Map<String, Value>> {
        if self.key.is_empty() {
            return Err(ServerError::InvalidRequest("key must not be empty".to_string()));
        }
        let mut item = self.attributes.clone();
        item.extend(self.key.clone());
        Ok(attribute::item_from_plain(&item))
    }
}

async fn run(
    state: &AppState,
    principal: &Principal,
    action: Action,
    table: &str,
    params: Map<String, Value>,
) -> ServerResult<ExecutionOutcome> {
    let command = ParsedCommand::item_request(action, table, params)
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))?;
    let result = state.authorizer.authorize_command(principal, command).await;
    let verdict = Verdict::of(&result);
    let permitted = permitted(result, &verdict)?;
    Ok(state.executor.execute(&permitted).await?)
}

/// `GET /api/{table}/item?key=..&key_value=..`
pub async fn get_item(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(table): Path<String>,
    Query(query): Query<KeyQuery>,
) -> ServerResult<Json<Value>> {
    let params = Map::from_iter([("Key".to_string(), Value::Object(query.to_key()?))]);
    match run(&state, &principal, Action::Read, &table, params).await? {
        ExecutionOutcome::Items { mut items } if !items.is_empty() => {
            Ok(Json(items.swap_remove(0)))
        }
        ExecutionOutcome::Items { .. } => Err(ServerError::NotFound(format!(
            "item not found in table {}",
            table
        ))),
        ExecutionOutcome::Acknowledged { operation } => Err(ServerError::Internal(format!(
            "{} returned no item",
            operation
        ))),
    }
}

/// `POST /api/{table}/item`: create or overwrite.
pub async fn put_item(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(table): Path<String>,
    Json(request): Json<ItemRequest>,
) -> ServerResult<Json<Value>> {
    let params = Map::from_iter([("Item".to_string(), Value::Object(request.to_item()?))]);
    run(&state, &principal, Action::Write, &table, params).await?;
    Ok(Json(json!({"message": format!("item stored in table {}", table)})))
}

/// `PUT /api/{table}/item`: replace an item. Needs `update`, not `write`.
pub async fn update_item(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(table): Path<String>,
    Json(request): Json<ItemRequest>,
) -> ServerResult<Json<Value>> {
    let params = Map::from_iter([("Item".to_string(), Value::Object(request.to_item()?))]);
    run(&state, &principal, Action::Update, &table, params).await?;
    Ok(Json(json!({"message": format!("item replaced in table {}", table)})))
}

/// `DELETE /api/{table}/item?key=..&key_value=..`
pub async fn delete_item(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Path(table): Path<String>,
    Query(query): Query<KeyQuery>,
) -> ServerResult<Json<Value>> {
    let params = Map::from_iter([("Key".to_string(), Value::Object(query.to_key()?))]);
    run(&state, &principal, Action::Delete, &table, params).await?;
    Ok(Json(json!({"message": format!("item deleted from table {}", table)})))
}
