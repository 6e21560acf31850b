//! Login and session introspection.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{CurrentUser, IssuedToken};
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Request body for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Check credentials against the user directory and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ServerResult<Json<IssuedToken>> {
    let principal = state
        .authenticator
        .authenticate(&request.username, &request.password)
        .await?
        .ok_or_else(|| ServerError::Unauthorized("invalid username or password".to_string()))?;

    let token = state.tokens.issue(&principal)?;
    log::info!("issued session token for {}", principal);
    Ok(Json(token))
}

/// Who the bearer token belongs to.
pub async fn me(CurrentUser(principal): CurrentUser) -> Json<Value> {
    Json(json!({
        "username": principal.username(),
        "role": principal.primary_role(),
        "roles": principal.roles(),
    }))
}
