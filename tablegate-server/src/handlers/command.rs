//! Free-form commands: `POST /api/command`.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tablegate_core::{Dialect, Verdict};

use super::permitted;
use crate::auth::CurrentUser;
use crate::error::ServerResult;
use crate::state::AppState;

/// Request body for `POST /api/command`.
#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    /// Defaults to `statement`.
    #[serde(default)]
    pub dialect: Dialect,
    pub command: String,
}

/// Authorize and run one command.
///
/// Only callers holding the global wildcard learn why a command was
/// refused; everyone else gets "command rejected" for both denials and
/// malformed commands.
pub async fn run_command(
    State(state): State<AppState>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<CommandRequest>,
) -> ServerResult<Json<Value>> {
    let result = state
        .authorizer
        .authorize(&principal, request.dialect, &request.command)
        .await;

    let mut verdict = Verdict::of(&result);
    if matches!(verdict, Verdict::Denied { .. } | Verdict::Malformed { .. })
        && !state.authorizer.has_broad_access(&principal).await
    {
        log::debug!("{} for {}", verdict, principal.username());
        verdict = verdict.conceal();
    }

    let permitted = permitted(result, &verdict)?;
    let outcome = state.executor.execute(&permitted).await?;

    let command = permitted.command();
    Ok(Json(json!({
        "dialect": command.dialect(),
        "action": command.action().as_str(),
        "resource": command.resource(),
        "permission": command.required_permission().to_string(),
        "result": outcome,
    })))
}
