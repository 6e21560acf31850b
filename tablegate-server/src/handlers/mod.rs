//! HTTP handlers.

pub mod command;
pub mod items;
pub mod session;

use axum::Json;
use serde_json::{json, Value};
use tablegate_core::{Authorized, PermittedCommand, Verdict};

use crate::error::{ServerError, ServerResult};

/// Liveness probe. Does not touch DynamoDB.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// The permitted command, or the error for the verdict that stopped it.
///
/// `verdict` must describe `result`; it is passed separately so callers
/// can conceal it first.
pub(crate) fn permitted(
    result: tablegate_core::Result<Authorized>,
    verdict: &Verdict,
) -> ServerResult<PermittedCommand> {
    if let Some(err) = ServerError::from_verdict(verdict) {
        return Err(err);
    }
    result
        .ok()
        .and_then(|authorized| authorized.permit().ok())
        .ok_or_else(|| ServerError::Internal(format!("verdict '{}' does not match", verdict)))
}
