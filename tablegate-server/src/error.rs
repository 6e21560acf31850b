//! Error types for the gateway.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tablegate_core::{AuthError, ExecutionError, Verdict};

/// Errors returned by gateway handlers.
///
/// Every variant renders as `{"error": <message>, "code": <status>}`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Missing, expired or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Invalid request from client.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Permissions or credentials could not be checked right now.
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// The user directory failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The store failed to run an authorized command.
    #[error("Store error: {0}")]
    Store(#[from] ExecutionError),

    /// Session tokens could not be issued.
    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// The error for a verdict that stops a command, `None` when allowed.
    pub fn from_verdict(verdict: &Verdict) -> Option<Self> {
        let message = verdict.to_string();
        match verdict {
            Verdict::Allowed { .. } => None,
            Verdict::Denied { .. } | Verdict::Rejected => Some(ServerError::Forbidden(message)),
            Verdict::Malformed { .. } => Some(ServerError::InvalidRequest(message)),
            Verdict::Indeterminate { .. } => Some(ServerError::Unavailable(message)),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Auth(AuthError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Auth(AuthError::Backend(_)) => StatusCode::BAD_GATEWAY,
            ServerError::Store(ExecutionError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
            ServerError::Store(_) => StatusCode::BAD_REQUEST,
            ServerError::Token(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::Unauthorized(e)
            | ServerError::Forbidden(e)
            | ServerError::InvalidRequest(e)
            | ServerError::NotFound(e)
            | ServerError::Unavailable(e) => e.clone(),
            ServerError::Auth(e) => e.to_string(),
            ServerError::Store(e) => e.to_string(),
            ServerError::Token(_) | ServerError::Internal(_) => {
                log::error!("{}", self);
                "internal error".to_string()
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
            "code": status.as_u16(),
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type alias for handlers.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
