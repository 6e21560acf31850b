//! DynamoDB client errors and their mapping onto the core seams.

use tablegate_core::{AuthError, ExecutionError, RoleStoreError};
use thiserror::Error;

/// Error codes DynamoDB uses for conditions that clear up on retry.
const TRANSIENT_CODES: &[&str] = &[
    "ProvisionedThroughputExceededException",
    "ThrottlingException",
    "RequestLimitExceeded",
    "InternalServerError",
    "ServiceUnavailable",
    "LimitExceededException",
];

#[derive(Debug, Error)]
pub enum DynamoDbError {
    /// Invalid client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Credentials could not be loaded.
    #[error("credentials error: {0}")]
    Credentials(String),

    /// Building or signing the request failed.
    #[error("failed to sign request: {0}")]
    Signing(String),

    /// The request never got a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// DynamoDB answered with an error.
    #[error("DynamoDB error (HTTP {status}): {code} - {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    /// The response body was not what the operation returns.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl DynamoDbError {
    /// Build a service error from an error response body.
    ///
    /// DynamoDB reports the code in `__type` as
    /// `com.amazonaws.dynamodb.v20120810#ResourceNotFoundException`; only
    /// the part after `#` is kept.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed = serde_json::from_str::<serde_json::Value>(body).ok();

        let code = parsed
            .as_ref()
            .and_then(|json| json.get("__type").or_else(|| json.get("code")))
            .and_then(|v| v.as_str())
            .map(|t| t.rsplit('#').next().unwrap_or(t).to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        let message = parsed
            .as_ref()
            .and_then(|json| json.get("message").or_else(|| json.get("Message")))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());

        DynamoDbError::Service {
            status,
            code,
            message,
        }
    }

    /// Whether retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            DynamoDbError::Transport(_) => true,
            DynamoDbError::Service { status, code, .. } => {
                *status >= 500 || TRANSIENT_CODES.contains(&code.as_str())
            }
            _ => false,
        }
    }
}

impl From<DynamoDbError> for RoleStoreError {
    fn from(err: DynamoDbError) -> Self {
        if err.is_transient() {
            RoleStoreError::Transient(err.to_string())
        } else {
            RoleStoreError::Backend(err.to_string())
        }
    }
}

impl From<DynamoDbError> for AuthError {
    fn from(err: DynamoDbError) -> Self {
        if err.is_transient() {
            AuthError::Unavailable(err.to_string())
        } else {
            AuthError::Backend(err.to_string())
        }
    }
}

impl From<DynamoDbError> for ExecutionError {
    fn from(err: DynamoDbError) -> Self {
        if err.is_transient() {
            return ExecutionError::Unavailable(err.to_string());
        }
        match err {
            DynamoDbError::Service { code, message, .. } => ExecutionError::Rejected { code, message },
            other => ExecutionError::Unavailable(other.to_string()),
        }
    }
}
