//! CLI-specific error types

use thiserror::Error;

/// Errors that end a console session.
///
/// Failures of individual commands are printed and do not end the session.
#[derive(Debug, Error)]
pub enum CliError {
    /// Username or password rejected.
    #[error("authentication failed: invalid username or password")]
    LoginFailed,

    /// The user directory could not be queried.
    #[error("Authentication error: {0}")]
    Auth(#[from] tablegate_core::AuthError),

    /// The DynamoDB backend could not be set up.
    #[error("DynamoDB error: {0}")]
    Backend(#[from] tablegate_dynamodb::DynamoDbError),

    /// Readline/input error
    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    /// IO error (terminal, history file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
