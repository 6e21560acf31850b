//! Top-level error type for the authorization engine.

use crate::parser::ParseError;
use crate::role::ResolutionError;
use thiserror::Error;

/// Why a command could not be authorized.
///
/// A denial is not an error; it is a [`Decision`](crate::Decision).
///
/// - [`CoreError::Parse`]: the text is not a command. Fix it and resend.
/// - [`CoreError::Indeterminate`]: permissions could not be resolved. Treat
///   as a denial; retrying later may succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("malformed command: {0}")]
    Parse(#[from] ParseError),

    #[error("authorization indeterminate: {0}")]
    Indeterminate(#[from] ResolutionError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, CoreError>;
