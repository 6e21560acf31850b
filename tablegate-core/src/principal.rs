//! Authenticated callers and the collaborators that produce them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An authenticated caller.
///
/// Role names are kept in the order given with duplicates and blanks
/// removed. Order only matters for display: the first role is the one
/// shown in prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    username: String,
    roles: Vec<String>,
}

impl Principal {
    pub fn new<I, S>(username: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for role in roles {
            let role = role.into();
            if !role.trim().is_empty() && !unique.contains(&role) {
                unique.push(role);
            }
        }

        Self {
            username: username.into(),
            roles: unique,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    /// The role shown when only one fits, e.g. in the console prompt.
    pub fn primary_role(&self) -> Option<&str> {
        self.roles.first().map(String::as_str)
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.username)?;
        if !self.roles.is_empty() {
            write!(f, " ({})", self.roles.join(", "))?;
        }
        Ok(())
    }
}

/// Why a session token was not accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session expired")]
    Expired,

    #[error("malformed session token: {0}")]
    Malformed(String),

    #[error("invalid session signature")]
    InvalidSignature,
}

/// Turns an opaque session token into a principal.
///
/// The engine trusts whatever a verifier returns.
pub trait SessionVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Principal, SessionError>;
}

/// Failures while checking credentials. A wrong password is not an error.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication backend unavailable: {0}")]
    Unavailable(String),

    #[error("authentication backend error: {0}")]
    Backend(String),
}

/// Checks a username and password.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// `Ok(None)` when the user is unknown or the password does not match.
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, AuthError>;
}
