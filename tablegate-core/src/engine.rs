//! The command authorization engine.
//!
//! [`CommandAuthorizer`] ties parsing, permission resolution and the
//! decision together. It never talks to the store: on an allow decision the
//! caller turns the result into a [`PermittedCommand`] and hands that to a
//! [`StorageExecutor`](crate::StorageExecutor).
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tablegate_core::{CommandAuthorizer, Dialect, Principal};
//! use tablegate_core::role::MemoryRoleStore;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryRoleStore::new().with_role("reader", ["customer:read"]);
//! let authorizer = CommandAuthorizer::new(Arc::new(store));
//! let alice = Principal::new("alice", ["reader"]);
//!
//! let result = authorizer
//!     .authorize(&alice, Dialect::Statement, "SELECT * FROM customer")
//!     .await
//!     .unwrap();
//! assert!(result.is_allowed());
//!
//! let result = authorizer
//!     .authorize(&alice, Dialect::Statement, "DELETE FROM customer WHERE id = 1")
//!     .await
//!     .unwrap();
//! assert_eq!(result.decision().required(), Some("customer:delete"));
//! # });
//! ```

use crate::error::{CoreError, Result};
use crate::parser::{Dialect, ParsedCommand};
use crate::permission::{decide, Decision, Permission, PermissionSet};
use crate::principal::Principal;
use crate::role::{PermissionResolver, ResolutionError, RoleStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Parses, resolves and decides.
///
/// Holds no per-request state and can be shared across tasks behind an
/// `Arc`.
pub struct CommandAuthorizer {
    resolver: PermissionResolver,
}

impl CommandAuthorizer {
    /// Create an authorizer that reads roles from `store` on every check.
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self {
            resolver: PermissionResolver::new(store),
        }
    }

    /// Cache role lookups for `ttl`.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.resolver = self.resolver.with_cache_ttl(ttl);
        self
    }

    /// The resolver, for cache invalidation.
    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Authorize a command given as text.
    ///
    /// A parse failure returns before any role is looked up.
    pub async fn authorize(
        &self,
        principal: &Principal,
        dialect: Dialect,
        text: &str,
    ) -> Result<Authorized> {
        let command = dialect.parse(text).map_err(|err| {
            log::debug!("rejecting {} command from {}: {}", dialect, principal.username(), err);
            CoreError::Parse(err)
        })?;
        self.authorize_command(principal, command).await
    }

    /// Authorize an already-built command.
    pub async fn authorize_command(
        &self,
        principal: &Principal,
        command: ParsedCommand,
    ) -> Result<Authorized> {
        let permissions = self.permissions(principal).await?;
        let decision = decide(&permissions, command.resource(), command.action());

        log::info!(
            "{} {} by {}: {}",
            command.action(),
            command.resource(),
            principal.username(),
            decision
        );

        Ok(Authorized { command, decision })
    }

    /// The principal's effective permissions.
    pub async fn permissions(
        &self,
        principal: &Principal,
    ) -> std::result::Result<PermissionSet, ResolutionError> {
        self.resolver.resolve(principal.roles()).await
    }

    /// Whether the principal holds the global wildcard.
    ///
    /// A failed resolution counts as no.
    pub async fn has_broad_access(&self, principal: &Principal) -> bool {
        match self.permissions(principal).await {
            Ok(permissions) => permissions.has_global(),
            Err(_) => false,
        }
    }
}

/// A parsed command together with the decision about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Authorized {
    command: ParsedCommand,
    decision: Decision,
}

impl Authorized {
    pub fn command(&self) -> &ParsedCommand {
        &self.command
    }

    pub fn decision(&self) -> &Decision {
        &self.decision
    }

    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }

    /// The command, ready to execute, if it was allowed. The denial otherwise.
    pub fn permit(self) -> std::result::Result<PermittedCommand, Decision> {
        match self.decision {
            Decision::Allow { granted_by } => Ok(PermittedCommand::new(self.command, granted_by)),
            deny => Err(deny),
        }
    }
}

/// A command that an allow decision has cleared for execution.
///
/// There is no public constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct PermittedCommand {
    command: ParsedCommand,
    granted_by: Permission,
}

impl PermittedCommand {
    pub(crate) fn new(command: ParsedCommand, granted_by: Permission) -> Self {
        Self {
            command,
            granted_by,
        }
    }

    pub fn command(&self) -> &ParsedCommand {
        &self.command
    }

    /// The grant that allowed it.
    pub fn granted_by(&self) -> &Permission {
        &self.granted_by
    }

    pub fn into_command(self) -> ParsedCommand {
        self.command
    }
}

/// Caller-facing summary of an authorization attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "lowercase")]
pub enum Verdict {
    /// Allowed; `permission` is the `resource:action` that was needed.
    Allowed { permission: String },
    /// Denied for lack of `required`.
    Denied { required: String },
    /// Not a valid command.
    Malformed { reason: String },
    /// Permissions could not be resolved.
    Indeterminate { reason: String },
    /// Denied or malformed, without saying which.
    Rejected,
}

impl Verdict {
    /// Summarise the result of [`CommandAuthorizer::authorize`].
    pub fn of(result: &Result<Authorized>) -> Self {
        match result {
            Ok(authorized) => Verdict::from(authorized),
            Err(err) => Verdict::from(err),
        }
    }

    /// Hide the difference between a malformed command and a denial.
    ///
    /// For callers that do not hold broad access, so that error detail
    /// does not reveal which resources or actions exist.
    pub fn conceal(self) -> Self {
        match self {
            Verdict::Denied { .. } | Verdict::Malformed { .. } => Verdict::Rejected,
            other => other,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed { .. })
    }
}

impl From<&Authorized> for Verdict {
    fn from(authorized: &Authorized) -> Self {
        match authorized.decision() {
            Decision::Allow { .. } => Verdict::Allowed {
                permission: authorized.command().required_permission().to_string(),
            },
            Decision::Deny { required } => Verdict::Denied {
                required: required.clone(),
            },
        }
    }
}

impl From<&CoreError> for Verdict {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::Parse(err) => Verdict::Malformed {
                reason: err.to_string(),
            },
            CoreError::Indeterminate(err) => Verdict::Indeterminate {
                reason: err.to_string(),
            },
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Allowed { permission } => {
                write!(f, "authorized, permission '{}' granted", permission)
            }
            Verdict::Denied { required } => {
                write!(f, "authorization error: missing permission '{}'", required)
            }
            Verdict::Malformed { reason } => write!(f, "malformed command: {}", reason),
            Verdict::Indeterminate { reason } => {
                write!(f, "authorization unavailable: {}", reason)
            }
            Verdict::Rejected => f.write_str("command rejected"),
        }
    }
}
