//! # tablegate-core
//!
//! The command authorization engine behind the tablegate RBAC gateway.
//!
//! Callers hand the engine an authenticated [`Principal`] and a command in
//! one of two dialects. The engine parses the command into an
//! `(action, resource)` pair, resolves the principal's permissions from its
//! roles and decides whether the command may run.
//!
//! ```text
//! text + principal ──▶ parser ──▶ ParsedCommand
//!                                      │
//!        role names ──▶ resolver ──▶ PermissionSet
//!                                      │
//!                                   decide ──▶ Decision
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use tablegate_core::role::MemoryRoleStore;
//! use tablegate_core::{CommandAuthorizer, Dialect, Principal};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryRoleStore::new()
//!     .with_role("reader", ["customer:read"])
//!     .with_role("admin", ["*"]);
//! let authorizer = CommandAuthorizer::new(Arc::new(store));
//!
//! let alice = Principal::new("alice", ["reader"]);
//! let result = authorizer
//!     .authorize(
//!         &alice,
//!         Dialect::Verb,
//!         r#"dynamodb get-item --table-name customer --key '{"id": {"S": "1"}}'"#,
//!     )
//!     .await
//!     .unwrap();
//! assert!(result.is_allowed());
//! # });
//! ```
//!
//! ## Permissions
//!
//! | String | Grants |
//! |--------|--------|
//! | `*` | every action on every resource |
//! | `customer:*` | every action on `customer` |
//! | `customer:read` | `read` on `customer` |
//!
//! Anything else in a role definition is ignored.
//!
//! ## Feature Flags
//!
//! - `test-utils`: stand-in role stores, executors and authenticators
//!   in [`test_utils`]

pub mod action;
pub mod engine;
pub mod error;
pub mod executor;
pub mod parser;
pub mod permission;
pub mod principal;
pub mod role;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use action::{Action, UnknownAction};
pub use engine::{Authorized, CommandAuthorizer, PermittedCommand, Verdict};
pub use error::{CoreError, Result};
pub use executor::{ExecutionError, ExecutionOutcome, StorageExecutor};
pub use parser::{
    parse, CommandDialect, Dialect, ParseError, ParsedCommand, Payload, StatementDialect,
    UnknownDialect, VerbDialect,
};
pub use permission::{decide, Decision, Permission, PermissionSet};
pub use principal::{AuthError, Authenticator, Principal, SessionError, SessionVerifier};
pub use role::{
    FileRoleStore, MemoryRoleStore, PermissionResolver, ResolutionError, Role, RoleStore,
    RoleStoreError,
};
