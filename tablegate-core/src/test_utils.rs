//! Test utilities for tablegate-core.
//!
//! Stand-ins for the collaborators around the engine, so callers can be
//! tested without a real store.
//!
//! Enable with the `test-utils` feature:
//!
//! ```toml
//! [dev-dependencies]
//! tablegate-core = { version = "...", features = ["test-utils"] }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tablegate_core::test_utils::{RecordingExecutor, FailingRoleStore};
//! use tablegate_core::{CommandAuthorizer, Dialect, Principal, StorageExecutor};
//!
//! # tokio_test::block_on(async {
//! let store = FailingRoleStore::new().with_role("admin", ["*"]);
//! let authorizer = CommandAuthorizer::new(Arc::new(store));
//! let executor = RecordingExecutor::new();
//!
//! let root = Principal::new("root", ["admin"]);
//! let permitted = authorizer
//!     .authorize(&root, Dialect::Statement, "DELETE FROM customer")
//!     .await
//!     .unwrap()
//!     .permit()
//!     .unwrap();
//! executor.execute(&permitted).await.unwrap();
//! assert_eq!(executor.executed().len(), 1);
//! # });
//! ```

use crate::action::Action;
use crate::engine::PermittedCommand;
use crate::executor::{ExecutionError, ExecutionOutcome, StorageExecutor};
use crate::parser::ParsedCommand;
use crate::principal::{AuthError, Authenticator, Principal};
use crate::role::{MemoryRoleStore, Role, RoleStore, RoleStoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A role store that fails on command.
///
/// Roles added with [`with_role`](Self::with_role) are served normally.
/// Names registered as failing return an error instead. Every lookup is
/// counted.
#[derive(Default)]
pub struct FailingRoleStore {
    roles: MemoryRoleStore,
    transient: HashSet<String>,
    broken: HashSet<String>,
    lookups: AtomicUsize,
}

impl FailingRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_role<I, S>(mut self, name: &str, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = self.roles.with_role(name, permissions);
        self
    }

    /// Lookups of `name` fail with [`RoleStoreError::Transient`].
    pub fn with_transient_failure(mut self, name: &str) -> Self {
        self.transient.insert(name.to_string());
        self
    }

    /// Lookups of `name` fail with [`RoleStoreError::Backend`].
    pub fn with_backend_failure(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }

    /// Number of lookups made so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleStore for FailingRoleStore {
    async fn fetch(&self, name: &str) -> Result<Option<Role>, RoleStoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.transient.contains(name) {
            return Err(RoleStoreError::Transient(format!(
                "lookup of '{}' throttled",
                name
            )));
        }
        if self.broken.contains(name) {
            return Err(RoleStoreError::Backend(format!(
                "lookup of '{}' refused",
                name
            )));
        }
        self.roles.fetch(name).await
    }
}

/// An executor that records what it was asked to run.
///
/// Returns queued results in order; once the queue is empty, reads return
/// no items and everything else is acknowledged.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    executed: Arc<Mutex<Vec<ParsedCommand>>>,
    results: Arc<Mutex<VecDeque<Result<ExecutionOutcome, ExecutionError>>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an outcome for the next execution.
    pub fn with_outcome(self, outcome: ExecutionOutcome) -> Self {
        self.results.lock().push_back(Ok(outcome));
        self
    }

    /// Queue a failure for the next execution.
    pub fn with_error(self, error: ExecutionError) -> Self {
        self.results.lock().push_back(Err(error));
        self
    }

    /// Commands executed so far, oldest first.
    pub fn executed(&self) -> Vec<ParsedCommand> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl StorageExecutor for RecordingExecutor {
    async fn execute(
        &self,
        command: &PermittedCommand,
    ) -> Result<ExecutionOutcome, ExecutionError> {
        let command = command.command();
        self.executed.lock().push(command.clone());

        if let Some(result) = self.results.lock().pop_front() {
            return result;
        }
        Ok(match command.action() {
            Action::Read => ExecutionOutcome::items(Vec::new()),
            action => ExecutionOutcome::acknowledged(action.as_str()),
        })
    }
}

/// Username/password pairs held in memory.
#[derive(Default)]
pub struct MemoryAuthenticator {
    users: HashMap<String, (String, Vec<String>)>,
}

impl MemoryAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user<I, S>(mut self, username: &str, password: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users.insert(
            username.to_string(),
            (
                password.to_string(),
                roles.into_iter().map(Into::into).collect(),
            ),
        );
        self
    }
}

#[async_trait]
impl Authenticator for MemoryAuthenticator {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<Principal>, AuthError> {
        Ok(self
            .users
            .get(username)
            .filter(|(expected, _)| expected == password)
            .map(|(_, roles)| Principal::new(username, roles.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failing_store_counts_lookups() {
        let store = FailingRoleStore::new()
            .with_role("reader", ["customer:read"])
            .with_transient_failure("flaky")
            .with_backend_failure("broken");

        assert!(store.fetch("reader").await.unwrap().is_some());
        assert!(store.fetch("flaky").await.unwrap_err().is_transient());
        assert!(!store.fetch("broken").await.unwrap_err().is_transient());
        assert_eq!(store.lookups(), 3);
    }

    #[tokio::test]
    async fn test_memory_authenticator() {
        let auth = MemoryAuthenticator::new().with_user("alice", "secret", ["reader"]);

        let principal = auth.authenticate("alice", "secret").await.unwrap().unwrap();
        assert_eq!(principal.roles(), &["reader".to_string()]);
        assert!(auth.authenticate("alice", "wrong").await.unwrap().is_none());
        assert!(auth.authenticate("mallory", "secret").await.unwrap().is_none());
    }
}
