//! Application state for the gateway.

use std::sync::Arc;

use tablegate_core::{Authenticator, CommandAuthorizer, StorageExecutor};

use crate::auth::TokenService;

/// Shared application state.
///
/// Cloned for each request handler; every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub authorizer: Arc<CommandAuthorizer>,
    pub executor: Arc<dyn StorageExecutor>,
    pub authenticator: Arc<dyn Authenticator>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        authorizer: Arc<CommandAuthorizer>,
        executor: Arc<dyn StorageExecutor>,
        authenticator: Arc<dyn Authenticator>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            authorizer,
            executor,
            authenticator,
            tokens,
        }
    }
}
