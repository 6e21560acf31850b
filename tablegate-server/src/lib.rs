//! HTTP gateway for tablegate.
//!
//! Callers log in with a username and password, receive an HS256 session
//! token carrying their roles, and send item requests or free-form
//! commands. Every request is authorized by [`tablegate_core`] before it
//! reaches DynamoDB.
//!
//! # Example
//!
//! ```rust,no_run
//! use tablegate_server::{run_with_shutdown, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::from_env();
//! run_with_shutdown(config, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use auth::{Claims, CurrentUser, TokenService};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use router::GatewayRouter;
pub use state::AppState;

use std::future::Future;
use std::sync::Arc;

use anyhow::Context;
use tablegate_core::CommandAuthorizer;
use tablegate_dynamodb::DynamoDbBackend;

/// Wire the DynamoDB backends into application state.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<AppState> {
    let backend = DynamoDbBackend::connect(&config.dynamodb)
        .await
        .context("failed to set up DynamoDB client")?;

    let mut authorizer = CommandAuthorizer::new(backend.roles.clone());
    if let Some(ttl) = config.role_cache_duration() {
        authorizer = authorizer.with_cache_ttl(ttl);
    }

    Ok(AppState::new(
        Arc::new(authorizer),
        backend.executor.clone(),
        backend.users.clone(),
        Arc::new(TokenService::new(
            config.jwt_secret.as_bytes(),
            config.token_expiry_duration(),
        )),
    ))
}

/// Serve until `shutdown` resolves.
pub async fn run_with_shutdown<F>(config: ServerConfig, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if config.uses_development_secret() {
        log::warn!("no JWT secret configured; using the development secret");
    }

    let state = build_state(&config).await?;
    let app = GatewayRouter::new(state)
        .with_request_timeout(config.request_timeout_duration())
        .build();

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    log::info!("tablegate gateway listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    log::info!("server stopped");
    Ok(())
}
