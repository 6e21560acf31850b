//! Router builder for the gateway endpoints.

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::handlers::{command, health, items, session};
use crate::state::AppState;

/// Builder for the gateway router.
///
/// | Route | Handler |
/// |-------|---------|
/// | `GET /health` | liveness |
/// | `POST /login` | username/password to session token |
/// | `GET /users/me` | the token's principal |
/// | `GET, POST, PUT, DELETE /api/{table}/item` | item requests |
/// | `POST /api/command` | free-form commands |
///
/// # Example
///
/// ```rust,no_run
/// # use tablegate_server::{AppState, GatewayRouter};
/// # async fn example(state: AppState) -> Result<(), Box<dyn std::error::Error>> {
/// let app = GatewayRouter::new(state)
///     .with_request_timeout(std::time::Duration::from_secs(30))
///     .build();
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub struct GatewayRouter {
    state: AppState,
    request_timeout: Option<Duration>,
}

impl GatewayRouter {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            request_timeout: None,
        }
    }

    /// Answer 408 for requests that take longer than `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Build the router with tracing and permissive CORS.
    pub fn build(self) -> Router {
        let mut router = Router::new()
            .route("/health", get(health))
            .route("/login", post(session::login))
            .route("/users/me", get(session::me))
            .route("/api/command", post(command::run_command))
            .route(
                "/api/:table/item",
                get(items::get_item)
                    .post(items::put_item)
                    .put(items::update_item)
                    .delete(items::delete_item),
            );

        if let Some(timeout) = self.request_timeout {
            router = router.layer(TimeoutLayer::new(timeout));
        }

        router
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(self.state)
    }

    /// Build the router and nest it under a prefix path.
    pub fn build_nested(self, prefix: impl Into<String>) -> Router {
        Router::new().nest(&prefix.into(), self.build())
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
