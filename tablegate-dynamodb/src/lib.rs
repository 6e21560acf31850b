//! DynamoDB backends for tablegate.
//!
//! Everything here talks to DynamoDB's JSON protocol through one signed
//! [`DynamoDbClient`]:
//!
//! - **[`DynamoDbRoleStore`]**: the `roles` table as a [`RoleStore`](tablegate_core::RoleStore)
//! - **[`UserDirectory`]**: the `users` table as an [`Authenticator`](tablegate_core::Authenticator)
//! - **[`DynamoDbExecutor`]**: runs permitted commands
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tablegate_core::{CommandAuthorizer, Dialect, Principal, StorageExecutor};
//! use tablegate_dynamodb::{DynamoDbBackend, DynamoDbConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = DynamoDbBackend::connect(&DynamoDbConfig::from_env()).await?;
//!     let authorizer = CommandAuthorizer::new(backend.roles.clone());
//!
//!     let alice = Principal::new("alice", ["reader"]);
//!     let result = authorizer
//!         .authorize(&alice, Dialect::Statement, "SELECT * FROM customer")
//!         .await?;
//!     if let Ok(permitted) = result.permit() {
//!         let outcome = backend.executor.execute(&permitted).await?;
//!         println!("{outcome:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod attribute;
pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod roles;
pub mod users;

pub use client::{DynamoDbClient, DynamoDbClientBuilder};
pub use config::DynamoDbConfig;
pub use error::DynamoDbError;
pub use executor::DynamoDbExecutor;
pub use roles::DynamoDbRoleStore;
pub use users::UserDirectory;

use std::sync::Arc;

/// The three backends, sharing one client.
#[derive(Clone)]
pub struct DynamoDbBackend {
    pub client: Arc<DynamoDbClient>,
    pub roles: Arc<DynamoDbRoleStore>,
    pub users: Arc<UserDirectory>,
    pub executor: Arc<DynamoDbExecutor>,
}

impl DynamoDbBackend {
    /// Build a client from `config` and wire up the backends.
    pub async fn connect(config: &DynamoDbConfig) -> Result<Self, DynamoDbError> {
        let client = Arc::new(DynamoDbClient::from_config(config).await?);
        log::info!(
            "using DynamoDB at {} (region {}, users table '{}', roles table '{}')",
            client.endpoint(),
            client.region(),
            config.users_table,
            config.roles_table
        );

        Ok(Self {
            roles: Arc::new(DynamoDbRoleStore::new(client.clone(), &config.roles_table)),
            users: Arc::new(UserDirectory::new(client.clone(), &config.users_table)),
            executor: Arc::new(DynamoDbExecutor::new(client.clone())),
            client,
        })
    }
}
