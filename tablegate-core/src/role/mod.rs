//! Roles, role stores and permission resolution.
//!
//! - **[`Role`]**: a named bundle of permission strings
//! - **[`RoleStore`]**: point lookups of roles by name
//! - **[`MemoryRoleStore`]**: in-process store
//! - **[`FileRoleStore`]**: JSON file store
//! - **[`PermissionResolver`]**: role names to a [`PermissionSet`], with an optional TTL cache
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tablegate_core::role::{MemoryRoleStore, PermissionResolver};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryRoleStore::new()
//!     .with_role("reader", ["customer:read"])
//!     .with_role("writer", ["customer:write"]);
//! let resolver = PermissionResolver::new(Arc::new(store));
//!
//! let perms = resolver.resolve(["reader", "writer", "ghost"]).await.unwrap();
//! assert_eq!(perms.to_strings(), vec!["customer:read", "customer:write"]);
//! # });
//! ```

mod resolver;
mod store;

pub use resolver::{PermissionResolver, ResolutionError};
pub use store::{FileRoleStore, MemoryRoleStore, RoleStore, RoleStoreError};

use crate::permission::PermissionSet;
use serde::{Deserialize, Serialize};

/// A named bundle of permission strings.
///
/// Strings are kept as stored. They are only validated when turned into a
/// [`PermissionSet`], where malformed entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "role_name")]
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Role {
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::from_strings(&self.permissions)
    }
}
