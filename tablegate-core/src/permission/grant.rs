//! Permission value type.
//!
//! A permission is one of three closed shapes. Anything else read from a
//! role definition is inert: it parses to `None` and grants nothing.

use crate::action::Action;
use serde::{Deserialize, Serialize};

/// The global wildcard token.
pub const GLOBAL_WILDCARD: &str = "*";

/// A single grant held by a role.
///
/// Resources are stored lower-case, so comparisons against a lower-cased
/// resource name are exact.
///
/// # Example
///
/// ```rust
/// use tablegate_core::{Action, Permission};
///
/// let grant = Permission::parse("Customer:read").unwrap();
/// assert_eq!(grant, Permission::exact("customer", Action::Read));
/// assert_eq!(grant.to_string(), "customer:read");
///
/// assert_eq!(Permission::parse("*"), Some(Permission::Global));
/// assert!(Permission::parse("customer:drop").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    /// `*`: every action on every resource.
    Global,
    /// `<resource>:*`: every action on one resource.
    ResourceWildcard(String),
    /// `<resource>:<action>`: one action on one resource.
    Exact { resource: String, action: Action },
}

impl Permission {
    /// Grant every action on `resource`.
    pub fn resource_wildcard(resource: impl AsRef<str>) -> Self {
        Permission::ResourceWildcard(resource.as_ref().to_lowercase())
    }

    /// Grant `action` on `resource`.
    pub fn exact(resource: impl AsRef<str>, action: Action) -> Self {
        Permission::Exact {
            resource: resource.as_ref().to_lowercase(),
            action,
        }
    }

    /// Parse a permission string from an external role definition.
    ///
    /// Returns `None` for anything that is not `*`, `<resource>:*` or
    /// `<resource>:<action>` with a known action.
    pub fn parse(value: &str) -> Option<Self> {
        if value == GLOBAL_WILDCARD {
            return Some(Permission::Global);
        }

        let (resource, action) = value.split_once(':')?;
        if !is_valid_resource(resource) {
            return None;
        }

        if action == GLOBAL_WILDCARD {
            return Some(Permission::resource_wildcard(resource));
        }

        let action = action.parse::<Action>().ok()?;
        Some(Permission::exact(resource, action))
    }

    /// The resource this grant is scoped to, or `None` for the global wildcard.
    pub fn resource(&self) -> Option<&str> {
        match self {
            Permission::Global => None,
            Permission::ResourceWildcard(resource) => Some(resource),
            Permission::Exact { resource, .. } => Some(resource),
        }
    }

    /// Whether this grant is one of the two wildcard forms.
    pub fn is_wildcard(&self) -> bool {
        !matches!(self, Permission::Exact { .. })
    }
}

fn is_valid_resource(resource: &str) -> bool {
    !resource.is_empty()
        && resource != GLOBAL_WILDCARD
        && !resource.chars().any(|c| c.is_whitespace())
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Permission::Global => f.write_str(GLOBAL_WILDCARD),
            Permission::ResourceWildcard(resource) => write!(f, "{}:*", resource),
            Permission::Exact { resource, action } => write!(f, "{}:{}", resource, action),
        }
    }
}

/// Returned by the strict conversion used for serialized permissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed permission string '{0}'")]
pub struct MalformedPermission(pub String);

impl TryFrom<String> for Permission {
    type Error = MalformedPermission;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Permission::parse(&value).ok_or(MalformedPermission(value))
    }
}

impl From<Permission> for String {
    fn from(permission: Permission) -> Self {
        permission.to_string()
    }
}
