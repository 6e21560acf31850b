//! Permissions and the decision engine.
//!
//! A role grants permission strings in one of three shapes:
//!
//! - `*` grants every action on every resource
//! - `<resource>:*` grants every action on one resource
//! - `<resource>:<action>` grants one action on one resource
//!
//! [`decide`] checks a `(resource, action)` pair against a [`PermissionSet`].

mod decision;
mod grant;
mod set;

pub use decision::{decide, Decision};
pub use grant::{MalformedPermission, Permission, GLOBAL_WILDCARD};
pub use set::PermissionSet;
