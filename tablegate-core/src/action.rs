//! The closed action vocabulary.

use serde::{Deserialize, Serialize};

/// An operation class a permission can grant.
///
/// Every command, regardless of dialect, is reduced to one of these four
/// actions before it is checked against a principal's permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Reads one or more items.
    Read,
    /// Creates or overwrites items.
    Write,
    /// Modifies existing items.
    Update,
    /// Removes items.
    Delete,
}

impl Action {
    /// All actions, in vocabulary order.
    pub const ALL: [Action; 4] = [Action::Read, Action::Write, Action::Update, Action::Delete];

    /// The canonical lower-case name used in permission strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Read => "read",
            Action::Write => "write",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not part of the action vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}' (expected read, write, update or delete)")]
pub struct UnknownAction(pub String);

impl std::str::FromStr for Action {
    type Err = UnknownAction;

    /// Parsing is exact: `READ` is not an action.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "read" => Ok(Action::Read),
            "write" => Ok(Action::Write),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}
