//! The storage execution seam.
//!
//! An executor only ever receives a [`PermittedCommand`], which can only be
//! obtained from an allow decision.

use crate::engine::PermittedCommand;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What the store returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExecutionOutcome {
    /// Items read, as plain JSON objects. May be empty.
    Items { items: Vec<Value> },
    /// A write, update or delete completed.
    Acknowledged { operation: String },
}

impl ExecutionOutcome {
    pub fn items(items: Vec<Value>) -> Self {
        ExecutionOutcome::Items { items }
    }

    pub fn acknowledged(operation: impl Into<String>) -> Self {
        ExecutionOutcome::Acknowledged {
            operation: operation.into(),
        }
    }
}

/// Failures reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutionError {
    /// The store refused the request.
    #[error("{code}: {message}")]
    Rejected { code: String, message: String },

    /// The store could not be reached or is overloaded.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The executor does not know how to run this command.
    #[error("unsupported command: {0}")]
    Unsupported(String),
}

/// Runs authorized commands against the store.
#[async_trait]
pub trait StorageExecutor: Send + Sync {
    async fn execute(&self, command: &PermittedCommand) -> Result<ExecutionOutcome, ExecutionError>;
}
