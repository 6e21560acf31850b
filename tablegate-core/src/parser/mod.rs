//! Command parsing.
//!
//! Commands arrive as untrusted text in one of two dialects. Each dialect
//! reduces its input to a [`ParsedCommand`]: the [`Action`] it performs, the
//! lower-cased resource it touches and a dialect-specific payload that the
//! storage executor needs to run it.
//!
//! Parsing is positional and lenient about everything except the resource:
//! the resource is always the literal token the dialect's rules point at,
//! never a guess.
//!
//! # Example
//!
//! ```rust
//! use tablegate_core::{parse, Action, Dialect};
//!
//! let cmd = parse(Dialect::Statement, "SELECT * FROM customer WHERE id=1").unwrap();
//! assert_eq!(cmd.action(), Action::Read);
//! assert_eq!(cmd.resource(), "customer");
//!
//! let cmd = parse(Dialect::Verb, "dynamodb delete-item --table-name Orders --key '{}'").unwrap();
//! assert_eq!(cmd.action(), Action::Delete);
//! assert_eq!(cmd.resource(), "orders");
//! ```

mod statement;
mod verb;

pub use statement::StatementDialect;
pub use verb::{verb_action, VerbDialect, NAMESPACE, VERBS};

use crate::action::Action;
use crate::permission::Permission;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Errors from parsing command text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("missing resource: {0}")]
    MissingResource(String),

    #[error("unsupported action '{0}'")]
    UnsupportedAction(String),
}

/// The two command syntaxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PartiQL-style statements: `SELECT * FROM customer`.
    #[default]
    #[serde(alias = "partiql", alias = "sql")]
    Statement,
    /// `aws dynamodb`-style verbs: `dynamodb scan --table-name customer`.
    #[serde(alias = "cli")]
    Verb,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Statement => "statement",
            Dialect::Verb => "verb",
        }
    }

    /// Parse `text` with this dialect.
    pub fn parse(self, text: &str) -> Result<ParsedCommand, ParseError> {
        match self {
            Dialect::Statement => StatementDialect.parse(text),
            Dialect::Verb => VerbDialect.parse(text),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a dialect name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}' (expected statement or verb)")]
pub struct UnknownDialect(pub String);

impl std::str::FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "statement" | "partiql" | "sql" => Ok(Dialect::Statement),
            "verb" | "cli" => Ok(Dialect::Verb),
            _ => Err(UnknownDialect(value.to_string())),
        }
    }
}

/// Shared capability of both dialects.
pub trait CommandDialect: Send + Sync {
    /// Which dialect this is.
    fn dialect(&self) -> Dialect;

    /// Reduce `text` to a command, or explain why it can't be.
    fn parse(&self, text: &str) -> Result<ParsedCommand, ParseError>;
}

/// Parse `text` in `dialect`.
pub fn parse(dialect: Dialect, text: &str) -> Result<ParsedCommand, ParseError> {
    dialect.parse(text)
}

/// What the executor needs to run a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dialect", rename_all = "lowercase")]
pub enum Payload {
    /// Statement text, trimmed.
    Statement { text: String },
    /// Lower-case verb and PascalCase request parameters.
    Verb {
        verb: String,
        params: Map<String, Value>,
    },
}

/// The canonical intent of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedCommand {
    action: Action,
    resource: String,
    payload: Payload,
}

impl ParsedCommand {
    pub(crate) fn new(action: Action, resource: &str, payload: Payload) -> Self {
        Self {
            action,
            resource: resource.to_lowercase(),
            payload,
        }
    }

    /// Build the verb command behind a structured item request.
    ///
    /// `params` holds the request parameters other than `TableName`, which
    /// is filled in from `table`. Reads become `get-item`, writes and updates
    /// `put-item` (an update overwrites the whole item) and deletes
    /// `delete-item`. The action is kept as given, so an update still needs
    /// `<table>:update`.
    pub fn item_request(
        action: Action,
        table: &str,
        mut params: Map<String, Value>,
    ) -> Result<Self, ParseError> {
        if table.trim().is_empty() {
            return Err(ParseError::MissingResource("table name is empty".to_string()));
        }

        let verb = match action {
            Action::Read => "get-item",
            Action::Write | Action::Update => "put-item",
            Action::Delete => "delete-item",
        };
        params.insert("TableName".to_string(), Value::String(table.to_string()));

        Ok(Self::new(
            action,
            table,
            Payload::Verb {
                verb: verb.to_string(),
                params,
            },
        ))
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Lower-cased resource name.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn dialect(&self) -> Dialect {
        match self.payload {
            Payload::Statement { .. } => Dialect::Statement,
            Payload::Verb { .. } => Dialect::Verb,
        }
    }

    /// The exact grant this command needs.
    pub fn required_permission(&self) -> Permission {
        Permission::exact(&self.resource, self.action)
    }

    /// Render the command back to text in its own dialect.
    ///
    /// Parsing the result yields an equal command. Item requests built for
    /// updates render as `put-item` and so re-parse as writes.
    pub fn canonical_text(&self) -> String {
        match &self.payload {
            Payload::Statement { text } => text.clone(),
            Payload::Verb { verb, params } => verb::render(verb, params),
        }
    }
}

impl std::fmt::Display for ParsedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} on {}", self.action, self.resource)
    }
}
