//! PartiQL-style statements.
//!
//! Only enough of the statement is read to find the action and the table.
//! Tokens are split on whitespace; quoted table names are unquoted at
//! extraction time but quotes get no other treatment.

use super::{CommandDialect, Dialect, ParseError, ParsedCommand, Payload};
use crate::action::Action;

const EXPECTED_KEYWORDS: &str = "SELECT, INSERT, UPDATE or DELETE";

/// Parses `SELECT`, `INSERT`, `UPDATE` and `DELETE` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementDialect;

impl CommandDialect for StatementDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Statement
    }

    fn parse(&self, text: &str) -> Result<ParsedCommand, ParseError> {
        let text = text.trim();
        let tokens: Vec<&str> = text.split_whitespace().collect();

        let Some(keyword) = tokens.first() else {
            return Err(ParseError::Syntax(format!(
                "empty statement, expected {}",
                EXPECTED_KEYWORDS
            )));
        };

        let (action, resource) = match keyword.to_ascii_uppercase().as_str() {
            "SELECT" => (Action::Read, token_after(&tokens, "FROM")?),
            "INSERT" => (Action::Write, token_after(&tokens, "INTO")?),
            "UPDATE" => (
                Action::Update,
                tokens
                    .get(1)
                    .copied()
                    .ok_or_else(|| ParseError::MissingResource("UPDATE has no table name".into()))?,
            ),
            "DELETE" => (Action::Delete, token_after(&tokens, "FROM")?),
            other => {
                return Err(ParseError::Syntax(format!(
                    "unsupported statement '{}', expected {}",
                    other, EXPECTED_KEYWORDS
                )))
            }
        };

        let resource = unquote(resource);
        if resource.is_empty() {
            return Err(ParseError::MissingResource(format!(
                "empty table name in {} statement",
                keyword.to_ascii_uppercase()
            )));
        }

        Ok(ParsedCommand::new(
            action,
            resource,
            Payload::Statement {
                text: text.to_string(),
            },
        ))
    }
}

/// The token right after the first occurrence of `companion`.
fn token_after<'a>(tokens: &[&'a str], companion: &str) -> Result<&'a str, ParseError> {
    let position = tokens
        .iter()
        .skip(1)
        .position(|token| token.eq_ignore_ascii_case(companion))
        .ok_or_else(|| ParseError::Syntax(format!("expected {}", companion)))?;

    // position is relative to the skipped iterator
    tokens
        .get(position + 2)
        .copied()
        .ok_or_else(|| ParseError::MissingResource(format!("no table name after {}", companion)))
}

fn unquote(token: &str) -> &str {
    token.trim_matches(|c| c == '"' || c == '\'')
}
