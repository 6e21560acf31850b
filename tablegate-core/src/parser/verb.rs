//! `aws dynamodb`-style verb commands.
//!
//! ```text
//! dynamodb get-item --table-name customer --key '{"id": {"S": "1"}}'
//! ```
//!
//! Tokenization is shell-style so quoted JSON survives as one token. Flags
//! become request parameters in DynamoDB's PascalCase naming.
//!
//! Quoting is gone after tokenization, so a value can never start with
//! `--`: it is read as the next flag. Flags that need a value reject this
//! with a syntax error. For JSON flags, pass such strings JSON-encoded
//! (`--key '"--x"'`).
//!
//! Batch verbs name their tables inside `--request-items`. Every table
//! there must be the `--table-name` table, which is the one authorized.

use super::{CommandDialect, Dialect, ParseError, ParsedCommand, Payload};
use crate::action::Action;
use serde_json::{Map, Value};

/// Leading token every verb command starts with.
pub const NAMESPACE: &str = "dynamodb";

/// Supported verbs and the action each one needs.
pub const VERBS: [(&str, Action); 8] = [
    ("get-item", Action::Read),
    ("query", Action::Read),
    ("scan", Action::Read),
    ("batch-get-item", Action::Read),
    ("put-item", Action::Write),
    ("batch-write-item", Action::Write),
    ("update-item", Action::Update),
    ("delete-item", Action::Delete),
];

/// Flags whose values are JSON documents.
const JSON_FLAGS: [&str; 6] = [
    "key",
    "item",
    "expression-attribute-names",
    "expression-attribute-values",
    "request-items",
    "exclusive-start-key",
];

/// Flags whose values are integers.
const INTEGER_FLAGS: [&str; 3] = ["limit", "segment", "total-segments"];

/// Expression flags. Like JSON and integer flags, they need a value.
const EXPRESSION_FLAGS: [&str; 6] = [
    "condition-expression",
    "filter-expression",
    "key-condition-expression",
    "projection-expression",
    "update-expression",
    "index-name",
];

const TABLE_NAME: &str = "TableName";
const REQUEST_ITEMS: &str = "RequestItems";

/// Look up the action for a verb. Verbs are matched lower-case.
pub fn verb_action(verb: &str) -> Option<Action> {
    VERBS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(verb))
        .map(|(_, action)| *action)
}

/// Parses `dynamodb <verb> --flag value ...` commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerbDialect;

impl CommandDialect for VerbDialect {
    fn dialect(&self) -> Dialect {
        Dialect::Verb
    }

    fn parse(&self, text: &str) -> Result<ParsedCommand, ParseError> {
        let tokens = shlex::split(text.trim()).ok_or_else(|| {
            ParseError::Syntax("unbalanced quotes or trailing escape".to_string())
        })?;
        let mut tokens = tokens.into_iter();

        let namespace = tokens.next().ok_or_else(|| {
            ParseError::Syntax(format!("empty command, expected '{} <verb>'", NAMESPACE))
        })?;
        if !namespace.eq_ignore_ascii_case(NAMESPACE) {
            return Err(ParseError::Syntax(format!(
                "expected '{} <verb>', found '{}'",
                NAMESPACE, namespace
            )));
        }

        let verb = tokens
            .next()
            .ok_or_else(|| ParseError::Syntax(format!("missing verb after '{}'", NAMESPACE)))?
            .to_ascii_lowercase();
        let action = verb_action(&verb).ok_or_else(|| ParseError::UnsupportedAction(verb.clone()))?;

        let params = parse_flags(tokens)?;
        let resource = table_name(&params)?.to_string();
        if verb.starts_with("batch-") {
            check_request_items(&params, &resource)?;
        }

        Ok(ParsedCommand::new(
            action,
            &resource,
            Payload::Verb { verb, params },
        ))
    }
}

fn parse_flags(tokens: impl Iterator<Item = String>) -> Result<Map<String, Value>, ParseError> {
    let mut params = Map::new();
    let mut tokens = tokens.peekable();

    while let Some(token) = tokens.next() {
        let Some(flag) = token.strip_prefix("--") else {
            return Err(ParseError::Syntax(format!(
                "unexpected argument '{}', expected a --flag",
                token
            )));
        };

        let flag = flag.to_ascii_lowercase();
        let name = pascal_case(&flag);
        if name.is_empty() {
            return Err(ParseError::Syntax(format!("invalid flag '{}'", token)));
        }
        if params.contains_key(&name) {
            return Err(ParseError::Syntax(format!(
                "flag --{} given more than once",
                flag
            )));
        }

        let value = match tokens.next_if(|next| !is_flag(next)) {
            Some(raw) => decode_value(&flag, raw),
            None if needs_value(&flag) => {
                return Err(ParseError::Syntax(format!(
                    "--{} needs a value (values cannot start with '--')",
                    flag
                )));
            }
            None => Value::Bool(true),
        };
        params.insert(name, value);
    }

    Ok(params)
}

fn table_name(params: &Map<String, Value>) -> Result<&str, ParseError> {
    match params.get(TABLE_NAME) {
        Some(Value::String(table)) if !table.is_empty() => Ok(table),
        Some(Value::String(_)) => Err(ParseError::MissingResource(
            "--table-name is empty".to_string(),
        )),
        Some(_) => Err(ParseError::MissingResource(
            "--table-name has no value".to_string(),
        )),
        None => Err(ParseError::MissingResource(
            "--table-name is required".to_string(),
        )),
    }
}

/// Every table in `RequestItems` must be `table`, compared lower-case.
fn check_request_items(params: &Map<String, Value>, table: &str) -> Result<(), ParseError> {
    let tables = match params.get(REQUEST_ITEMS) {
        Some(Value::Object(tables)) => tables,
        Some(_) => {
            return Err(ParseError::MissingResource(
                "--request-items must be a JSON object".to_string(),
            ))
        }
        None => {
            return Err(ParseError::MissingResource(
                "--request-items is required".to_string(),
            ))
        }
    };

    let table = table.to_lowercase();
    match tables.keys().find(|name| name.to_lowercase() != table) {
        Some(other) => Err(ParseError::Syntax(format!(
            "--request-items names table '{}', expected only '{}'",
            other, table
        ))),
        None => Ok(()),
    }
}

fn needs_value(flag: &str) -> bool {
    JSON_FLAGS.contains(&flag) || INTEGER_FLAGS.contains(&flag) || EXPRESSION_FLAGS.contains(&flag)
}

fn is_flag(token: &str) -> bool {
    token.starts_with("--")
}

fn decode_value(flag: &str, raw: String) -> Value {
    if JSON_FLAGS.contains(&flag) {
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(_) => Value::String(raw),
        }
    } else if INTEGER_FLAGS.contains(&flag) {
        match raw.parse::<i64>() {
            Ok(number) => Value::from(number),
            Err(_) => Value::String(raw),
        }
    } else {
        Value::String(raw)
    }
}

/// `table-name` to `TableName`.
pub(crate) fn pascal_case(flag: &str) -> String {
    flag.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `TableName` to `table-name`.
pub(crate) fn kebab_case(name: &str) -> String {
    let mut flag = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                flag.push('-');
            }
            flag.push(c.to_ascii_lowercase());
        } else {
            flag.push(c);
        }
    }
    flag
}

/// Render one verb command back to text.
///
/// JSON flags are always written JSON-encoded, so string values keep their
/// type and cannot be mistaken for a flag.
pub(crate) fn render(verb: &str, params: &Map<String, Value>) -> String {
    let mut parts = vec![NAMESPACE.to_string(), verb.to_string()];
    for (name, value) in params {
        let flag = kebab_case(name);
        let json = JSON_FLAGS.contains(&flag.as_str());
        parts.push(format!("--{}", flag));
        match value {
            Value::Bool(true) if !json => {}
            Value::String(text) if !json => parts.push(quote(text)),
            other => parts.push(quote(&other.to_string())),
        }
    }
    parts.join(" ")
}

fn quote(value: &str) -> String {
    shlex::try_quote(value)
        .map(|quoted| quoted.into_owned())
        .unwrap_or_else(|_| format!("'{}'", value.replace('\'', "'\\''")))
}
