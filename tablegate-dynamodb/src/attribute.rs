//! Conversion between DynamoDB's typed attribute JSON and plain JSON.
//!
//! DynamoDB wraps every value in a one-key object naming its type, e.g.
//! `{"S": "alice"}` or `{"N": "42"}`. Callers of the gateway see plain JSON.

use serde_json::{Map, Number, Value};

/// Unwrap one typed attribute value.
///
/// Numbers that do not parse as JSON numbers stay strings. Binary values stay
/// base64 strings. Anything not shaped like an attribute value is returned
/// unchanged.
pub fn to_plain(value: &Value) -> Value {
    let Some(object) = value.as_object().filter(|o| o.len() == 1) else {
        return value.clone();
    };
    let Some((tag, inner)) = object.iter().next() else {
        return value.clone();
    };

    match (tag.as_str(), inner) {
        ("S", Value::String(s)) | ("B", Value::String(s)) => Value::String(s.clone()),
        ("N", Value::String(n)) => number(n),
        ("BOOL", Value::Bool(b)) => Value::Bool(*b),
        ("NULL", _) => Value::Null,
        ("L", Value::Array(items)) => Value::Array(items.iter().map(to_plain).collect()),
        ("M", Value::Object(map)) => item_to_plain(map),
        ("SS", Value::Array(items)) | ("BS", Value::Array(items)) => Value::Array(items.clone()),
        ("NS", Value::Array(items)) => Value::Array(
            items
                .iter()
                .map(|n| n.as_str().map(number).unwrap_or_else(|| n.clone()))
                .collect(),
        ),
        _ => value.clone(),
    }
}

/// Unwrap every attribute of an item.
pub fn item_to_plain(item: &Map<String, Value>) -> Value {
    Value::Object(
        item.iter()
            .map(|(name, value)| (name.clone(), to_plain(value)))
            .collect(),
    )
}

/// Wrap a plain JSON value as a typed attribute value.
pub fn from_plain(value: &Value) -> Value {
    let (tag, inner) = match value {
        Value::String(s) => ("S", Value::String(s.clone())),
        Value::Number(n) => ("N", Value::String(n.to_string())),
        Value::Bool(b) => ("BOOL", Value::Bool(*b)),
        Value::Null => ("NULL", Value::Bool(true)),
        Value::Array(items) => ("L", Value::Array(items.iter().map(from_plain).collect())),
        Value::Object(map) => ("M", Value::Object(item_from_plain(map))),
    };
    let mut wrapped = Map::new();
    wrapped.insert(tag.to_string(), inner);
    Value::Object(wrapped)
}

/// Wrap every attribute of a plain JSON object.
pub fn item_from_plain(item: &Map<String, Value>) -> Map<String, Value> {
    item.iter()
        .map(|(name, value)| (name.clone(), from_plain(value)))
        .collect()
}

/// Read a string or a list of strings: `S`, `SS`, or `L` of `S`.
///
/// Non-string list members are skipped.
pub fn strings(value: &Value) -> Option<Vec<String>> {
    match to_plain(value) {
        Value::String(s) => Some(vec![s]),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    }
}

fn number(text: &str) -> Value {
    text.parse::<Number>()
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_to_plain() {
        let item = json!({
            "id": {"S": "1"},
            "age": {"N": "42"},
            "score": {"N": "1.5"},
            "active": {"BOOL": true},
            "nickname": {"NULL": true},
            "tags": {"SS": ["a", "b"]},
            "lucky": {"NS": ["7", "13"]},
            "address": {"M": {"city": {"S": "Oslo"}}},
            "history": {"L": [{"S": "x"}, {"N": "2"}]}
        });

        let plain = item_to_plain(item.as_object().unwrap());
        assert_eq!(
            plain,
            json!({
                "id": "1",
                "age": 42,
                "score": 1.5,
                "active": true,
                "nickname": null,
                "tags": ["a", "b"],
                "lucky": [7, 13],
                "address": {"city": "Oslo"},
                "history": ["x", 2]
            })
        );
    }

    #[test]
    fn test_from_plain_wraps_nested_values() {
        assert_eq!(
            from_plain(&json!({"name": "alice", "age": 30, "tags": ["a"], "gone": null})),
            json!({"M": {
                "name": {"S": "alice"},
                "age": {"N": "30"},
                "tags": {"L": [{"S": "a"}]},
                "gone": {"NULL": true}
            }})
        );
    }

    #[test]
    fn test_unparseable_number_stays_a_string() {
        assert_eq!(to_plain(&json!({"N": "12abc"})), json!("12abc"));
    }

    #[test]
    fn test_unknown_shapes_pass_through() {
        let odd = json!({"X": 1});
        assert_eq!(to_plain(&odd), odd);
        assert_eq!(to_plain(&json!("bare")), json!("bare"));
    }

    #[test]
    fn test_strings_accepts_all_list_shapes() {
        assert_eq!(strings(&json!({"S": "admin"})), Some(vec!["admin".to_string()]));
        assert_eq!(
            strings(&json!({"SS": ["a", "b"]})),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(
            strings(&json!({"L": [{"S": "a"}, {"N": "1"}]})),
            Some(vec!["a".to_string()])
        );
        assert_eq!(strings(&json!({"N": "1"})), None);
    }
}
