use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::SercError;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// True if `text` can be used verbatim as a C identifier.
pub fn is_identifier(text: &str) -> bool {
    IDENTIFIER.is_match(text)
}

/// Short name of a JSON node's shape, for error messages.
pub fn node_kind(node: &Value) -> &'static str {
    match node {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "list",
        Value::Object(_) => "dictionary",
    }
}

/// Reads an optional string field, failing if it is present with another shape.
pub fn optional_str<'a>(
    node: &'a Map<String, Value>,
    key: &str,
    what: &str,
) -> Result<Option<&'a str>, SercError> {
    match node.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(SercError::parse(format!(
            "{} must be a string, found a {}",
            what,
            node_kind(other)
        ))),
    }
}
