//! Request body field checks.
//!
//! Only the JSON type of each field is checked. Errors use the conventional
//! `{ type, value, msg, path, location }` entry shape so clients can point at
//! the offending field.

use serde::Serialize;
use serde_json::Value;

/// One failing field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// Absent when the field was missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub msg: &'static str,
    pub path: String,
    pub location: &'static str,
}

impl FieldError {
    fn invalid_body_field(path: &str, value: Option<&Value>) -> Self {
        Self {
            kind: "field",
            value: value.cloned(),
            msg: "Invalid value",
            path: path.to_string(),
            location: "body",
        }
    }
}

/// Check that every field in `fields` is present in `body` as a JSON string.
///
/// A body that is not an object fails every field.
pub fn require_strings(body: &Value, fields: &[&str]) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = fields
        .iter()
        .filter_map(|&field| {
            let value = body.get(field);
            match value {
                Some(Value::String(_)) => None,
                _ => Some(FieldError::invalid_body_field(field, value)),
            }
        })
        .collect();

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Read an optional string field, treating anything else as empty.
pub fn string_or_empty<'a>(body: &'a Value, field: &str) -> &'a str {
    body.get(field).and_then(Value::as_str).unwrap_or("")
}
