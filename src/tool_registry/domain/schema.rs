//! Structural validation of tool inputs against their JSON schema.
//!
//! Only the subset of JSON Schema that tool declarations use in practice is
//! enforced: a top-level `type: object`, `required`, and primitive `type`
//! constraints on declared properties. Unknown keywords are ignored.

use super::SchemaViolation;
use serde_json::{Map, Value};

/// Checks `input` against `schema`.
///
/// # Errors
///
/// Returns the first [`SchemaViolation`] found.
///
/// # Examples
///
/// ```
/// use turnstile::tool_registry::domain::validate_input;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": {"path": {"type": "string"}},
///     "required": ["path"]
/// });
/// assert!(validate_input(&schema, &json!({"path": "/tmp/x"})).is_ok());
/// assert!(validate_input(&schema, &json!({})).is_err());
/// ```
pub fn validate_input(schema: &Value, input: &Value) -> Result<(), SchemaViolation> {
    let expects_object = schema.get("type").and_then(Value::as_str) == Some("object")
        || schema.get("properties").is_some()
        || schema.get("required").is_some();
    if !expects_object {
        return Ok(());
    }

    let fields = input.as_object().ok_or(SchemaViolation::NotAnObject)?;

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for property in required.iter().filter_map(Value::as_str) {
            if !fields.contains_key(property) {
                return Err(SchemaViolation::MissingProperty(property.to_owned()));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        check_property_types(properties, fields)?;
    }

    Ok(())
}

fn check_property_types(
    properties: &Map<String, Value>,
    fields: &Map<String, Value>,
) -> Result<(), SchemaViolation> {
    for (property, declaration) in properties {
        let Some(value) = fields.get(property) else {
            continue;
        };
        let Some(expected) = declaration.get("type").and_then(Value::as_str) else {
            continue;
        };
        if !matches_type(expected, value) {
            return Err(SchemaViolation::WrongType {
                property: property.clone(),
                expected: expected.to_owned(),
            });
        }
    }
    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}
