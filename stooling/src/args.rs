//! JSON argument decoding helpers for tool handlers.
//!
//! ```rust
//! use stooling::{decode_arguments, parse_json_object, required_string};
//!
//! let value = decode_arguments(r#"{"city":"Oslo"}"#).expect("arguments should decode");
//! let args = parse_json_object(&value).expect("object should parse");
//! let city = required_string(&args, "city").expect("city should be present");
//! assert_eq!(city, "Oslo");
//! ```

use serde_json::{Map, Value};

use crate::ToolError;

/// Decodes the raw argument string emitted by the model. Blank input
/// decodes to an empty object.
pub fn decode_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_str(raw)
        .map_err(|err| ToolError::invalid_arguments(format!("invalid JSON arguments: {err}")))
}

pub fn parse_json_object(arguments: &Value) -> Result<Map<String, Value>, ToolError> {
    arguments
        .as_object()
        .cloned()
        .ok_or_else(|| ToolError::invalid_arguments("expected JSON object arguments"))
}

pub fn required_string(args: &Map<String, Value>, key: &str) -> Result<String, ToolError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ToolError::invalid_arguments(format!("missing required string: '{key}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_arguments_decode_to_empty_object() {
        assert_eq!(decode_arguments("  ").expect("blank"), Value::Object(Map::new()));
    }

    #[test]
    fn invalid_json_returns_invalid_arguments() {
        let error = decode_arguments("{").expect_err("json should fail");
        assert_eq!(error.kind, crate::ToolErrorKind::InvalidArguments);
    }

    #[test]
    fn missing_required_string_is_reported_by_key() {
        let args = parse_json_object(&serde_json::json!({"count": 3})).expect("object");
        let error = required_string(&args, "city").expect_err("city is missing");
        assert!(error.message.contains("city"));
    }
}
