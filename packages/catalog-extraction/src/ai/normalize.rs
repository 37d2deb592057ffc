//! Turning a model reply into a flat [`Record`].

use serde_json::{Map, Value};

use crate::error::{ExtractResult, ExtractionError};
use crate::types::record::Record;

/// Parse a model reply into a record.
///
/// The reply must be one JSON object (optionally inside a markdown code
/// fence). An object whose only value is another object is unwrapped one
/// level, so `{"product": {...}}` and `{...}` give the same record.
pub fn parse_record(raw: &str) -> ExtractResult<Record> {
    let body = openai_client::strip_code_blocks(raw);
    if body.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(body).map_err(|e| ExtractionError::MalformedResponse {
        reason: e.to_string(),
    })?;

    let object = match value {
        Value::Object(map) => unwrap_single(map),
        other => {
            return Err(ExtractionError::NotAnObject {
                found: kind(&other),
            })
        }
    };

    if object.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let mut record = Record::new();
    for (key, value) in object {
        record.insert(key, flatten(value));
    }
    Ok(record)
}

fn unwrap_single(map: Map<String, Value>) -> Map<String, Value> {
    if map.len() != 1 || !map.values().all(Value::is_object) {
        return map;
    }
    map.into_iter()
        .next()
        .and_then(|(_, value)| match value {
            Value::Object(inner) => Some(inner),
            _ => None,
        })
        .unwrap_or_default()
}

/// Render a JSON value as cell text. `null` means "no value".
pub fn flatten(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) if items.iter().all(is_scalar) => Some(
            items
                .into_iter()
                .filter_map(flatten)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        other => Some(other.to_string()),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_object_keeps_order() {
        let record =
            parse_record(r#"{"Product name":"Gauze","McKesson #":"123","Brand #":null}"#).unwrap();
        let keys: Vec<_> = record.keys().collect();
        assert_eq!(keys, vec!["Product name", "McKesson #", "Brand #"]);
        assert_eq!(record.get("Brand #"), None);
        assert!(record.contains_key("Brand #"));
    }

    #[test]
    fn test_code_fence_and_wrapper_object() {
        let raw = "```json\n{\"product\": {\"Form\": \"Pad\", \"Volume\": 5}}\n```";
        let record = parse_record(raw).unwrap();
        assert_eq!(record.get("Form"), Some("Pad"));
        assert_eq!(record.get("Volume"), Some("5"));
        assert!(!record.contains_key("product"));
    }

    #[test]
    fn test_flatten_values() {
        assert_eq!(flatten(json!(true)), Some("true".into()));
        assert_eq!(flatten(json!(["Latex", null, "Cotton"])), Some("Latex, Cotton".into()));
        assert_eq!(flatten(json!({"w": 2})), Some(r#"{"w":2}"#.into()));
        assert_eq!(flatten(json!([{"a": 1}])), Some(r#"[{"a":1}]"#.into()));
        assert_eq!(flatten(json!(null)), None);
    }

    #[test]
    fn test_error_cases() {
        assert!(matches!(parse_record("   "), Err(ExtractionError::EmptyResponse)));
        assert!(matches!(parse_record("{}"), Err(ExtractionError::EmptyResponse)));
        assert!(matches!(
            parse_record("Sorry, I cannot help"),
            Err(ExtractionError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_record(r#"["a","b"]"#),
            Err(ExtractionError::NotAnObject { found: "array" })
        ));
    }
}
