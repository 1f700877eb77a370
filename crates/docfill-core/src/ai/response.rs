//! Parsing of model answers.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::AiError;
use crate::models::fields::{FieldKind, FieldMap};
use crate::provenance::{HintMap, SourceHint};

/// Remove surrounding Markdown code fences.
pub fn strip_code_fences(content: &str) -> &str {
    let mut s = content.trim();
    if let Some(rest) = s.strip_prefix("```json") {
        s = rest;
    } else if let Some(rest) = s.strip_prefix("```") {
        s = rest;
    }
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

fn parse_object(content: &str) -> Result<Map<String, Value>, AiError> {
    let body = strip_code_fences(content);
    if body.is_empty() {
        return Err(AiError::EmptyResponse);
    }

    match serde_json::from_str(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(AiError::MalformedOutput(format!(
            "expected a JSON object, got {}",
            json_type(&other)
        ))),
        Err(e) => Err(AiError::MalformedOutput(e.to_string())),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Field value as text; `null`, blanks and nested values yield `None`.
fn field_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn collect_fields(map: &Map<String, Value>) -> FieldMap {
    let mut fields = FieldMap::new();
    for (key, value) in map {
        let Ok(kind) = key.parse::<FieldKind>() else {
            debug!("ignoring unknown field {:?}", key);
            continue;
        };
        if let Some(v) = field_value(value) {
            fields.insert(kind, v);
        }
    }
    fields
}

/// Parse a flat field → value object.
pub fn parse_fields(content: &str) -> Result<FieldMap, AiError> {
    parse_object(content).map(|map| collect_fields(&map))
}

/// Parse a `{"fields": {...}, "source_lines": {...}}` answer.
///
/// A missing or non-object `fields` is malformed. `source_lines` is
/// optional; hints for fields without a value are dropped.
pub fn parse_fields_with_sources(content: &str) -> Result<(FieldMap, HintMap), AiError> {
    let map = parse_object(content)?;

    let fields = match map.get("fields") {
        Some(Value::Object(inner)) => collect_fields(inner),
        Some(other) => {
            return Err(AiError::MalformedOutput(format!(
                "\"fields\" is a {}",
                json_type(other)
            )));
        }
        None => return Err(AiError::MalformedOutput("missing \"fields\"".to_string())),
    };

    let mut hints = HintMap::new();
    if let Some(Value::Object(sources)) = map.get("source_lines") {
        for (key, value) in sources {
            let Ok(kind) = key.parse::<FieldKind>() else {
                continue;
            };
            if !fields.contains_key(&kind) {
                continue;
            }
            if let Some(hint) = SourceHint::from_json(value) {
                hints.insert(kind, hint);
            }
        }
    }

    Ok((fields, hints))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{}\n```  "), "{}");
        assert_eq!(strip_code_fences("{}"), "{}");
    }

    #[test]
    fn test_parse_fields_normalizes_values() {
        let content = r#"```json
        {"name": " Jane Smith ", "email": null, "amount": 1250.5,
         "zip_code": 12345, "salary": "lots", "company": ""}
        ```"#;

        let fields = parse_fields(content).unwrap();
        let expected: FieldMap = [
            (FieldKind::Name, "Jane Smith"),
            (FieldKind::Amount, "1250.5"),
            (FieldKind::ZipCode, "12345"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect();

        assert_eq!(fields, expected);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse_fields("  "), Err(AiError::EmptyResponse)));
        assert!(matches!(parse_fields("```json\n```"), Err(AiError::EmptyResponse)));
        assert!(matches!(parse_fields("not json"), Err(AiError::MalformedOutput(_))));
        assert!(matches!(parse_fields("[1, 2]"), Err(AiError::MalformedOutput(_))));
    }

    #[test]
    fn test_parse_fields_with_sources() {
        let content = r#"{
            "fields": {"name": "Jane Smith", "phone": "555-867-5309", "email": null},
            "source_lines": {"name": 1, "phone": "2: Phone: 555-867-5309", "email": 3}
        }"#;

        let (fields, hints) = parse_fields_with_sources(content).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(hints.get(&FieldKind::Name), Some(&SourceHint::Index(1)));
        assert_eq!(
            hints.get(&FieldKind::Phone),
            Some(&SourceHint::Text("2: Phone: 555-867-5309".to_string()))
        );
        assert_eq!(hints.get(&FieldKind::Email), None);
    }

    #[test]
    fn test_flat_answer_is_malformed_when_sources_expected() {
        let result = parse_fields_with_sources(r#"{"name": "Jane Smith"}"#);
        assert!(matches!(result, Err(AiError::MalformedOutput(_))));
    }

    #[test]
    fn test_missing_source_lines_is_fine() {
        let (fields, hints) = parse_fields_with_sources(r#"{"fields": {"name": "A B"}}"#).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(hints.is_empty());
    }
}
