//! Typed field access over a JSON field map.
//!
//! Paths are dot separated; a segment addressing an array must be a numeric
//! index (`tags.0`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Why a condition could not be evaluated. Each still counts as a non-match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    #[error("field not found: {path}")]
    FieldNotFound { path: String },

    #[error("field {path} is {actual}, expected {expected}")]
    FieldWrongType {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("invalid pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Resolve `path` in `root`. A `null` leaf counts as missing.
pub fn get_field<'v>(root: &'v Value, path: &str) -> Result<&'v Value, FieldError> {
    let not_found = || FieldError::FieldNotFound {
        path: path.to_string(),
    };
    if path.is_empty() {
        return Err(not_found());
    }

    let mut current = root;
    let mut walked = String::new();
    for segment in path.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => match segment.parse::<usize>() {
                Ok(i) => items.get(i),
                Err(_) => {
                    return Err(FieldError::FieldWrongType {
                        path: walked,
                        expected: "object".to_string(),
                        actual: "array".to_string(),
                    })
                }
            },
            other if !walked.is_empty() => {
                return Err(FieldError::FieldWrongType {
                    path: walked,
                    expected: "object or array".to_string(),
                    actual: type_name(other).to_string(),
                })
            }
            _ => None,
        };
        current = next.ok_or_else(not_found)?;
        if !walked.is_empty() {
            walked.push('.');
        }
        walked.push_str(segment);
    }

    if current.is_null() {
        Err(not_found())
    } else {
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc() -> Value {
        json!({
            "title": "Quarterly report",
            "estimatedHours": 2.5,
            "description": null,
            "tags": ["finance", "q3"],
            "meta": {"owner": {"name": "Ana"}}
        })
    }

    #[test]
    fn nested_and_indexed_paths_resolve() {
        let doc = doc();
        assert_eq!(get_field(&doc, "meta.owner.name").unwrap(), "Ana");
        assert_eq!(get_field(&doc, "tags.1").unwrap(), "q3");
    }

    #[test]
    fn missing_and_null_are_not_found() {
        let doc = doc();
        for path in ["nope", "description", "tags.5", "meta.owner.age", ""] {
            assert!(
                matches!(get_field(&doc, path), Err(FieldError::FieldNotFound { .. })),
                "{path}"
            );
        }
    }

    #[test]
    fn walking_through_a_scalar_is_wrong_type() {
        let doc = doc();
        let err = get_field(&doc, "title.length").unwrap_err();
        assert_eq!(
            err,
            FieldError::FieldWrongType {
                path: "title".into(),
                expected: "object or array".into(),
                actual: "string".into(),
            }
        );
        assert!(matches!(
            get_field(&doc, "tags.first"),
            Err(FieldError::FieldWrongType { .. })
        ));
    }
}
