// Translation catalog schema (flat message id -> text mapping)

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranslationError {
    #[error("failed to read translations file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("translations file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("translations root must be a JSON object, found {found}")]
    NotAMapping { found: &'static str },

    #[error("translation keys must be non-empty strings")]
    EmptyKey,

    #[error("translation value for '{key}' must be a string, found {found}")]
    NonStringValue { key: String, found: &'static str },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TranslationSummary {
    pub keys: usize,
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

/// Check the catalog contract, stopping at the first violation.
///
/// Values are checked for type only: an empty string value is accepted.
pub fn validate_translations(document: &Value) -> Result<TranslationSummary, TranslationError> {
    let map = document
        .as_object()
        .ok_or(TranslationError::NotAMapping {
            found: kind(document),
        })?;

    for (key, value) in map {
        if key.is_empty() {
            return Err(TranslationError::EmptyKey);
        }
        if !value.is_string() {
            return Err(TranslationError::NonStringValue {
                key: key.clone(),
                found: kind(value),
            });
        }
    }

    Ok(TranslationSummary { keys: map.len() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_string_pairs() {
        let summary = validate_translations(&json!({"welcome": "Hello", "bye": "Goodbye"})).unwrap();
        assert_eq!(summary.keys, 2);
    }

    #[test]
    fn test_accepts_empty_values() {
        let summary = validate_translations(&json!({"placeholder": ""})).unwrap();
        assert_eq!(summary.keys, 1);
    }

    #[test]
    fn test_accepts_empty_mapping() {
        assert_eq!(validate_translations(&json!({})).unwrap().keys, 0);
    }

    #[test]
    fn test_rejects_empty_key() {
        let err = validate_translations(&json!({"welcome": "Hello", "": "x"})).unwrap_err();
        assert!(matches!(err, TranslationError::EmptyKey));
    }

    #[test]
    fn test_rejects_non_string_value() {
        for bad in [json!(1), json!(null), json!(["a"]), json!({"nested": "x"}), json!(true)] {
            let err = validate_translations(&json!({"welcome": bad})).unwrap_err();
            assert!(
                matches!(err, TranslationError::NonStringValue { ref key, .. } if key == "welcome"),
                "unexpected error: {err}"
            );
        }
    }

    #[test]
    fn test_rejects_non_mapping_root() {
        for (doc, found) in [
            (json!(["welcome", "Hello"]), "array"),
            (json!("Hello"), "string"),
            (json!(42), "number"),
            (json!(null), "null"),
        ] {
            match validate_translations(&doc) {
                Err(TranslationError::NotAMapping { found: f }) => assert_eq!(f, found),
                other => panic!("expected NotAMapping, got {other:?}"),
            }
        }
    }
}
