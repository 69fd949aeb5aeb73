//! Pulling structured data out of free-text completions

use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::types::{LLMError, Result};

/// Extract the outermost JSON object from a completion.
///
/// Markdown code fences are stripped, then everything from the first `{`
/// to the last `}` is parsed.
pub fn extract_json_object(text: &str) -> Result<Value> {
    let cleaned = text.replace("```json", "").replace("```", "");

    let start = cleaned.find('{');
    let end = cleaned.rfind('}');
    let candidate = match (start, end) {
        (Some(start), Some(end)) if start < end => &cleaned[start..=end],
        _ => {
            return Err(LLMError::MalformedJson {
                message: "no JSON object found in response".to_string(),
            })
        }
    };

    serde_json::from_str(candidate).map_err(|e| LLMError::MalformedJson {
        message: e.to_string(),
    })
}

/// Read `field` as a finite, strictly positive decimal.
///
/// Numeric strings are accepted; anything else is an
/// [`LLMError::InvalidField`].
pub fn positive_decimal(object: &Value, field: &str) -> Result<Decimal> {
    let invalid = |message: String| LLMError::InvalidField {
        field: field.to_string(),
        message,
    };

    let value = match object.get(field) {
        None | Some(Value::Null) => return Err(invalid("missing".to_string())),
        Some(v) => v,
    };

    let parsed = match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Decimal::from(i)),
            None => n.as_f64().and_then(Decimal::from_f64),
        },
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        _ => None,
    };

    match parsed {
        Some(d) if d > Decimal::ZERO => Ok(d),
        Some(_) => Err(invalid(format!("must be greater than 0, got {value}"))),
        None => Err(invalid(format!("not a number: {value}"))),
    }
}

/// Optional text field; empty strings and non-strings other than numbers
/// count as absent
pub fn optional_text(object: &Value, field: &str) -> Option<String> {
    match object.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_extracts_fenced_json() {
        let text = "Here you go:\n```json\n{\"price\": 65990, \"source\": \"shop\"}\n```\nHope it helps";
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["price"], 65990);
    }

    #[test]
    fn test_extracts_outermost_object() {
        let text = r#"{"a": {"b": 1}, "c": [ {"d": 2} ]} trailing"#;
        let value = extract_json_object(text).unwrap();
        assert_eq!(value["a"]["b"], 1);
        assert_eq!(value["c"][0]["d"], 2);
    }

    #[test]
    fn test_missing_object_is_malformed() {
        let err = extract_json_object("I cannot help with that").unwrap_err();
        assert!(matches!(err, LLMError::MalformedJson { .. }));

        let err = extract_json_object("} backwards {").unwrap_err();
        assert!(matches!(err, LLMError::MalformedJson { .. }));
    }

    #[test]
    fn test_unparseable_object_is_malformed() {
        let err = extract_json_object("{price: 100,}").unwrap_err();
        assert!(matches!(err, LLMError::MalformedJson { .. }));
    }

    #[test]
    fn test_positive_decimal() {
        let obj = json!({
            "int": 65990,
            "float": 1299.5,
            "string": " 4500 ",
            "zero": 0,
            "negative": -3,
            "text": "about 5k",
            "null": null,
            "bool": true
        });

        assert_eq!(positive_decimal(&obj, "int").unwrap(), dec!(65990));
        assert_eq!(positive_decimal(&obj, "float").unwrap(), dec!(1299.5));
        assert_eq!(positive_decimal(&obj, "string").unwrap(), dec!(4500));

        for field in ["zero", "negative", "text", "null", "bool", "absent"] {
            let err = positive_decimal(&obj, field).unwrap_err();
            assert!(
                matches!(err, LLMError::InvalidField { field: ref f, .. } if f == field),
                "{field}: {err}"
            );
        }
    }

    #[test]
    fn test_optional_text() {
        let obj = json!({"notes": "128GB", "empty": "  ", "n": 5, "obj": {}});
        assert_eq!(optional_text(&obj, "notes").as_deref(), Some("128GB"));
        assert_eq!(optional_text(&obj, "empty"), None);
        assert_eq!(optional_text(&obj, "n").as_deref(), Some("5"));
        assert_eq!(optional_text(&obj, "obj"), None);
        assert_eq!(optional_text(&obj, "missing"), None);
    }
}
