//! Records and record sets
//!
//! A [`Record`] is one ordered key/value mapping sourced from a single secret or a
//! single parameter. Values are restricted to the two JSON scalars a secret payload
//! may carry; anything else is rejected when the payload is parsed.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, Unexpected};
use serde::{Deserialize, Serialize};

use crate::error::{EnvFileError, EnvFileResult};

/// Scalar value of a record entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// JSON string, or any Parameter Store value
    String(String),
    /// JSON number, kept in its source text (`1.10` stays `1.10`)
    Number(serde_json::Number),
}

// Goes through serde_json::Value so arbitrary_precision keeps the number text
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Value::String(s)),
            serde_json::Value::Number(n) => Ok(Value::Number(n)),
            other => {
                let found = match other {
                    serde_json::Value::Bool(_) => "a boolean",
                    serde_json::Value::Null => "null",
                    serde_json::Value::Array(_) => "an array",
                    _ => "an object",
                };
                Err(de::Error::invalid_type(
                    Unexpected::Other(found),
                    &"a string or a number",
                ))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl Value {
    /// Interpret a command-line literal: JSON numbers stay numbers, everything else is a string
    ///
    /// Either way the rendered text is exactly `raw`.
    pub fn from_literal(raw: &str) -> Self {
        if raw.trim() != raw {
            return Value::String(raw.to_string());
        }
        match serde_json::from_str::<serde_json::Number>(raw) {
            Ok(number) => Value::Number(number),
            Err(_) => Value::String(raw.to_string()),
        }
    }
}

/// Ordered key/value mapping, keys unique within one record
pub type Record = IndexMap<String, Value>;

/// Ordered sequence of records in fetch order
pub type RecordSet = Vec<Record>;

/// Parse a Secret Store payload into a record
///
/// The payload must be a flat JSON object whose values are strings or numbers.
/// Key order follows the payload.
pub fn parse_secret_record(secret_id: &str, payload: &str) -> EnvFileResult<Record> {
    serde_json::from_str::<Record>(payload).map_err(|source| EnvFileError::InvalidSecretPayload {
        secret_id: secret_id.to_string(),
        source,
    })
}

/// Build a single-entry record, the shape every parameter contributes
pub fn single_entry(key: impl Into<String>, value: impl Into<Value>) -> Record {
    let mut record = Record::with_capacity(1);
    record.insert(key.into(), value.into());
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_payload_order() {
        let record =
            parse_secret_record("dev/app", r#"{"Z_KEY":"z","A_KEY":"a","PORT":5432}"#).unwrap();

        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Z_KEY", "A_KEY", "PORT"]);
        assert_eq!(record["PORT"].to_string(), "5432");
    }

    #[test]
    fn test_parse_rejects_non_scalar_values() {
        for payload in [
            r#"{"FLAG":true}"#,
            r#"{"NESTED":{"a":"b"}}"#,
            r#"{"LIST":["a"]}"#,
            r#"{"EMPTY":null}"#,
        ] {
            let err = parse_secret_record("dev/app", payload).unwrap_err();
            assert!(matches!(err, EnvFileError::InvalidSecretPayload { .. }));
        }
    }

    #[test]
    fn test_parse_rejects_non_object_payload() {
        let err = parse_secret_record("dev/app", "plain-text-secret").unwrap_err();
        assert_eq!(err.name(), "RemoteStoreError");
    }

    #[test]
    fn test_number_display_keeps_source_text() {
        let record = parse_secret_record("x", r#"{"RATE":0.25,"COUNT":-3}"#).unwrap();
        assert_eq!(record["RATE"].to_string(), "0.25");
        assert_eq!(record["COUNT"].to_string(), "-3");
    }

    #[test]
    fn test_number_text_is_not_normalized() {
        let record = parse_secret_record(
            "x",
            r#"{"RATE":1.0,"VERSION":1.10,"SCALE":1e3,"ZERO":-0,"BIG":12345678901234567890123}"#,
        )
        .unwrap();

        assert_eq!(record["RATE"].to_string(), "1.0");
        assert_eq!(record["VERSION"].to_string(), "1.10");
        assert_eq!(record["SCALE"].to_string(), "1e3");
        assert_eq!(record["ZERO"].to_string(), "-0");
        assert_eq!(record["BIG"].to_string(), "12345678901234567890123");
    }

    #[test]
    fn test_literal_renders_as_given() {
        for raw in ["1.10", "1e3", "1.0", "-0", "12345678901234567890123", " 42", "0x10"] {
            assert_eq!(Value::from_literal(raw).to_string(), raw);
        }
        assert!(matches!(Value::from_literal("1.10"), Value::Number(_)));
        assert!(matches!(Value::from_literal(" 42"), Value::String(_)));
    }

    #[test]
    fn test_from_literal() {
        assert_eq!(Value::from_literal("3000"), Value::from(3000_i64));
        assert_eq!(
            Value::from_literal("http://localhost/3000"),
            Value::from("http://localhost/3000")
        );
    }
}
