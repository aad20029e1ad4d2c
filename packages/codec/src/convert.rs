//! Conversions between Value, JSON and serde types.

use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use formtree_core::{EncType, Error, Value};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Convert a Value to a Rust type via serde.
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, Error> {
    // Convert Value to serde_json::Value first, then deserialize
    let json = value_to_json(&value);
    serde_json::from_value(json).map_err(|e| Error::Decode {
        enc_type: EncType::Json,
        message: e.to_string(),
    })
}

/// Convert a Rust type to a Value via serde.
pub fn to_value<T: Serialize>(data: &T) -> Result<Value, Error> {
    let json = serde_json::to_value(data).map_err(|e| Error::Encode {
        enc_type: EncType::Json,
        message: e.to_string(),
    })?;
    Ok(json_to_value(json))
}

/// ISO 8601 timestamp with millisecond precision and a `Z` suffix,
/// e.g. `2024-03-01T12:30:00.000Z`.
pub fn iso_timestamp(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Convert our Value to serde_json::Value.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::Number((*i).into()),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Date(d) => serde_json::Value::String(iso_timestamp(d)),
        Value::Blob(b) => {
            // JSON doesn't have bytes, so we base64 encode
            let encoded = base64::engine::general_purpose::STANDARD.encode(b.data());
            serde_json::Value::String(encoded)
        }
        Value::Array(arr) => serde_json::Value::Array(arr.iter().map(value_to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
    }
}

/// Convert serde_json::Value to our Value.
pub fn json_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                // Fallback for very large numbers
                Value::String(n.to_string())
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => Value::Array(arr.into_iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Map(
            map.into_iter()
                .map(|(k, v)| (k, json_to_value(v)))
                .collect(),
        ),
    }
}

/// Compact JSON text of a value.
pub fn to_json_string(value: &Value) -> String {
    value_to_json(value).to_string()
}

/// Best-effort coercion of a transport string.
///
/// Parses the text as JSON and falls back to the original string when that
/// fails, so `"30"` becomes `30`, `"true"` becomes `true`, and `"Ann"` stays
/// `"Ann"`.
pub fn coerce(raw: &str) -> Value {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(json) => json_to_value(json),
        Err(_) => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use formtree_core::Blob;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Signup {
        name: String,
        age: u32,
        newsletter: bool,
    }

    #[test]
    fn roundtrip_struct() {
        let original = Signup {
            name: "Alice".to_string(),
            age: 30,
            newsletter: true,
        };

        let value = to_value(&original).unwrap();
        assert_eq!(value.pointer("age"), Some(&Value::Integer(30)));
        let recovered: Signup = from_value(value).unwrap();

        assert_eq!(original, recovered);
    }

    #[test]
    fn from_value_reports_decode_error() {
        let value = Value::from_iter([("name", Value::from("Alice"))]);
        let err = from_value::<Signup>(value).unwrap_err();
        assert!(matches!(err, Error::Decode { enc_type: EncType::Json, .. }));
    }

    #[test]
    fn coerce_scalars() {
        assert_eq!(coerce("30"), Value::Integer(30));
        assert_eq!(coerce("-2.5"), Value::Float(-2.5));
        assert_eq!(coerce("true"), Value::Bool(true));
        assert_eq!(coerce("null"), Value::Null);
        assert_eq!(coerce("\"quoted\""), Value::from("quoted"));
    }

    #[test]
    fn coerce_falls_back_to_string() {
        assert_eq!(coerce("Ann"), Value::from("Ann"));
        assert_eq!(coerce(""), Value::from(""));
        assert_eq!(coerce("{broken"), Value::from("{broken"));
        assert_eq!(coerce("1 2"), Value::from("1 2"));
    }

    #[test]
    fn coerce_structures_keep_key_order() {
        let value = coerce(r#"{"b":1,"a":[true,null]}"#);
        let keys: Vec<&String> = value.as_map().unwrap().keys().collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(value.pointer("a.0"), Some(&Value::Bool(true)));
    }

    #[test]
    fn dates_serialize_as_iso_8601() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(iso_timestamp(&date), "2024-03-01T12:30:00.000Z");
        assert_eq!(
            to_json_string(&Value::Date(date)),
            "\"2024-03-01T12:30:00.000Z\""
        );
    }

    #[test]
    fn blobs_serialize_as_base64() {
        let value = Value::Blob(Blob::from_static(b"hi"));
        assert_eq!(value_to_json(&value), serde_json::json!("aGk="));
    }

    #[test]
    fn non_finite_floats_become_null() {
        assert_eq!(to_json_string(&Value::Float(f64::NAN)), "null");
        assert_eq!(to_json_string(&Value::Float(f64::INFINITY)), "null");
    }

    #[test]
    fn json_to_value_numbers() {
        let value = json_to_value(serde_json::json!({
            "integer": 42,
            "float": 2.75,
            "huge": 18446744073709551615u64
        }));
        assert_eq!(value.pointer("integer"), Some(&Value::Integer(42)));
        assert_eq!(value.pointer("float"), Some(&Value::Float(2.75)));
        assert!(matches!(value.pointer("huge"), Some(Value::Float(_))));
    }
}
