//! Nested value -> flat form entries.
//!
//! Encoding is one level deep: every top-level key is emitted once (or once
//! per file for file lists), and structured content travels as JSON text.
//! Callers that want dotted keys flatten them before encoding.

use chrono::{DateTime, Utc};

use formtree_core::{Blob, FormData, FormValue, Value};

use crate::convert::{iso_timestamp, to_json_string};

/// An encodable field value, classified once at the API boundary.
#[derive(Clone, Debug, PartialEq)]
pub enum Encodable {
    /// Not present: no entry is emitted.
    Absent,
    /// Text, passed through unless everything is stringified.
    Text(String),
    /// `null`, booleans and numbers.
    Scalar(Value),
    /// A timestamp.
    Date(DateTime<Utc>),
    /// A single file.
    Blob(Blob),
    /// Several files under one key.
    BlobList(Vec<Blob>),
    /// Sequences and mappings, sent as JSON.
    Structured(Value),
}

impl Encodable {
    /// Classify a value.
    ///
    /// A sequence becomes a `BlobList` when its first element is a blob and
    /// every other element is one too; mixed sequences are `Structured`.
    pub fn classify(value: Value) -> Self {
        match value {
            Value::String(s) => Encodable::Text(s),
            Value::Date(d) => Encodable::Date(d),
            Value::Blob(b) => Encodable::Blob(b),
            Value::Array(items) if items.first().is_some_and(Value::is_blob) => {
                if items.iter().all(Value::is_blob) {
                    Encodable::BlobList(
                        items
                            .into_iter()
                            .filter_map(|item| match item {
                                Value::Blob(b) => Some(b),
                                _ => None,
                            })
                            .collect(),
                    )
                } else {
                    Encodable::Structured(Value::Array(items))
                }
            }
            Value::Array(_) | Value::Map(_) => Encodable::Structured(value),
            Value::Null | Value::Bool(_) | Value::Integer(_) | Value::Float(_) => {
                Encodable::Scalar(value)
            }
        }
    }
}

impl From<Value> for Encodable {
    fn from(value: Value) -> Self {
        Encodable::classify(value)
    }
}

impl<T: Into<Encodable>> From<Option<T>> for Encodable {
    fn from(value: Option<T>) -> Self {
        value.map_or(Encodable::Absent, Into::into)
    }
}

impl From<Vec<Blob>> for Encodable {
    fn from(files: Vec<Blob>) -> Self {
        Encodable::BlobList(files)
    }
}

/// Encode a nested value into form entries.
///
/// `None` and non-mapping roots produce no entries. With `stringify_all`
/// every non-file value is JSON text (strings gain quotes); without it
/// strings pass through and dates use ISO 8601.
///
/// ```rust
/// use formtree_codec::encode;
/// use formtree_core::{FormValue, Value};
///
/// let value = Value::from_iter([("name", Value::from("Ann")), ("age", Value::from(30i64))]);
///
/// let form = encode(Some(&value), false);
/// assert_eq!(form.get("name"), Some(&FormValue::from("Ann")));
///
/// let form = encode(Some(&value), true);
/// assert_eq!(form.get("name"), Some(&FormValue::from("\"Ann\"")));
/// assert_eq!(form.get("age"), Some(&FormValue::from("30")));
/// ```
pub fn encode(value: Option<&Value>, stringify_all: bool) -> FormData {
    Encoder::new().stringify_all(stringify_all).encode(value)
}

/// Encode pre-classified fields, in iteration order.
pub fn encode_fields<I, K>(fields: I, stringify_all: bool) -> FormData
where
    I: IntoIterator<Item = (K, Encodable)>,
    K: Into<String>,
{
    Encoder::new().stringify_all(stringify_all).encode_fields(fields)
}

/// Configurable encoder. Defaults to stringifying everything, which is what
/// submissions use unless told otherwise.
#[derive(Clone, Debug)]
pub struct Encoder {
    stringify_all: bool,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            stringify_all: true,
        }
    }
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stringify_all(mut self, stringify_all: bool) -> Self {
        self.stringify_all = stringify_all;
        self
    }

    pub fn encode(&self, value: Option<&Value>) -> FormData {
        match value {
            Some(Value::Map(map)) => self.encode_fields(
                map.iter()
                    .map(|(k, v)| (k.clone(), Encodable::classify(v.clone()))),
            ),
            Some(other) => {
                tracing::debug!(kind = other.kind_name(), "non-mapping root encodes to no entries");
                FormData::new()
            }
            None => FormData::new(),
        }
    }

    pub fn encode_fields<I, K>(&self, fields: I) -> FormData
    where
        I: IntoIterator<Item = (K, Encodable)>,
        K: Into<String>,
    {
        let mut form = FormData::new();
        for (key, field) in fields {
            let key = key.into();
            match field {
                Encodable::Absent => {}
                Encodable::BlobList(files) => {
                    for file in files {
                        form.append(key.clone(), FormValue::File(file));
                    }
                }
                Encodable::Blob(file) => form.append(key, FormValue::File(file)),
                Encodable::Text(text) if !self.stringify_all => form.append(key, text),
                Encodable::Date(date) if !self.stringify_all => {
                    form.append(key, iso_timestamp(&date))
                }
                Encodable::Text(text) => form.append(key, to_json_string(&Value::String(text))),
                Encodable::Date(date) => form.append(key, to_json_string(&Value::Date(date))),
                Encodable::Scalar(value) | Encodable::Structured(value) => {
                    form.append(key, to_json_string(&value))
                }
            }
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn text<'a>(form: &'a FormData, key: &str) -> Option<&'a str> {
        form.get(key).and_then(FormValue::as_text)
    }

    #[test]
    fn absent_input_is_empty() {
        assert!(encode(None, true).is_empty());
        assert!(encode(None, false).is_empty());
        assert!(encode(Some(&Value::map()), true).is_empty());
    }

    #[test]
    fn non_mapping_root_is_empty() {
        assert!(encode(Some(&Value::from("loose")), true).is_empty());
        assert!(encode(Some(&Value::from(vec![1i64, 2])), false).is_empty());
    }

    #[test]
    fn stringify_all_quotes_strings() {
        let value = Value::from_iter([("name", "Ann")]);
        assert_eq!(text(&encode(Some(&value), true), "name"), Some("\"Ann\""));
        assert_eq!(text(&encode(Some(&value), false), "name"), Some("Ann"));
    }

    #[test]
    fn scalars_are_json() {
        let value = Value::from_iter([
            ("n", Value::Integer(3)),
            ("f", Value::Float(1.5)),
            ("b", Value::Bool(false)),
            ("z", Value::Null),
        ]);
        for stringify_all in [true, false] {
            let form = encode(Some(&value), stringify_all);
            assert_eq!(text(&form, "n"), Some("3"));
            assert_eq!(text(&form, "f"), Some("1.5"));
            assert_eq!(text(&form, "b"), Some("false"));
            assert_eq!(text(&form, "z"), Some("null"));
        }
    }

    #[test]
    fn integral_floats_keep_their_fraction() {
        let value = Value::from_iter([("f", Value::Float(3.0)), ("n", Value::Integer(3))]);
        for stringify_all in [true, false] {
            let form = encode(Some(&value), stringify_all);
            assert_eq!(text(&form, "f"), Some("3.0"));
            assert_eq!(text(&form, "n"), Some("3"));
        }
    }

    #[test]
    fn structured_values_are_one_json_entry() {
        let value = Value::from_iter([
            (
                "user",
                Value::from_iter([("name", Value::from("Ann")), ("age", Value::Integer(30))]),
            ),
            ("tags", Value::from(vec!["a", "b"])),
        ]);
        let form = encode(Some(&value), false);
        assert_eq!(form.len(), 2);
        assert_eq!(text(&form, "user"), Some(r#"{"name":"Ann","age":30}"#));
        assert_eq!(text(&form, "tags"), Some(r#"["a","b"]"#));
    }

    #[test]
    fn dates() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let value = Value::from_iter([("at", Value::Date(date))]);
        assert_eq!(
            text(&encode(Some(&value), false), "at"),
            Some("2024-01-02T03:04:05.000Z")
        );
        assert_eq!(
            text(&encode(Some(&value), true), "at"),
            Some("\"2024-01-02T03:04:05.000Z\"")
        );
    }

    #[test]
    fn blobs_are_emitted_unchanged() {
        let avatar = Blob::from_static(b"png").with_file_name("a.png");
        let value = Value::from_iter([("avatar", Value::Blob(avatar.clone()))]);
        for stringify_all in [true, false] {
            let form = encode(Some(&value), stringify_all);
            let file = form.get("avatar").and_then(FormValue::as_file).unwrap();
            assert!(file.ptr_eq(&avatar));
        }
    }

    #[test]
    fn blob_sequences_expand_per_element() {
        let a = Blob::from_static(b"a");
        let b = Blob::from_static(b"b");
        let value = Value::from_iter([(
            "docs",
            Value::Array(vec![Value::Blob(a.clone()), Value::Blob(b.clone())]),
        )]);
        let form = encode(Some(&value), true);
        let files: Vec<&Blob> = form.get_all("docs").filter_map(FormValue::as_file).collect();
        assert_eq!(files.len(), 2);
        assert!(files[0].ptr_eq(&a));
        assert!(files[1].ptr_eq(&b));
    }

    #[test]
    fn mixed_blob_sequence_is_structured() {
        let value = Value::Array(vec![Value::Blob(Blob::from_static(b"hi")), Value::from("x")]);
        assert!(matches!(Encodable::classify(value), Encodable::Structured(_)));
    }

    #[test]
    fn classification() {
        assert_eq!(Encodable::classify(Value::from("x")), Encodable::Text("x".into()));
        assert_eq!(Encodable::classify(Value::Null), Encodable::Scalar(Value::Null));
        assert!(matches!(Encodable::classify(Value::map()), Encodable::Structured(_)));
        assert!(matches!(Encodable::classify(Value::array()), Encodable::Structured(_)));
        assert_eq!(Encodable::from(None::<Value>), Encodable::Absent);
    }

    #[test]
    fn encode_fields_skips_absent_and_keeps_order() {
        let files = vec![Blob::from_static(b"1"), Blob::from_static(b"2")];
        let form = encode_fields(
            [
                ("b", Encodable::from(Some(Value::from("x")))),
                ("skip", Encodable::Absent),
                ("files", Encodable::from(files)),
                ("a", Encodable::Scalar(Value::Integer(1))),
            ],
            false,
        );
        let keys: Vec<&str> = form.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "files", "files", "a"]);
    }

    #[test]
    fn empty_file_list_emits_nothing() {
        let form = encode_fields([("files", Encodable::BlobList(Vec::new()))], true);
        assert!(form.is_empty());
    }
}
