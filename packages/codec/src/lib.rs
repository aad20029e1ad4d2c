//! Form codec for formtree
//!
//! Converts between flat form entries and nested values:
//! - `decode` / `Decoder`: `FormData` -> `Value`, rebuilding mappings and
//!   sequences from dotted keys and `[]` markers, with optional JSON coercion
//! - `encode` / `Encoder`: `Value` -> `FormData`, one entry per top-level key
//!   (one per file for file lists)
//! - `from_value` / `to_value`: typed access via serde
//!
//! # Example
//!
//! ```rust
//! use formtree_codec::{decode, encode};
//! use formtree_core::{FormData, Value};
//!
//! let form = FormData::from_urlencoded("user.name=Ann&user.tags[]=a&user.tags[]=b&age=30");
//! let value = decode(&form, false);
//! assert_eq!(value.pointer("user.tags.1"), Some(&Value::from("b")));
//! assert_eq!(value.pointer("age"), Some(&Value::Integer(30)));
//!
//! // Structured values travel as JSON text under their top-level key
//! let flat = encode(Some(&value), false);
//! assert_eq!(flat.len(), 2);
//! ```

mod config;
mod convert;
mod decode;
mod encode;

pub use config::{CodecConfig, ConflictPolicy};
pub use convert::{
    coerce, from_value, iso_timestamp, json_to_value, to_json_string, to_value, value_to_json,
};
pub use decode::{decode, Decoder};
pub use encode::{encode, encode_fields, Encodable, Encoder};

// Re-export core types for convenience
pub use formtree_core::{Blob, EncType, Error, FieldKey, FormData, FormValue, Value};
