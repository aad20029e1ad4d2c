//! Core formtree types
//!
//! The shared vocabulary of the form codec:
//! - `Value`: nested tree (maps, sequences, scalars, dates, blobs)
//! - `FormData` / `FormValue`: the flat, ordered transport entries
//! - `FieldKey` / `Segment`: flattened keys like `user.tags[]`
//! - `EncType`: the form encoding of a submission
//!
//! # Example
//!
//! ```rust
//! use formtree_core::{FieldKey, FormData, Segment, Value};
//!
//! let form = FormData::new().with("user.name", "Ann").with("tags[]", "a");
//! assert_eq!(form.len(), 2);
//!
//! let key = FieldKey::parse("user.name");
//! assert_eq!(key.parents(), &[Segment::Key("user".into())]);
//!
//! let value = Value::from_iter([("name", "Ann")]);
//! assert_eq!(value.pointer("name"), Some(&Value::from("Ann")));
//! ```

pub use bytes::Bytes;
pub use chrono::{DateTime, Utc};

mod blob;
mod error;
mod form_data;
mod format;
mod key;
mod value;

pub use blob::Blob;
pub use error::Error;
pub use form_data::{FormData, FormValue};
pub use format::EncType;
pub use key::{is_index, ContainerKind, FieldKey, Segment};
pub use value::{Map, Value};
