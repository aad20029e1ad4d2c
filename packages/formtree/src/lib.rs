//! formtree: flat form data to nested values and back.
//!
//! - [`formtree_core`]: values, blobs, form entries and field keys
//! - [`formtree_codec`]: the decoder and encoder
//! - [`formtree_http`]: reading forms out of requests, validation and
//!   submission
//!
//! ```rust
//! use formtree::{decode, encode, FormData, Value};
//!
//! let form = FormData::from_urlencoded("items[]=a&items[]=b&user.age=30");
//! let value = decode(&form, false);
//! assert_eq!(value.pointer("items.1"), Some(&Value::from("b")));
//! assert_eq!(value.pointer("user.age"), Some(&Value::Integer(30)));
//! assert_eq!(encode(Some(&value), true).len(), 2);
//! ```

pub use formtree_codec;
pub use formtree_core;
pub use formtree_http;

pub use formtree_codec::{decode, encode, CodecConfig, ConflictPolicy, Decoder, Encoder};
pub use formtree_core::{Blob, EncType, FormData, FormValue, Value};
pub use formtree_http::{
    form_data_from_search_params, get_validated_form_data, parse_form_data, validate_form_data,
    FormSubmitter, Resolver, Validated,
};
