//! Form encoding types (the `enctype` of an HTML form).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The wire encoding of a form submission.
///
/// Uses the MIME strings browsers and routers use for `enctype`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncType {
    /// `application/x-www-form-urlencoded`
    #[serde(rename = "application/x-www-form-urlencoded")]
    UrlEncoded,
    /// `multipart/form-data`
    #[serde(rename = "multipart/form-data")]
    Multipart,
    /// `application/json`: the nested value is sent as is, never flattened.
    #[serde(rename = "application/json")]
    Json,
    /// `text/plain`
    #[serde(rename = "text/plain")]
    TextPlain,
}

impl EncType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EncType::UrlEncoded => "application/x-www-form-urlencoded",
            EncType::Multipart => "multipart/form-data",
            EncType::Json => "application/json",
            EncType::TextPlain => "text/plain",
        }
    }

    /// Check if this is the JSON encoding.
    pub fn is_json(&self) -> bool {
        matches!(self, EncType::Json)
    }

    /// Check if this encoding carries flat form entries.
    pub fn is_form(&self) -> bool {
        matches!(self, EncType::UrlEncoded | EncType::Multipart)
    }
}

impl fmt::Display for EncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EncType {
    type Err = Error;

    /// Parse a `Content-Type` / `enctype` value. Parameters such as
    /// `; boundary=...` or `; charset=utf-8` are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or("").trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/x-www-form-urlencoded" => Ok(EncType::UrlEncoded),
            "multipart/form-data" => Ok(EncType::Multipart),
            "application/json" => Ok(EncType::Json),
            "text/plain" => Ok(EncType::TextPlain),
            _ => Err(Error::UnsupportedEncoding {
                content_type: s.to_string(),
            }),
        }
    }
}
