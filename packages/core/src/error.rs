//! Error types for the core layer.

use crate::format::EncType;
use crate::key::ContainerKind;

/// Errors raised by the codec layers.
///
/// Malformed scalar content is never an error (it decodes as a string);
/// these cover structural conflicts and transport-level encoding problems.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A key addressed a slot as one container kind after an earlier key had
    /// established it as something else. Only raised when the decoder is
    /// configured to reject conflicts.
    Conflict {
        /// The full key being decoded.
        key: String,
        /// Dotted path of the conflicting slot.
        path: String,
        /// The kind this key requires.
        expected: ContainerKind,
        /// What the slot already holds.
        found: &'static str,
    },

    /// Transport content could not be decoded.
    Decode { enc_type: EncType, message: String },

    /// A value could not be encoded for the transport.
    Encode { enc_type: EncType, message: String },

    /// The content type is not one the codec understands.
    UnsupportedEncoding { content_type: String },

    /// Generic error with message.
    Other { message: String },
}

impl Error {
    pub fn other(message: impl Into<String>) -> Self {
        Error::Other {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Conflict {
                key,
                path,
                expected,
                found,
            } => write!(
                f,
                "key '{}' needs a {} at '{}' but found {}",
                key, expected, path, found
            ),
            Error::Decode { enc_type, message } => {
                write!(f, "decode error ({}): {}", enc_type, message)
            }
            Error::Encode { enc_type, message } => {
                write!(f, "encode error ({}): {}", enc_type, message)
            }
            Error::UnsupportedEncoding { content_type } => {
                write!(f, "unsupported encoding: {}", content_type)
            }
            Error::Other { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_display() {
        let e = Error::Conflict {
            key: "items.name".to_string(),
            path: "items".to_string(),
            expected: ContainerKind::Mapping,
            found: "sequence",
        };
        let display = e.to_string();
        assert!(display.contains("items.name"));
        assert!(display.contains("needs a mapping"));
        assert!(display.contains("found sequence"));
    }

    #[test]
    fn encode_error_display() {
        let e = Error::Encode {
            enc_type: EncType::UrlEncoded,
            message: "field 'avatar' holds a file".to_string(),
        };
        let display = e.to_string();
        assert!(display.contains("encode error"));
        assert!(display.contains("application/x-www-form-urlencoded"));
        assert!(display.contains("avatar"));
    }

    #[test]
    fn unsupported_encoding_display() {
        let e = Error::UnsupportedEncoding {
            content_type: "application/xml".to_string(),
        };
        assert_eq!(e.to_string(), "unsupported encoding: application/xml");
    }

    #[test]
    fn other_error_display() {
        assert_eq!(Error::other("something went wrong").to_string(), "something went wrong");
    }
}
