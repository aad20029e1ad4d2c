//! Codec configuration.

use serde::{Deserialize, Serialize};

use formtree_core::{EncType, Error};

use crate::decode::Decoder;
use crate::encode::Encoder;

/// What the decoder does when a key disagrees with the container kind an
/// earlier key established at the same path (e.g. `items.0` followed by
/// `items.name`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The later key wins: the slot is replaced by an empty container of the
    /// kind the later key needs, discarding whatever was there.
    #[default]
    Replace,
    /// Decoding fails with `Error::Conflict`.
    Reject,
}

/// Serializable codec settings, e.g. loaded from a JSON config file.
///
/// Missing fields take their defaults:
///
/// ```rust
/// use formtree_codec::{CodecConfig, ConflictPolicy};
///
/// let config = CodecConfig::from_json_str(r#"{"preserve_strings": true}"#).unwrap();
/// assert!(config.preserve_strings);
/// assert!(config.stringify_all);
/// assert_eq!(config.on_conflict, ConflictPolicy::Replace);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Keep decoded text as strings instead of coercing through JSON.
    pub preserve_strings: bool,
    /// JSON-serialize every encoded value, strings included.
    pub stringify_all: bool,
    /// Decoder conflict handling.
    pub on_conflict: ConflictPolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            preserve_strings: false,
            stringify_all: true,
            on_conflict: ConflictPolicy::Replace,
        }
    }
}

impl CodecConfig {
    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::Decode {
            enc_type: EncType::Json,
            message: format!("invalid codec config: {}", e),
        })
    }

    pub fn decoder(&self) -> Decoder {
        Decoder::new()
            .preserve_strings(self.preserve_strings)
            .on_conflict(self.on_conflict)
    }

    pub fn encoder(&self) -> Encoder {
        Encoder::new().stringify_all(self.stringify_all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CodecConfig::default();
        assert!(!config.preserve_strings);
        assert!(config.stringify_all);
        assert_eq!(config.on_conflict, ConflictPolicy::Replace);
    }

    #[test]
    fn parse_full_config() {
        let config = CodecConfig::from_json_str(
            r#"{"preserve_strings": true, "stringify_all": false, "on_conflict": "reject"}"#,
        )
        .unwrap();
        assert_eq!(
            config,
            CodecConfig {
                preserve_strings: true,
                stringify_all: false,
                on_conflict: ConflictPolicy::Reject,
            }
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = CodecConfig::from_json_str(r#"{"on_conflict": "explode"}"#).unwrap_err();
        assert!(err.to_string().contains("invalid codec config"));
    }
}
