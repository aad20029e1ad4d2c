//! # formtree-cli
//!
//! Decode query strings into nested JSON, and encode JSON objects into
//! urlencoded form bodies.
//!
//! ```bash
//! formtree decode 'user.name=Ann&user.tags[]=a&user.tags[]=b'
//! echo '{"name": "Ann", "age": 30}' | formtree encode --stringify-all=false
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use formtree_codec::{json_to_value, value_to_json, CodecConfig};
use formtree_core::FormData;

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Codec(#[from] formtree_core::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a codec configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<CodecConfig, CliError> {
    match path {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            tracing::debug!(path = %path.display(), "loaded codec config");
            Ok(CodecConfig::from_json_str(&text)?)
        }
        None => Ok(CodecConfig::default()),
    }
}

/// The argument itself, or stdin when it is absent or `-`.
pub fn input_or_stdin(arg: Option<String>) -> Result<String, CliError> {
    match arg {
        Some(text) if text != "-" => Ok(text),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf.trim_end().to_string())
        }
    }
}

/// Decode a query string (a leading `?` is ignored) into pretty JSON.
pub fn decode_query(query: &str, config: &CodecConfig) -> Result<String, CliError> {
    let query = query.trim().trim_start_matches('?');
    let form = FormData::from_urlencoded(query);
    tracing::debug!(entries = form.len(), "decoding query");
    let value = config.decoder().decode(&form)?;
    Ok(serde_json::to_string_pretty(&value_to_json(&value))?)
}

/// Encode a JSON object into an urlencoded form body.
pub fn encode_json(json: &str, config: &CodecConfig) -> Result<String, CliError> {
    let value = json_to_value(serde_json::from_str(json)?);
    let form = config.encoder().encode(Some(&value));
    Ok(form.to_urlencoded()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formtree_codec::ConflictPolicy;

    #[test]
    fn decode_nested_query() {
        let out = decode_query("?user.name=Ann&user.tags[]=a&user.tags[]=b&age=30", &CodecConfig::default())
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"user": {"name": "Ann", "tags": ["a", "b"]}, "age": 30})
        );
    }

    #[test]
    fn decode_preserving_strings() {
        let config = CodecConfig {
            preserve_strings: true,
            ..CodecConfig::default()
        };
        let out = decode_query("flag=true", &config).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json, serde_json::json!({"flag": "true"}));
    }

    #[test]
    fn strict_decode_reports_conflicts() {
        let config = CodecConfig {
            on_conflict: ConflictPolicy::Reject,
            ..CodecConfig::default()
        };
        let result = decode_query("a=1&a.b=2", &config);
        assert!(matches!(
            result,
            Err(CliError::Codec(formtree_core::Error::Conflict { .. }))
        ));
    }

    #[test]
    fn encode_object() {
        let config = CodecConfig {
            stringify_all: false,
            ..CodecConfig::default()
        };
        let out = encode_json(r#"{"name": "Ann", "tags": ["a", "b"]}"#, &config).unwrap();
        assert_eq!(out, "name=Ann&tags=%5B%22a%22%2C%22b%22%5D");
    }

    #[test]
    fn encode_stringifies_by_default() {
        let out = encode_json(r#"{"name": "Ann"}"#, &CodecConfig::default()).unwrap();
        assert_eq!(out, "name=%22Ann%22");
    }

    #[test]
    fn encode_rejects_bad_json() {
        assert!(matches!(
            encode_json("{nope", &CodecConfig::default()),
            Err(CliError::Json(_))
        ));
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let result = load_config(Some(Path::new("/definitely/not/here.json")));
        assert!(matches!(result, Err(CliError::Io(_))));
        assert_eq!(load_config(None).unwrap(), CodecConfig::default());
    }

    #[test]
    fn explicit_input_is_used_verbatim() {
        assert_eq!(input_or_stdin(Some("a=1".to_string())).unwrap(), "a=1");
    }
}
