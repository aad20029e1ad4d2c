//! The validation seam: resolvers turn decoded form values into typed data
//! or field errors.

use std::marker::PhantomData;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use formtree_codec::from_value;
use formtree_core::{Map, Value};

/// Key under which form-level (not field-specific) errors are reported.
pub const ROOT_ERROR_KEY: &str = "root";

/// A validation message for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Machine-readable kind, e.g. `required` or `invalid`.
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

/// Field errors keyed by dotted field name, in report order.
pub type FieldErrors = IndexMap<String, FieldError>;

/// Auxiliary data passed through to the resolver untouched.
#[derive(Debug, Clone, Default)]
pub struct ResolverContext {
    pub data: Map,
}

/// Options handed to every resolver call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Server-side reads never use native (browser) validation.
    pub should_use_native_validation: bool,
    /// Names of the fields being validated; empty means all.
    pub fields: Vec<String>,
}

/// What a resolver returns.
///
/// Non-empty `errors` means validation failed, and `values` is ignored.
#[derive(Debug, Clone)]
pub struct ResolverOutput<T> {
    pub values: Option<T>,
    pub errors: FieldErrors,
}

impl<T> ResolverOutput<T> {
    pub fn valid(values: T) -> Self {
        Self {
            values: Some(values),
            errors: FieldErrors::new(),
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self {
            values: None,
            errors,
        }
    }
}

/// Opaque validator mapping decoded data to typed values or field errors.
#[async_trait]
pub trait Resolver<T>: Send + Sync {
    async fn resolve(
        &self,
        values: Value,
        context: &ResolverContext,
        options: &ResolverOptions,
    ) -> ResolverOutput<T>;
}

/// Resolver that deserializes the decoded value into `T` with serde.
///
/// Missing fields are reported under their own name as `required`; every
/// other deserialization failure is reported under [`ROOT_ERROR_KEY`].
pub struct SerdeResolver<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SerdeResolver<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SerdeResolver<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> Resolver<T> for SerdeResolver<T> {
    async fn resolve(
        &self,
        values: Value,
        _context: &ResolverContext,
        _options: &ResolverOptions,
    ) -> ResolverOutput<T> {
        match from_value::<T>(values) {
            Ok(typed) => ResolverOutput::valid(typed),
            Err(formtree_core::Error::Decode { message, .. }) => {
                let mut errors = FieldErrors::new();
                match missing_field(&message) {
                    Some(field) => {
                        errors.insert(field.to_string(), FieldError::new("required", message))
                    }
                    None => errors.insert(
                        ROOT_ERROR_KEY.to_string(),
                        FieldError::new("invalid", message),
                    ),
                };
                ResolverOutput::invalid(errors)
            }
            Err(other) => {
                let mut errors = FieldErrors::new();
                errors.insert(
                    ROOT_ERROR_KEY.to_string(),
                    FieldError::new("invalid", other.to_string()),
                );
                ResolverOutput::invalid(errors)
            }
        }
    }
}

/// Extract `name` from serde's "missing field `name`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

/// Resolver built from a synchronous closure.
pub struct FnResolver<F>(pub F);

#[async_trait]
impl<T, F> Resolver<T> for FnResolver<F>
where
    T: Send + 'static,
    F: Fn(Value, &ResolverContext) -> ResolverOutput<T> + Send + Sync,
{
    async fn resolve(
        &self,
        values: Value,
        context: &ResolverContext,
        _options: &ResolverOptions,
    ) -> ResolverOutput<T> {
        (self.0)(values, context)
    }
}
