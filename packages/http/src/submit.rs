//! Preparing and dispatching form submissions.

use serde::{Deserialize, Serialize};

use formtree_codec::encode;
use formtree_core::{EncType, FormData, Value};

use crate::submitter::Submitter;
use crate::types::{HttpResponse, Method};
use crate::Error;

/// Method used when neither the caller nor the form names one.
pub const DEFAULT_METHOD: Method = Method::POST;

/// Submission options supplied explicitly by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    pub method: Option<Method>,
    #[serde(rename = "encType")]
    pub enc_type: Option<EncType>,
    pub action: Option<String>,
}

/// The `method`, `enctype` and `action` attributes of the submitting form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormAttributes {
    pub method: Option<Method>,
    #[serde(rename = "encType")]
    pub enc_type: Option<EncType>,
    pub action: Option<String>,
}

/// Options a submission is dispatched with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOptions {
    pub method: Method,
    pub enc_type: Option<EncType>,
    pub action: Option<String>,
}

impl SubmitOptions {
    /// Caller configuration overrides form attributes, which override the
    /// default method. Encoding and action have no default.
    pub fn resolve(config: &SubmitConfig, form: &FormAttributes) -> Self {
        Self {
            method: config.method.or(form.method).unwrap_or(DEFAULT_METHOD),
            enc_type: config.enc_type.or(form.enc_type),
            action: config.action.clone().or_else(|| form.action.clone()),
        }
    }
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self::resolve(&SubmitConfig::default(), &FormAttributes::default())
    }
}

/// What gets handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Flat entries produced by the encoder.
    Form(FormData),
    /// The merged nested value, sent untouched for `application/json`.
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub payload: Payload,
    pub options: SubmitOptions,
}

/// Shallow-merge `extra` over `values`: top-level keys of `extra` win.
fn merge(values: Value, extra: Option<&Value>) -> Value {
    let Some(extra) = extra else {
        return values;
    };
    match (values, extra) {
        (Value::Map(mut base), Value::Map(extra)) => {
            for (key, value) in extra {
                base.insert(key.clone(), value.clone());
            }
            Value::Map(base)
        }
        (Value::Map(base), other) => {
            tracing::debug!(kind = other.kind_name(), "ignoring non-mapping submit data");
            Value::Map(base)
        }
        (_, other) => other.clone(),
    }
}

/// Merge `extra` into `values` and encode the result for `options`.
///
/// A JSON submission carries the merged value itself; every other encoding
/// carries the flattened entries.
pub fn prepare_submission(
    values: Value,
    extra: Option<&Value>,
    stringify_all: bool,
    options: SubmitOptions,
) -> Submission {
    let merged = merge(values, extra);
    let payload = match options.enc_type {
        Some(EncType::Json) => Payload::Json(merged),
        _ => Payload::Form(encode(Some(&merged), stringify_all)),
    };
    Submission { payload, options }
}

/// A form's submit handler: configuration, extra data and a transport.
pub struct FormSubmitter {
    config: SubmitConfig,
    submit_data: Option<Value>,
    stringify_all: bool,
    submitter: Box<dyn Submitter>,
}

impl FormSubmitter {
    pub fn new(submitter: impl Submitter + 'static) -> Self {
        Self {
            config: SubmitConfig::default(),
            submit_data: None,
            stringify_all: true,
            submitter: Box::new(submitter),
        }
    }

    pub fn with_config(mut self, config: SubmitConfig) -> Self {
        self.config = config;
        self
    }

    /// Extra top-level fields merged into every submission.
    pub fn with_submit_data(mut self, data: Value) -> Self {
        self.submit_data = Some(data);
        self
    }

    pub fn stringify_all(mut self, stringify_all: bool) -> Self {
        self.stringify_all = stringify_all;
        self
    }

    /// Build the submission without sending it.
    pub fn prepare(&self, values: Value, form: &FormAttributes) -> Submission {
        let options = SubmitOptions::resolve(&self.config, form);
        prepare_submission(
            values,
            self.submit_data.as_ref(),
            self.stringify_all,
            options,
        )
    }

    /// Prepare and dispatch a submission.
    pub fn submit(&self, values: Value, form: &FormAttributes) -> Result<HttpResponse, Error> {
        let submission = self.prepare(values, form);
        tracing::debug!(
            method = %submission.options.method,
            action = submission.options.action.as_deref().unwrap_or(""),
            "submitting form"
        );
        self.submitter.submit(&submission)
    }
}
