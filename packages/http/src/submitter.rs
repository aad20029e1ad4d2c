//! Submission transport.
//!
//! [`Submitter`] is the seam between prepared submissions and the network,
//! so form handling can be tested against a mock without real requests.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::multipart;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use url::Url;

use formtree_codec::value_to_json;
use formtree_core::{EncType, FormData, FormValue};

use crate::submit::{Payload, Submission};
use crate::types::HttpResponse;
use crate::Error;

/// Dispatches a prepared submission.
pub trait Submitter: Send + Sync {
    fn submit(&self, submission: &Submission) -> Result<HttpResponse, Error>;
}

/// Production submitter using a blocking reqwest client.
///
/// The submission's `action` is resolved against the base URL; without an
/// action the form posts back to the base URL itself.
pub struct ReqwestSubmitter {
    client: Client,
    base_url: Url,
    default_headers: HeaderMap,
}

impl ReqwestSubmitter {
    /// Create a submitter for `base_url` with the given timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            default_headers: HeaderMap::new(),
        })
    }

    /// Create with default timeout of 30 seconds.
    pub fn with_default_timeout(base_url: &str) -> Result<Self, Error> {
        Self::new(base_url, Duration::from_secs(30))
    }

    /// Add a header sent with every submission.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let name = HeaderName::try_from(name)?;
        let value = HeaderValue::try_from(value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn target(&self, action: Option<&str>) -> Result<Url, Error> {
        match action {
            Some(action) if !action.is_empty() => Ok(self.base_url.join(action)?),
            _ => Ok(self.base_url.clone()),
        }
    }

    fn with_payload(
        &self,
        builder: RequestBuilder,
        submission: &Submission,
    ) -> Result<RequestBuilder, Error> {
        let method = submission.options.method;
        match &submission.payload {
            Payload::Json(_) if method.is_retrieval() => Err(Error::Submit {
                message: format!("{} submissions cannot carry a JSON body", method),
            }),
            Payload::Json(value) => Ok(builder.json(&value_to_json(value))),
            Payload::Form(form) if method.is_retrieval() => Ok(builder.query(&form.text_pairs()?)),
            Payload::Form(form) => {
                let enc_type = submission
                    .options
                    .enc_type
                    .unwrap_or_else(|| form.natural_enc_type());
                match enc_type {
                    EncType::UrlEncoded => Ok(builder.form(&form.text_pairs()?)),
                    EncType::Multipart => Ok(builder.multipart(multipart_form(form)?)),
                    EncType::TextPlain => Ok(builder
                        .header(CONTENT_TYPE, EncType::TextPlain.as_str())
                        .body(text_plain_body(form)?)),
                    EncType::Json => Err(Error::Submit {
                        message: "flat form entries cannot be sent as application/json"
                            .to_string(),
                    }),
                }
            }
        }
    }
}

fn multipart_form(form: &FormData) -> Result<multipart::Form, Error> {
    let mut body = multipart::Form::new();
    for (key, value) in form.iter() {
        body = match value {
            FormValue::Text(text) => body.text(key.to_string(), text.clone()),
            FormValue::File(blob) => {
                let mut part = multipart::Part::bytes(blob.data().to_vec());
                if let Some(name) = blob.file_name() {
                    part = part.file_name(name.to_string());
                }
                if let Some(content_type) = blob.content_type() {
                    part = part.mime_str(content_type)?;
                }
                body.part(key.to_string(), part)
            }
        };
    }
    Ok(body)
}

/// `key=value` lines joined by CRLF, as browsers send `text/plain` forms.
fn text_plain_body(form: &FormData) -> Result<String, Error> {
    let lines: Vec<String> = form
        .text_pairs()?
        .into_iter()
        .map(|(key, value)| format!("{}={}\r\n", key, value))
        .collect();
    Ok(lines.concat())
}

impl Submitter for ReqwestSubmitter {
    fn submit(&self, submission: &Submission) -> Result<HttpResponse, Error> {
        let method: http::Method = submission.options.method.into();
        let url = self.target(submission.options.action.as_deref())?;
        tracing::debug!(%method, %url, "dispatching submission");

        let builder = self
            .client
            .request(method, url)
            .headers(self.default_headers.clone());
        let response = self.with_payload(builder, submission)?.send()?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("Unknown")
            .to_string();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }

        let body_text = response.text()?;
        let body = serde_json::from_str(&body_text).unwrap_or(serde_json::Value::Null);

        Ok(HttpResponse {
            status,
            status_text,
            headers,
            body,
            body_text: Some(body_text),
        })
    }
}

/// Mock submitter for testing.
///
/// Records every submission and answers with predefined responses.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct MockSubmitter {
        /// Responses keyed by action.
        responses: Arc<Mutex<HashMap<String, HttpResponse>>>,
        recorded: Arc<Mutex<Vec<Submission>>>,
        failure: Arc<Mutex<Option<String>>>,
    }

    impl MockSubmitter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_response(self, action: impl Into<String>, response: HttpResponse) -> Self {
            self.responses.lock().unwrap().insert(action.into(), response);
            self
        }

        /// Configure to fail every submission.
        pub fn fail_with(self, message: impl Into<String>) -> Self {
            *self.failure.lock().unwrap() = Some(message.into());
            self
        }

        pub fn recorded_submissions(&self) -> Vec<Submission> {
            self.recorded.lock().unwrap().clone()
        }

        pub fn success_response(body: serde_json::Value) -> HttpResponse {
            let body_text = body.to_string();
            HttpResponse {
                status: 200,
                status_text: "OK".to_string(),
                headers: HashMap::new(),
                body,
                body_text: Some(body_text),
            }
        }
    }

    impl Submitter for MockSubmitter {
        fn submit(&self, submission: &Submission) -> Result<HttpResponse, Error> {
            self.recorded.lock().unwrap().push(submission.clone());

            if let Some(message) = self.failure.lock().unwrap().clone() {
                return Err(Error::Submit { message });
            }

            let action = submission.options.action.clone().unwrap_or_default();
            if let Some(response) = self.responses.lock().unwrap().get(&action) {
                return Ok(response.clone());
            }
            Ok(Self::success_response(serde_json::Value::Null))
        }
    }
}
