//! Decoding plus validation: the server-side read path.

use formtree_codec::decode;
use formtree_core::Value;

use crate::resolver::{
    FieldError, FieldErrors, Resolver, ResolverContext, ResolverOptions, ROOT_ERROR_KEY,
};
use crate::source::{parse_form_data, read_form_data, FormSource};
use crate::Error;

/// Outcome of running a resolver over decoded form data.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Valid { data: T },
    Invalid { errors: FieldErrors },
}

impl<T> Validated<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Validated::Valid { data } => Some(data),
            Validated::Invalid { .. } => None,
        }
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            Validated::Valid { .. } => None,
            Validated::Invalid { errors } => Some(errors),
        }
    }

    pub fn into_result(self) -> Result<T, FieldErrors> {
        match self {
            Validated::Valid { data } => Ok(data),
            Validated::Invalid { errors } => Err(errors),
        }
    }
}

/// A validation outcome together with the decoded input it was computed
/// from, so a form can be re-rendered with what the user submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm<T> {
    pub received_values: Value,
    pub outcome: Validated<T>,
}

/// Run `resolver` over already-decoded data.
///
/// Any reported error makes the result invalid. A resolver that reports
/// neither errors nor values is treated as invalid at the root.
pub async fn validate_form_data<T: Send>(
    data: Value,
    resolver: &dyn Resolver<T>,
) -> Validated<T> {
    let output = resolver
        .resolve(data, &ResolverContext::default(), &ResolverOptions::default())
        .await;

    if !output.errors.is_empty() {
        tracing::debug!(count = output.errors.len(), "form data failed validation");
        return Validated::Invalid {
            errors: output.errors,
        };
    }

    match output.values {
        Some(data) => Validated::Valid { data },
        None => {
            let mut errors = FieldErrors::new();
            errors.insert(
                ROOT_ERROR_KEY.to_string(),
                FieldError::new("invalid", "resolver returned no values"),
            );
            Validated::Invalid { errors }
        }
    }
}

/// Decode the form data of `source` and validate it.
///
/// Retrieval requests (GET, HEAD) are read from the URL query, every other
/// request from its body. The decoded input is echoed back in
/// `received_values` whether or not validation passed.
pub async fn get_validated_form_data<T: Send>(
    source: impl Into<FormSource>,
    resolver: &dyn Resolver<T>,
    preserve_strings: bool,
) -> Result<ValidatedForm<T>, Error> {
    let received_values = match source.into() {
        FormSource::Request(request) if request.method.is_retrieval() => {
            decode(&read_form_data(&request)?, preserve_strings)
        }
        other => parse_form_data(other, preserve_strings)?,
    };

    let outcome = validate_form_data(received_values.clone(), resolver).await;
    Ok(ValidatedForm {
        received_values,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{FnResolver, ResolverOutput, SerdeResolver};
    use crate::types::{FormBody, FormRequest};
    use bytes::Bytes;
    use formtree_core::FormData;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Search {
        q: String,
        page: i64,
    }

    #[tokio::test]
    async fn valid_data_is_returned() {
        let resolver = SerdeResolver::<Search>::new();
        let data = Value::from_iter([("q", Value::from("rust")), ("page", Value::Integer(2))]);
        let validated = validate_form_data(data, &resolver).await;
        assert!(validated.is_valid());
        assert_eq!(
            validated.into_result().unwrap(),
            Search {
                q: "rust".to_string(),
                page: 2
            }
        );
    }

    #[tokio::test]
    async fn errors_suppress_values() {
        let resolver = FnResolver(|values: Value, _: &ResolverContext| {
            let mut errors = FieldErrors::new();
            errors.insert("email".to_string(), FieldError::new("required", "missing"));
            ResolverOutput {
                values: Some(values),
                errors,
            }
        });
        let validated: Validated<Value> = validate_form_data(Value::map(), &resolver).await;
        assert!(!validated.is_valid());
        assert!(validated.data().is_none());
        assert!(validated.errors().unwrap().contains_key("email"));
    }

    #[tokio::test]
    async fn missing_values_without_errors_is_invalid() {
        let resolver = FnResolver(|_: Value, _: &ResolverContext| ResolverOutput::<()> {
            values: None,
            errors: FieldErrors::new(),
        });
        let validated: Validated<()> = validate_form_data(Value::map(), &resolver).await;
        assert!(validated.errors().unwrap().contains_key(ROOT_ERROR_KEY));
    }

    #[tokio::test]
    async fn get_request_reads_query() {
        let request = FormRequest::get("https://example.com/search?q=rust&page=3").unwrap();
        let form = get_validated_form_data(request, &SerdeResolver::<Search>::new(), false)
            .await
            .unwrap();
        assert_eq!(form.received_values.pointer("page"), Some(&Value::Integer(3)));
        assert_eq!(form.outcome.data().map(|s| s.page), Some(3));
    }

    #[tokio::test]
    async fn post_request_reads_body_and_echoes_input_on_failure() {
        let request = FormRequest::post("https://example.com/search?page=1")
            .unwrap()
            .with_body(FormBody::UrlEncoded(Bytes::from_static(b"q=rust")));
        let form = get_validated_form_data(request, &SerdeResolver::<Search>::new(), false)
            .await
            .unwrap();
        assert_eq!(form.received_values, Value::from_iter([("q", "rust")]));
        assert_eq!(
            form.outcome.errors().and_then(|e| e.get("page")).map(|e| e.kind.as_str()),
            Some("required")
        );
    }

    #[tokio::test]
    async fn preserve_strings_reaches_the_resolver() {
        let form = FormData::new().with("q", "rust").with("page", "3");
        let result = get_validated_form_data(form, &SerdeResolver::<Search>::new(), true)
            .await
            .unwrap();
        assert_eq!(result.received_values.pointer("page"), Some(&Value::from("3")));
        assert!(!result.outcome.is_valid());
    }

    #[derive(Debug, Deserialize)]
    struct Profile {
        name: String,
        tags: Vec<String>,
    }

    #[tokio::test]
    async fn multipart_http_request_is_decoded_and_validated() {
        let body = concat!(
            "--XX\r\n",
            "Content-Disposition: form-data; name=\"name\"\r\n\r\n",
            "Ann\r\n",
            "--XX\r\n",
            "Content-Disposition: form-data; name=\"tags[]\"\r\n\r\n",
            "a\r\n",
            "--XX\r\n",
            "Content-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\n",
            "Content-Type: image/png\r\n\r\n",
            "png-bytes\r\n",
            "--XX--\r\n",
        );
        let request = http::Request::builder()
            .method("POST")
            .uri("/profile")
            .header("content-type", "multipart/form-data; boundary=XX")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap();
        let request = FormRequest::try_from(request).unwrap();

        let form = get_validated_form_data(request, &SerdeResolver::<Profile>::new(), true)
            .await
            .unwrap();

        let avatar = form
            .received_values
            .pointer("avatar")
            .and_then(Value::as_blob)
            .unwrap();
        assert_eq!(avatar.file_name(), Some("me.png"));
        assert_eq!(avatar.content_type(), Some("image/png"));

        let profile = form.outcome.into_result().unwrap();
        assert_eq!(profile.name, "Ann");
        assert_eq!(profile.tags, ["a"]);
    }

    #[tokio::test]
    async fn unreadable_body_is_an_error() {
        let request = FormRequest::post("https://example.com/").unwrap().with_body(FormBody::Raw {
            content_type: "application/json".to_string(),
            bytes: Bytes::from_static(b"{}"),
        });
        let result = get_validated_form_data(request, &SerdeResolver::<Search>::new(), false).await;
        assert!(result.is_err());
    }
}
