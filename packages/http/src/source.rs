//! Reading form entries out of incoming requests.

use url::Url;

use formtree_codec::decode;
use formtree_core::{EncType, FormData, Value};

use crate::multipart::parse_multipart;
use crate::types::{FormBody, FormRequest};
use crate::Error;

/// Where form data comes from: a request, or entries already extracted.
#[derive(Debug, Clone)]
pub enum FormSource {
    Request(FormRequest),
    Form(FormData),
}

impl From<FormRequest> for FormSource {
    fn from(request: FormRequest) -> Self {
        FormSource::Request(request)
    }
}

impl From<FormData> for FormSource {
    fn from(form: FormData) -> Self {
        FormSource::Form(form)
    }
}

/// Decode the query component of a URL.
pub fn form_data_from_search_params(url: &Url, preserve_strings: bool) -> Value {
    decode(&FormData::from_query(url), preserve_strings)
}

/// Read the form entries a request carries: the URL query for retrieval
/// requests, the body otherwise.
pub fn read_form_data(request: &FormRequest) -> Result<FormData, Error> {
    if request.method.is_retrieval() {
        tracing::trace!(url = %request.url, "reading form data from query");
        return Ok(FormData::from_query(&request.url));
    }
    read_body(&request.body)
}

/// Read form entries from a request body.
///
/// # Errors
///
/// `formtree_core::Error::UnsupportedEncoding` for bodies that are neither
/// pre-parsed entries, urlencoded nor multipart; `Error::Multipart` for
/// malformed multipart bodies.
pub fn read_body(body: &FormBody) -> Result<FormData, Error> {
    match body {
        FormBody::Empty => Ok(FormData::new()),
        FormBody::Form(form) => Ok(form.clone()),
        FormBody::UrlEncoded(bytes) => Ok(FormData::from_urlencoded_bytes(bytes)),
        FormBody::Raw {
            content_type,
            bytes,
        } => match content_type.parse::<EncType>()? {
            EncType::UrlEncoded => Ok(FormData::from_urlencoded_bytes(bytes)),
            EncType::Multipart => parse_multipart(content_type, bytes.clone()),
            EncType::Json | EncType::TextPlain => {
                tracing::debug!(%content_type, "body is not readable as form entries");
                Err(formtree_core::Error::UnsupportedEncoding {
                    content_type: content_type.clone(),
                }
                .into())
            }
        },
    }
}

/// Decode the form entries of a request body, or of entries already
/// extracted. The request method is not consulted.
pub fn parse_form_data(
    source: impl Into<FormSource>,
    preserve_strings: bool,
) -> Result<Value, Error> {
    let form = match source.into() {
        FormSource::Request(request) => read_body(&request.body)?,
        FormSource::Form(form) => form,
    };
    Ok(decode(&form, preserve_strings))
}
