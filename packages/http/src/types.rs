use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use formtree_core::FormData;

use crate::Error;

/// HTTP method for requests and form submissions
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl Method {
    /// Retrieval requests carry their form in the URL query, not a body.
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", http::Method::from(*self))
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Case-insensitive, as HTML `method` attributes are.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "HEAD" => Ok(Method::HEAD),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(Error::InvalidMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::PATCH => http::Method::PATCH,
            Method::HEAD => http::Method::HEAD,
            Method::OPTIONS => http::Method::OPTIONS,
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = Error;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

/// Body of an incoming request, as handed over by the transport.
#[derive(Debug, Clone, Default)]
pub enum FormBody {
    #[default]
    Empty,
    /// Entries the transport already parsed (e.g. a multipart body with files).
    Form(FormData),
    /// Raw `application/x-www-form-urlencoded` bytes.
    UrlEncoded(Bytes),
    /// Anything else; only readable if the content type turns out to be
    /// urlencoded.
    Raw { content_type: String, bytes: Bytes },
}

/// An incoming request whose form data should be read.
#[derive(Debug, Clone)]
pub struct FormRequest {
    pub method: Method,
    pub url: Url,
    pub body: FormBody,
}

impl FormRequest {
    pub fn new(method: Method, url: &str) -> Result<Self, Error> {
        Ok(Self {
            method,
            url: Url::parse(url)?,
            body: FormBody::Empty,
        })
    }

    pub fn get(url: &str) -> Result<Self, Error> {
        Self::new(Method::GET, url)
    }

    pub fn post(url: &str) -> Result<Self, Error> {
        Self::new(Method::POST, url)
    }

    pub fn with_body(mut self, body: FormBody) -> Self {
        self.body = body;
        self
    }

    pub fn with_form(self, form: FormData) -> Self {
        self.with_body(FormBody::Form(form))
    }
}

/// Base used to resolve origin-form request targets such as `/search?q=1`.
const LOCAL_ORIGIN: &str = "http://localhost/";

impl TryFrom<http::Request<Bytes>> for FormRequest {
    type Error = Error;

    fn try_from(request: http::Request<Bytes>) -> Result<Self, Self::Error> {
        let method = Method::try_from(request.method())?;
        let uri = request.uri().to_string();
        let url = match Url::parse(&uri) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(LOCAL_ORIGIN)?.join(&uri)?,
            Err(e) => return Err(e.into()),
        };

        let content_type = request
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = request.into_body();

        let body = match content_type {
            _ if bytes.is_empty() => FormBody::Empty,
            Some(content_type) => FormBody::Raw {
                content_type,
                bytes,
            },
            None => FormBody::UrlEncoded(bytes),
        };

        Ok(Self { method, url, body })
    }
}

/// HTTP response from a submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Status text (e.g., "OK", "Not Found")
    pub status_text: String,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Response body as JSON value
    /// Will be null if body was empty or not valid JSON
    pub body: serde_json::Value,

    /// Raw body as string (useful when body isn't JSON)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_text: Option<String>,
}

impl HttpResponse {
    /// Check if the response status indicates success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Try to deserialize the body into a specific type
    pub fn json<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone())
    }
}
