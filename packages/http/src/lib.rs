//! # formtree-http
//!
//! Request-side orchestration around the formtree codec.
//!
//! ## Reading
//!
//! Retrieval requests (GET, HEAD) carry their form in the URL query; every
//! other request carries it in the body. The decoded value is handed to a
//! [`Resolver`] and echoed back alongside the outcome:
//!
//! ```ignore
//! use formtree_http::{get_validated_form_data, FormRequest, SerdeResolver};
//!
//! let request = FormRequest::get("https://example.com/search?q=rust&page=2")?;
//! let form = get_validated_form_data(request, &SerdeResolver::<Search>::new(), false).await?;
//! match form.outcome {
//!     Validated::Valid { data } => run(data),
//!     Validated::Invalid { errors } => render(form.received_values, errors),
//! }
//! ```
//!
//! ## Submitting
//!
//! [`FormSubmitter`] merges extra data, resolves method/encoding/action and
//! hands the encoded result to a [`Submitter`]:
//!
//! ```ignore
//! use formtree_http::{FormAttributes, FormSubmitter, ReqwestSubmitter};
//!
//! let submitter = FormSubmitter::new(ReqwestSubmitter::with_default_timeout("https://api.example.com")?);
//! let response = submitter.submit(values, &FormAttributes::default())?;
//! ```

pub mod error;
pub mod multipart;
pub mod resolver;
pub mod source;
pub mod submit;
pub mod submitter;
pub mod types;
pub mod validate;

pub use error::Error;
pub use multipart::parse_multipart;
pub use resolver::{
    FieldError, FieldErrors, FnResolver, Resolver, ResolverContext, ResolverOptions,
    ResolverOutput, SerdeResolver, ROOT_ERROR_KEY,
};
pub use source::{
    form_data_from_search_params, parse_form_data, read_body, read_form_data, FormSource,
};
pub use submit::{
    prepare_submission, FormAttributes, FormSubmitter, Payload, SubmitConfig, SubmitOptions,
    Submission, DEFAULT_METHOD,
};
pub use submitter::{ReqwestSubmitter, Submitter};
pub use types::{FormBody, FormRequest, HttpResponse, Method};
pub use validate::{get_validated_form_data, validate_form_data, Validated, ValidatedForm};
