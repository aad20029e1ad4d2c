//! `multipart/form-data` request bodies.

use std::convert::Infallible;

use bytes::Bytes;
use futures::executor::block_on;
use futures::stream;

use formtree_core::{Blob, FormData, FormValue};

use crate::Error;

/// Parse a buffered multipart body into form entries.
///
/// Parts with a `filename` become files carrying that name and their
/// content type; all other parts are text. Parts without a name are
/// skipped.
pub fn parse_multipart(content_type: &str, body: Bytes) -> Result<FormData, Error> {
    let boundary = multer::parse_boundary(content_type)?;
    let body = stream::once(async move { Ok::<Bytes, Infallible>(body) });
    let multipart = multer::Multipart::new(body, boundary);

    // The whole body is already in memory, so nothing here ever waits
    block_on(read_fields(multipart))
}

async fn read_fields(mut multipart: multer::Multipart<'static>) -> Result<FormData, Error> {
    let mut form = FormData::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            tracing::debug!("skipping unnamed multipart part");
            continue;
        };
        let file_name = field.file_name().map(str::to_string);
        let part_type = field.content_type().map(|mime| mime.to_string());
        let data = field.bytes().await?;

        let value = match file_name {
            Some(file_name) => {
                let mut blob = Blob::new(data).with_file_name(file_name);
                if let Some(part_type) = part_type {
                    blob = blob.with_content_type(part_type);
                }
                FormValue::File(blob)
            }
            None => FormValue::Text(String::from_utf8_lossy(&data).into_owned()),
        };
        form.append(name, value);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_TYPE: &str = "multipart/form-data; boundary=XX";

    fn body(parts: &[&str]) -> Bytes {
        let mut text = String::new();
        for part in parts {
            text.push_str("--XX\r\n");
            text.push_str(part);
            text.push_str("\r\n");
        }
        text.push_str("--XX--\r\n");
        Bytes::from(text)
    }

    #[test]
    fn text_and_file_parts() {
        let body = body(&[
            "Content-Disposition: form-data; name=\"name\"\r\n\r\nAnn",
            "Content-Disposition: form-data; name=\"avatar\"; filename=\"a.png\"\r\nContent-Type: image/png\r\n\r\npng-bytes",
        ]);
        let form = parse_multipart(CONTENT_TYPE, body).unwrap();
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("name"), Some(&FormValue::from("Ann")));

        let avatar = form.get("avatar").and_then(FormValue::as_file).unwrap();
        assert_eq!(avatar.file_name(), Some("a.png"));
        assert_eq!(avatar.content_type(), Some("image/png"));
        assert_eq!(avatar.data(), &Bytes::from_static(b"png-bytes"));
    }

    #[test]
    fn repeated_names_are_kept_in_order() {
        let body = body(&[
            "Content-Disposition: form-data; name=\"tags[]\"\r\n\r\na",
            "Content-Disposition: form-data; name=\"tags[]\"\r\n\r\nb",
        ]);
        let form = parse_multipart(CONTENT_TYPE, body).unwrap();
        let tags: Vec<&str> = form.get_all("tags[]").filter_map(FormValue::as_text).collect();
        assert_eq!(tags, ["a", "b"]);
    }

    #[test]
    fn missing_boundary_is_an_error() {
        let result = parse_multipart("multipart/form-data", Bytes::new());
        assert!(matches!(result, Err(Error::Multipart(_))));
    }

    #[test]
    fn truncated_body_is_an_error() {
        let body = Bytes::from_static(b"--XX\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\n1");
        assert!(parse_multipart(CONTENT_TYPE, body).is_err());
    }
}
