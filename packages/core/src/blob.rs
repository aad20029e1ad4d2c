//! Binary payloads carried by forms (uploaded files, generated attachments).

use std::fmt;

use bytes::Bytes;

/// Binary data with optional file metadata.
///
/// The payload is a [`Bytes`] handle, so cloning a blob never copies the
/// data. Two clones of the same blob share storage, which is how the codec
/// guarantees that a file handed to the decoder comes out untouched.
#[derive(Clone, PartialEq, Eq)]
pub struct Blob {
    data: Bytes,
    file_name: Option<String>,
    content_type: Option<String>,
}

impl Blob {
    /// Create an anonymous blob.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
            content_type: None,
        }
    }

    /// Create a blob from static bytes without copying.
    pub fn from_static(data: &'static [u8]) -> Self {
        Self::new(Bytes::from_static(data))
    }

    /// Attach a file name (a `File` rather than a bare `Blob` in browser terms).
    #[must_use]
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Attach a MIME content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True when both blobs share the same underlying storage.
    pub fn ptr_eq(&self, other: &Blob) -> bool {
        self.data.as_ptr() == other.data.as_ptr() && self.data.len() == other.data.len()
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("len", &self.data.len())
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .finish()
    }
}

impl From<Bytes> for Blob {
    fn from(data: Bytes) -> Self {
        Blob::new(data)
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Blob::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_storage() {
        let blob = Blob::new(vec![1u8, 2, 3]).with_file_name("a.bin");
        let copy = blob.clone();
        assert!(blob.ptr_eq(&copy));
        assert_eq!(copy.file_name(), Some("a.bin"));
    }

    #[test]
    fn equal_content_is_not_identity() {
        let a = Blob::new(vec![1u8, 2, 3]);
        let b = Blob::new(vec![1u8, 2, 3]);
        assert_eq!(a, b);
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn debug_hides_payload() {
        let blob = Blob::from_static(b"secret").with_content_type("text/plain");
        let debug = format!("{:?}", blob);
        assert!(debug.contains("len: 6"));
        assert!(!debug.contains("secret"));
    }
}
