//! The flat side of the codec: an ordered list of form entries.

use url::form_urlencoded;
use url::Url;

use crate::blob::Blob;
use crate::error::Error;
use crate::format::EncType;

/// A single form entry value: text or a file.
#[derive(Clone, Debug, PartialEq)]
pub enum FormValue {
    Text(String),
    File(Blob),
}

impl FormValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormValue::Text(s) => Some(s),
            FormValue::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&Blob> {
        match self {
            FormValue::File(b) => Some(b),
            FormValue::Text(_) => None,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, FormValue::File(_))
    }
}

impl From<String> for FormValue {
    fn from(s: String) -> Self {
        FormValue::Text(s)
    }
}

impl From<&str> for FormValue {
    fn from(s: &str) -> Self {
        FormValue::Text(s.to_string())
    }
}

impl From<Blob> for FormValue {
    fn from(b: Blob) -> Self {
        FormValue::File(b)
    }
}

/// Ordered `(key, value)` entries, as produced by web form submission.
///
/// Keys may repeat; the order of entries is significant because sequences
/// are rebuilt by appending in entry order.
///
/// # Example
///
/// ```rust
/// use formtree_core::FormData;
///
/// let form = FormData::from_urlencoded("tags[]=a&tags[]=b&name=Ann");
/// assert_eq!(form.len(), 3);
/// assert_eq!(form.get_all("tags[]").count(), 2);
/// assert_eq!(form.get("name").and_then(|v| v.as_text()), Some("Ann"));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, keeping any existing entries under the same key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<FormValue>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Builder-style `append`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FormValue>) -> Self {
        self.append(key, value);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&FormValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Every value stored under `key`, in entry order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FormValue> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// True when at least one entry is a file.
    pub fn has_files(&self) -> bool {
        self.entries.iter().any(|(_, v)| v.is_file())
    }

    /// The encoding a browser would choose for these entries when none is
    /// configured.
    pub fn natural_enc_type(&self) -> EncType {
        if self.has_files() {
            EncType::Multipart
        } else {
            EncType::UrlEncoded
        }
    }

    /// Parse an `application/x-www-form-urlencoded` string.
    ///
    /// Malformed percent escapes decode lossily; this never fails.
    pub fn from_urlencoded(input: &str) -> Self {
        Self::from_urlencoded_bytes(input.as_bytes())
    }

    /// Parse urlencoded bytes (a request body).
    pub fn from_urlencoded_bytes(input: &[u8]) -> Self {
        form_urlencoded::parse(input)
            .map(|(k, v)| (k.into_owned(), FormValue::Text(v.into_owned())))
            .collect()
    }

    /// Entries of a URL's query component.
    pub fn from_query(url: &Url) -> Self {
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), FormValue::Text(v.into_owned())))
            .collect()
    }

    /// Serialize as `application/x-www-form-urlencoded`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encode` if any entry is a file; files need multipart.
    pub fn to_urlencoded(&self) -> Result<String, Error> {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in &self.entries {
            match value {
                FormValue::Text(text) => {
                    serializer.append_pair(key, text);
                }
                FormValue::File(_) => {
                    return Err(Error::Encode {
                        enc_type: EncType::UrlEncoded,
                        message: format!("field '{}' holds a file", key),
                    });
                }
            }
        }
        Ok(serializer.finish())
    }

    /// Text-only view of the entries, for transports that cannot carry files.
    pub fn text_pairs(&self) -> Result<Vec<(String, String)>, Error> {
        self.entries
            .iter()
            .map(|(k, v)| match v {
                FormValue::Text(t) => Ok((k.clone(), t.clone())),
                FormValue::File(_) => Err(Error::Encode {
                    enc_type: EncType::UrlEncoded,
                    message: format!("field '{}' holds a file", k),
                }),
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<FormValue>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormData {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<FormValue>> Extend<(K, V)> for FormData {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl IntoIterator for FormData {
    type Item = (String, FormValue);
    type IntoIter = std::vec::IntoIter<(String, FormValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
