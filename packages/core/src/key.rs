//! Flattened field keys and their path segments.

use std::fmt;

/// Kind of container a path prefix resolves to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// String-keyed mapping (`user.name`).
    Mapping,
    /// Positional sequence (`items.0`, `items[]`).
    Sequence,
}

impl ContainerKind {
    /// The kind a segment must have, judged from the segment that follows it.
    pub fn for_next(next: &Segment) -> Self {
        match next {
            Segment::Index(_) => ContainerKind::Sequence,
            _ => ContainerKind::Mapping,
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerKind::Mapping => write!(f, "mapping"),
            ContainerKind::Sequence => write!(f, "sequence"),
        }
    }
}

/// One dot-delimited token of a flattened key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Pure digit string. Addresses a sequence slot.
    ///
    /// Indices too large for `usize` saturate to `usize::MAX` and sort last.
    Index(usize),
    /// Ordinary mapping key.
    Key(String),
    /// Final segment with a `[]` or `[<digits>]` marker: append to the
    /// sequence stored under `base`. The bracket index is kept for
    /// diagnostics but never used for placement.
    Push { base: String, hint: Option<usize> },
}

impl Segment {
    fn classify(token: &str, last: bool) -> Self {
        if last {
            if let Some((base, hint)) = split_array_marker(token) {
                return Segment::Push {
                    base: base.to_string(),
                    hint,
                };
            }
        }
        if is_index(token) {
            Segment::Index(token.parse().unwrap_or(usize::MAX))
        } else {
            Segment::Key(token.to_string())
        }
    }
}

/// A parsed form field key such as `user.addresses.0.city` or `tags[]`.
///
/// Segments are split on `.`. Only the final segment may carry an array
/// marker; brackets anywhere else are part of an ordinary key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldKey {
    raw: String,
    tokens: Vec<String>,
    segments: Vec<Segment>,
}

impl FieldKey {
    /// Parse a flattened key. Never fails: every string is some key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use formtree_core::{FieldKey, Segment};
    ///
    /// let key = FieldKey::parse("items.0.tags[]");
    /// assert_eq!(key.len(), 3);
    /// assert_eq!(key.segments()[1], Segment::Index(0));
    /// assert!(matches!(key.last(), Segment::Push { base, .. } if base == "tags"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let tokens: Vec<&str> = raw.split('.').collect();
        let last = tokens.len() - 1;
        let segments = tokens
            .iter()
            .enumerate()
            .map(|(i, token)| Segment::classify(token, i == last))
            .collect();
        FieldKey {
            raw: raw.to_string(),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The raw text of segment `i`, exactly as it appeared in the key
    /// (`007` stays `007`, `tags[]` keeps its marker).
    pub fn token(&self, i: usize) -> &str {
        &self.tokens[i]
    }

    /// Dotted prefix made of the first `n` raw tokens.
    pub fn prefix(&self, n: usize) -> String {
        self.tokens[..n.min(self.tokens.len())].join(".")
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of segments. Always at least one.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; kept for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The final segment.
    pub fn last(&self) -> &Segment {
        // `parse` always produces at least one segment
        &self.segments[self.segments.len() - 1]
    }

    /// All segments except the last.
    pub fn parents(&self) -> &[Segment] {
        &self.segments[..self.segments.len() - 1]
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Index(i) => write!(f, "{}", i),
            Segment::Key(k) => write!(f, "{}", k),
            Segment::Push { base, hint: None } => write!(f, "{}[]", base),
            Segment::Push {
                base,
                hint: Some(i),
            } => write!(f, "{}[{}]", base, i),
        }
    }
}

/// True for a non-empty string of ASCII digits.
pub fn is_index(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Split a trailing `[]` / `[<digits>]` marker off a token.
fn split_array_marker(token: &str) -> Option<(&str, Option<usize>)> {
    let inner_end = token.strip_suffix(']')?;
    let open = inner_end.rfind('[')?;
    let digits = &inner_end[open + 1..];
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hint = if digits.is_empty() {
        None
    } else {
        Some(digits.parse().unwrap_or(usize::MAX))
    };
    Some((&token[..open], hint))
}
