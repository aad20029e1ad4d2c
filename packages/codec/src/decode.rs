//! Flat form entries -> nested value.
//!
//! Keys are split on `.`; each segment's container kind is decided the first
//! time the segment is visited by looking at the segment after it (digits
//! mean sequence, anything else means mapping). The decoder builds an
//! explicit tree of [`Node`]s so that the chosen kind of every prefix is
//! known, and only turns it into a [`Value`] at the end.
//!
//! Sequences remember which element each explicit index addressed, so
//! `rows.1.id` and a later `rows.1.name` always meet in the same element no
//! matter what arrived in between. Elements are ordered by index when the
//! tree becomes a [`Value`]; gaps are dropped rather than padded.

use std::collections::HashMap;

use indexmap::IndexMap;

use formtree_core::{ContainerKind, FieldKey, FormData, FormValue, Segment, Value};

use crate::config::ConflictPolicy;
use crate::convert::coerce;
use crate::Error;

/// Decode form entries into a nested mapping.
///
/// Text values are coerced through JSON unless `preserve_strings` is set.
/// Files are never parsed. Container conflicts resolve in favour of the later
/// key (see [`ConflictPolicy::Replace`]); this function never fails.
///
/// ```rust
/// use formtree_codec::decode;
/// use formtree_core::{FormData, Value};
///
/// let form = FormData::new().with("user.name", "Ann").with("user.age", "30");
/// let value = decode(&form, false);
/// assert_eq!(value.pointer("user.age"), Some(&Value::Integer(30)));
/// ```
pub fn decode(form: &FormData, preserve_strings: bool) -> Value {
    Decoder::new()
        .preserve_strings(preserve_strings)
        .decode(form)
        // Replace never reports a conflict
        .unwrap_or_else(|_| Value::map())
}

/// Configurable decoder.
#[derive(Clone, Debug, Default)]
pub struct Decoder {
    preserve_strings: bool,
    on_conflict: ConflictPolicy,
}

/// Decode tree: containers carry their kind explicitly.
#[derive(Debug)]
enum Node {
    Leaf(Value),
    Container(Container),
}

#[derive(Debug)]
enum Container {
    Mapping(IndexMap<String, Node>),
    Sequence(Sequence),
}

/// Sequence under construction.
///
/// Every element carries an ordering key: its explicit index, or for appended
/// elements one past the largest key so far (where a sparse array would put
/// it).
#[derive(Debug, Default)]
struct Sequence {
    items: Vec<(usize, Node)>,
    by_index: HashMap<usize, usize>,
}

impl Sequence {
    fn push(&mut self, node: Node) {
        let key = self
            .items
            .iter()
            .map(|(key, _)| key.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.items.push((key, node));
    }

    /// The element addressed by `index`, created with `make` on first use.
    fn slot(&mut self, index: usize, make: impl FnOnce() -> Node) -> &mut Node {
        let position = match self.by_index.get(&index) {
            Some(&position) => position,
            None => {
                self.items.push((index, make()));
                let position = self.items.len() - 1;
                self.by_index.insert(index, position);
                position
            }
        };
        &mut self.items[position].1
    }

    fn into_value(mut self) -> Value {
        // Stable: equal keys keep arrival order
        self.items.sort_by_key(|(key, _)| *key);
        Value::Array(
            self.items
                .into_iter()
                .map(|(_, node)| node.into_value())
                .collect(),
        )
    }
}

impl Container {
    fn empty(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Mapping => Container::Mapping(IndexMap::new()),
            ContainerKind::Sequence => Container::Sequence(Sequence::default()),
        }
    }

    fn kind(&self) -> ContainerKind {
        match self {
            Container::Mapping(_) => ContainerKind::Mapping,
            Container::Sequence(_) => ContainerKind::Sequence,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Container::Mapping(map) => Value::Map(
                map.into_iter()
                    .map(|(k, node)| (k, node.into_value()))
                    .collect(),
            ),
            Container::Sequence(seq) => seq.into_value(),
        }
    }
}

impl Node {
    fn empty(kind: ContainerKind) -> Self {
        Node::Container(Container::empty(kind))
    }

    fn describe(&self) -> &'static str {
        match self {
            Node::Leaf(value) => value.kind_name(),
            Node::Container(Container::Mapping(_)) => "mapping",
            Node::Container(Container::Sequence(_)) => "sequence",
        }
    }

    fn is_container(&self, kind: ContainerKind) -> bool {
        matches!(self, Node::Container(c) if c.kind() == kind)
    }

    fn as_container_mut(&mut self) -> Option<&mut Container> {
        match self {
            Node::Container(c) => Some(c),
            Node::Leaf(_) => None,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Node::Leaf(value) => value,
            Node::Container(c) => c.into_value(),
        }
    }
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep text values as strings instead of coercing them.
    #[must_use]
    pub fn preserve_strings(mut self, preserve: bool) -> Self {
        self.preserve_strings = preserve;
        self
    }

    #[must_use]
    pub fn on_conflict(mut self, policy: ConflictPolicy) -> Self {
        self.on_conflict = policy;
        self
    }

    /// Decode form entries into a nested mapping.
    ///
    /// # Errors
    ///
    /// Only with [`ConflictPolicy::Reject`], when a key needs a container
    /// kind that disagrees with what an earlier key put at the same path.
    pub fn decode(&self, form: &FormData) -> Result<Value, Error> {
        let mut root = Container::Mapping(IndexMap::new());
        for (raw_key, raw_value) in form.iter() {
            let key = FieldKey::parse(raw_key);
            let value = self.effective_value(raw_value);
            self.insert(&mut root, &key, value)?;
        }
        Ok(root.into_value())
    }

    fn effective_value(&self, raw: &FormValue) -> Value {
        match raw {
            FormValue::File(blob) => Value::Blob(blob.clone()),
            FormValue::Text(text) if self.preserve_strings => Value::String(text.clone()),
            FormValue::Text(text) => coerce(text),
        }
    }

    fn insert(&self, root: &mut Container, key: &FieldKey, value: Value) -> Result<(), Error> {
        let segments = key.segments();
        let mut cursor = root;

        for (depth, segment) in key.parents().iter().enumerate() {
            let expected = ContainerKind::for_next(&segments[depth + 1]);
            let slot = child_slot(cursor, key.token(depth), segment, expected);
            cursor = self.ensure_container(slot, expected, key, || key.prefix(depth + 1))?;
        }

        let last = key.len() - 1;
        let leaf = Node::Leaf(value);
        match (cursor, key.last()) {
            // A sequence cursor is only reached when the final segment is an index
            (Container::Sequence(seq), _) => seq.push(leaf),
            (Container::Mapping(map), Segment::Push { base, .. }) => {
                let slot = map
                    .entry(base.clone())
                    .or_insert_with(|| Node::empty(ContainerKind::Sequence));
                let target = self.ensure_container(slot, ContainerKind::Sequence, key, || {
                    let parent = key.prefix(last);
                    if parent.is_empty() {
                        base.clone()
                    } else {
                        format!("{}.{}", parent, base)
                    }
                })?;
                if let Container::Sequence(seq) = target {
                    seq.push(leaf);
                }
            }
            // Ordinary key, or a digit key directly under the root mapping
            (Container::Mapping(map), _) => {
                map.insert(key.token(last).to_string(), leaf);
            }
        }
        Ok(())
    }

    /// Make sure `slot` holds a container of kind `expected`, applying the
    /// conflict policy when it holds something else.
    fn ensure_container<'a>(
        &self,
        slot: &'a mut Node,
        expected: ContainerKind,
        key: &FieldKey,
        path: impl FnOnce() -> String,
    ) -> Result<&'a mut Container, Error> {
        if !slot.is_container(expected) {
            let found = slot.describe();
            match self.on_conflict {
                ConflictPolicy::Reject => {
                    return Err(Error::Conflict {
                        key: key.to_string(),
                        path: path(),
                        expected,
                        found,
                    });
                }
                ConflictPolicy::Replace => {
                    let path = path();
                    tracing::debug!(
                        key = %key,
                        path = %path,
                        %expected,
                        found,
                        "container conflict, replacing earlier data"
                    );
                    *slot = Node::empty(expected);
                }
            }
        }
        slot.as_container_mut()
            .ok_or_else(|| Error::other(format!("decode tree lost container for '{}'", key)))
    }
}

/// Find or create the slot addressed by one intermediate segment.
///
/// Mapping cursors use the raw token as key (so `007` stays `007`). Sequence
/// cursors address the element by its index, creating it on first use.
fn child_slot<'a>(
    cursor: &'a mut Container,
    token: &str,
    segment: &Segment,
    expected: ContainerKind,
) -> &'a mut Node {
    match cursor {
        Container::Mapping(map) => map
            .entry(token.to_string())
            .or_insert_with(|| Node::empty(expected)),
        Container::Sequence(seq) => match segment {
            Segment::Index(index) => seq.slot(*index, || Node::empty(expected)),
            _ => {
                seq.push(Node::empty(expected));
                let last = seq.items.len() - 1;
                &mut seq.items[last].1
            }
        },
    }
}
