//! TextOp: a single retain / insert / delete step
//!
//! Lengths are measured in Unicode scalar values (`char`s), never bytes.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Formatting attributes carried by a retain or insert.
///
/// An empty map is the "no attributes" state. A value of `false` marks the
/// attribute for removal when the op is applied or composed.
pub type Attributes = BTreeMap<String, Value>;

/// One primitive edit step
#[derive(Debug, Clone, PartialEq)]
pub enum TextOp {
    /// Skip over `chars` characters, optionally (re)formatting them
    Retain { chars: usize, attributes: Attributes },

    /// Insert `text` at the current position
    Insert { text: String, attributes: Attributes },

    /// Remove the next `chars` characters
    Delete { chars: usize },
}

impl TextOp {
    pub fn is_retain(&self) -> bool {
        matches!(self, TextOp::Retain { .. })
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, TextOp::Insert { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, TextOp::Delete { .. })
    }

    /// Number of characters this op retains, inserts or deletes
    pub fn len(&self) -> usize {
        match self {
            TextOp::Retain { chars, .. } | TextOp::Delete { chars } => *chars,
            TextOp::Insert { text, .. } => char_len(text),
        }
    }

    /// Ops are never materialized with zero length, so this only holds for
    /// values built by hand.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Attributes of a retain or insert (delete never carries any)
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            TextOp::Retain { attributes, .. } | TextOp::Insert { attributes, .. } => {
                Some(attributes)
            }
            TextOp::Delete { .. } => None,
        }
    }

    pub fn has_empty_attributes(&self) -> bool {
        self.attributes().map_or(true, BTreeMap::is_empty)
    }

    /// Remainder of this op once its first `n` characters are consumed.
    ///
    /// Returns `None` when nothing is left.
    pub(crate) fn advance(self, n: usize) -> Option<TextOp> {
        if n >= self.len() {
            return None;
        }

        Some(match self {
            TextOp::Retain { chars, attributes } => TextOp::Retain {
                chars: chars - n,
                attributes,
            },
            TextOp::Insert { text, attributes } => TextOp::Insert {
                text: split_chars(&text, n).1.to_string(),
                attributes,
            },
            TextOp::Delete { chars } => TextOp::Delete { chars: chars - n },
        })
    }
}

impl fmt::Display for TextOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextOp::Retain { chars, .. } => write!(f, "retain {}", chars),
            TextOp::Insert { text, .. } => write!(f, "insert '{}'", text),
            TextOp::Delete { chars } => write!(f, "delete {}", chars),
        }
    }
}

/// Length of `text` in chars
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split `text` after its first `n` chars
pub(crate) fn split_chars(text: &str, n: usize) -> (&str, &str) {
    let byte_index = text
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(index, _)| index);
    text.split_at(byte_index)
}

/// Overlay `second` onto `first`.
///
/// With `drop_removals`, a `false` in `second` deletes the key instead of
/// being stored (used when the first op is an insert: there is nothing left
/// to remove from).
pub(crate) fn merge_attributes(
    first: &Attributes,
    second: &Attributes,
    drop_removals: bool,
) -> Attributes {
    let mut merged = first.clone();

    for (key, value) in second {
        if drop_removals && is_removal(value) {
            merged.remove(key);
        } else {
            merged.insert(key.clone(), value.clone());
        }
    }

    merged
}

pub(crate) fn is_removal(value: &Value) -> bool {
    matches!(value, Value::Bool(false))
}
