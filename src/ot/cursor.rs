//! Cursor: caret or selection that rides along with operations

use super::text_op::{char_len, TextOp};
use super::text_operation::TextOperation;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A caret (`position == selection_end`) or a selection.
///
/// `position` is the side of the selection that moves with the arrow keys.
/// Both are zero-based char indexes into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cursor {
    position: usize,
    selection_end: usize,
}

impl Cursor {
    pub fn new(position: usize, selection_end: usize) -> Self {
        Self {
            position,
            selection_end,
        }
    }

    /// Collapsed caret at `position`
    pub fn caret(position: usize) -> Self {
        Self::new(position, position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn selection_end(&self) -> usize {
        self.selection_end
    }

    pub fn is_collapsed(&self) -> bool {
        self.position == self.selection_end
    }

    pub fn equals(&self, other: Option<&Cursor>) -> bool {
        other.is_some_and(|other| self == other)
    }

    /// Of two sequential cursor states the later one wins
    pub fn compose(&self, other: &Cursor) -> Cursor {
        *other
    }

    /// Move the cursor through `operation`.
    ///
    /// Text inserted at the cursor pushes it forward; a deletion spanning
    /// the cursor collapses it to the start of the deleted range.
    pub fn transform(&self, operation: &TextOperation) -> Cursor {
        let position = transform_index(operation.ops(), self.position);

        if self.is_collapsed() {
            return Cursor::caret(position);
        }

        Cursor::new(position, transform_index(operation.ops(), self.selection_end))
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "position": self.position,
            "selectionEnd": self.selection_end,
        })
    }

    pub fn from_json(value: &serde_json::Value) -> Result<Cursor> {
        Ok(Cursor::deserialize(value)?)
    }
}

fn transform_index(ops: &[TextOp], index: usize) -> usize {
    // `remaining` is how far into the input the cursor still is
    let mut remaining = index as isize;
    let mut new_index = index;

    for op in ops {
        match op {
            TextOp::Retain { chars, .. } => remaining -= *chars as isize,
            TextOp::Insert { text, .. } => new_index += char_len(text),
            TextOp::Delete { chars } => {
                new_index -= (remaining.max(0) as usize).min(*chars);
                remaining -= *chars as isize;
            }
        }

        if remaining < 0 {
            break;
        }
    }

    new_index
}
