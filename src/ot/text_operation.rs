//! TextOperation: an atomic edit over a whole document
//!
//! An operation is a list of [`TextOp`]s that walks the entire input
//! document: retains and deletes consume input characters, retains and
//! inserts produce output characters. `base_length` is the length of every
//! document the operation applies to, `target_length` the length of every
//! document it produces.
//!
//! # Canonical form
//!
//! Every builder funnels through [`TextOperation::push`], which keeps the op
//! list normalized:
//!
//! - no two adjacent ops of the same kind with equal attributes,
//! - an insert never directly follows a delete (it is moved in front of it),
//! - no zero-length op.
//!
//! Two operations with the same effect therefore have identical op lists,
//! which is what `==`, `compose` and `transform` rely on.
//!
//! # Example
//!
//! ```rust
//! use ot_sync_core::ot::TextOperation;
//!
//! let mut op = TextOperation::new();
//! op.retain(6).delete(1).insert("D").retain(4);
//!
//! assert_eq!(op.apply("lorem dolor").unwrap(), "lorem Dolor");
//! ```

use super::text_op::{char_len, is_removal, merge_attributes, split_chars, Attributes, TextOp};
use crate::error::{Result, SyncError};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// Sequence of retain / insert / delete steps forming one edit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextOperation {
    ops: Vec<TextOp>,
    base_length: usize,
    target_length: usize,
}

impl TextOperation {
    /// Create an empty operation (applies to, and produces, the empty document)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[TextOp] {
        &self.ops
    }

    pub fn base_length(&self) -> usize {
        self.base_length
    }

    pub fn target_length(&self) -> usize {
        self.target_length
    }

    /// Skip over `n` characters
    pub fn retain(&mut self, n: usize) -> &mut Self {
        self.retain_with(n, Attributes::new())
    }

    /// Skip over `n` characters, applying `attributes` to them
    pub fn retain_with(&mut self, n: usize, attributes: Attributes) -> &mut Self {
        if n == 0 {
            return self;
        }

        self.base_length += n;
        self.target_length += n;
        self.push(TextOp::Retain {
            chars: n,
            attributes,
        });
        self
    }

    /// Insert `text` at the current position
    pub fn insert(&mut self, text: &str) -> &mut Self {
        self.insert_with(text, Attributes::new())
    }

    /// Insert `text` carrying `attributes`. A `false` value has nothing to
    /// remove on fresh text and is dropped.
    pub fn insert_with(&mut self, text: &str, attributes: Attributes) -> &mut Self {
        if text.is_empty() {
            return self;
        }

        let attributes = attributes
            .into_iter()
            .filter(|(_, value)| !is_removal(value))
            .collect();

        self.target_length += char_len(text);
        self.push(TextOp::Insert {
            text: text.to_string(),
            attributes,
        });
        self
    }

    /// Delete the next `n` characters
    pub fn delete(&mut self, n: usize) -> &mut Self {
        if n == 0 {
            return self;
        }

        self.base_length += n;
        self.push(TextOp::Delete { chars: n });
        self
    }

    /// Delete as many characters as `text` has; only its length is used
    pub fn delete_text(&mut self, text: &str) -> &mut Self {
        self.delete(char_len(text))
    }

    /// Signed variant of [`retain_with`](Self::retain_with) for untyped input
    pub fn try_retain(&mut self, n: i64, attributes: Option<Attributes>) -> Result<&mut Self> {
        let n = checked_length(n, "retain")?;
        Ok(self.retain_with(n, attributes.unwrap_or_default()))
    }

    /// Signed variant of [`delete`](Self::delete) for untyped input
    pub fn try_delete(&mut self, n: i64) -> Result<&mut Self> {
        let n = checked_length(n, "delete")?;
        Ok(self.delete(n))
    }

    /// Append `op`, merging it into the tail so the list stays canonical
    fn push(&mut self, op: TextOp) {
        match op {
            TextOp::Retain { chars, attributes } => {
                if let Some(TextOp::Retain {
                    chars: last,
                    attributes: last_attributes,
                }) = self.ops.last_mut()
                {
                    if *last_attributes == attributes {
                        *last += chars;
                        return;
                    }
                }
                self.ops.push(TextOp::Retain { chars, attributes });
            }
            TextOp::Insert { text, attributes } => {
                let count = self.ops.len();

                if let Some(TextOp::Insert {
                    text: last,
                    attributes: last_attributes,
                }) = self.ops.last_mut()
                {
                    if *last_attributes == attributes {
                        last.push_str(&text);
                        return;
                    }
                }

                if matches!(self.ops.last(), Some(TextOp::Delete { .. })) {
                    // insert/delete at the same position commute; inserts go first
                    if count >= 2 {
                        if let TextOp::Insert {
                            text: previous,
                            attributes: previous_attributes,
                        } = &mut self.ops[count - 2]
                        {
                            if *previous_attributes == attributes {
                                previous.push_str(&text);
                                return;
                            }
                        }
                    }
                    self.ops.insert(count - 1, TextOp::Insert { text, attributes });
                    return;
                }

                self.ops.push(TextOp::Insert { text, attributes });
            }
            TextOp::Delete { chars } => {
                if let Some(TextOp::Delete { chars: last }) = self.ops.last_mut() {
                    *last += chars;
                    return;
                }
                self.ops.push(TextOp::Delete { chars });
            }
        }
    }

    /// Same net effect. Canonical form makes this structural equality.
    pub fn equals(&self, other: &TextOperation) -> bool {
        self == other
    }

    /// True iff applying the operation changes neither text nor formatting
    pub fn is_noop(&self) -> bool {
        self.ops
            .iter()
            .all(|op| op.is_retain() && op.has_empty_attributes())
    }

    /// Whether `other` can follow this operation (`compose` precondition)
    pub fn can_merge_with(&self, other: &TextOperation) -> bool {
        self.target_length == other.base_length
    }

    /// Apply to `document`, returning the new document.
    ///
    /// The document must be exactly `base_length` chars long.
    pub fn apply(&self, document: &str) -> Result<String> {
        self.check_base_length(document)?;

        let mut output = String::with_capacity(document.len());
        let mut input = document.chars();

        for op in &self.ops {
            match op {
                TextOp::Retain { chars, .. } => output.extend(input.by_ref().take(*chars)),
                TextOp::Insert { text, .. } => output.push_str(text),
                TextOp::Delete { chars } => input.by_ref().take(*chars).for_each(drop),
            }
        }

        Ok(output)
    }

    /// Apply to `document` along with one attribute map per character.
    ///
    /// Missing slots in `attributes` count as unformatted text. Returns the
    /// new document and its per-character attributes.
    pub fn apply_with_attributes(
        &self,
        document: &str,
        attributes: &[Attributes],
    ) -> Result<(String, Vec<Attributes>)> {
        self.check_base_length(document)?;

        let mut output = String::with_capacity(document.len());
        let mut output_attributes = Vec::with_capacity(self.target_length);
        let mut input = document.chars();
        let mut position = 0;

        for op in &self.ops {
            match op {
                TextOp::Retain {
                    chars,
                    attributes: op_attributes,
                } => {
                    output.extend(input.by_ref().take(*chars));

                    for index in position..position + chars {
                        let current = attributes.get(index).cloned().unwrap_or_default();
                        output_attributes.push(merge_attributes(&current, op_attributes, true));
                    }
                    position += chars;
                }
                TextOp::Insert {
                    text,
                    attributes: op_attributes,
                } => {
                    output.push_str(text);
                    output_attributes
                        .extend(std::iter::repeat(op_attributes.clone()).take(char_len(text)));
                }
                TextOp::Delete { chars } => {
                    input.by_ref().take(*chars).for_each(drop);
                    position += chars;
                }
            }
        }

        Ok((output, output_attributes))
    }

    /// The operation that undoes this one, given the pre-image `document`
    pub fn invert(&self, document: &str) -> Result<TextOperation> {
        self.invert_with_attributes(document, &[])
    }

    /// Like [`invert`](Self::invert), restoring the formatting the pre-image
    /// had. `attributes` holds one map per character of `document`.
    pub fn invert_with_attributes(
        &self,
        document: &str,
        attributes: &[Attributes],
    ) -> Result<TextOperation> {
        self.check_base_length(document)?;

        let chars: Vec<char> = document.chars().collect();
        let prior = |index: usize| attributes.get(index).cloned().unwrap_or_default();

        let mut inverse = TextOperation::new();
        let mut position = 0;

        for op in &self.ops {
            match op {
                TextOp::Retain {
                    chars: count,
                    attributes: op_attributes,
                } => {
                    if op_attributes.is_empty() {
                        inverse.retain(*count);
                    } else {
                        for index in position..position + count {
                            let before = prior(index);
                            let restore: Attributes = op_attributes
                                .keys()
                                .map(|key| {
                                    let value =
                                        before.get(key).cloned().unwrap_or(Value::Bool(false));
                                    (key.clone(), value)
                                })
                                .collect();
                            inverse.retain_with(1, restore);
                        }
                    }
                    position += count;
                }
                TextOp::Insert { text, .. } => {
                    inverse.delete(char_len(text));
                }
                TextOp::Delete { chars: count } => {
                    for index in position..position + count {
                        let mut buf = [0u8; 4];
                        inverse.insert_with(chars[index].encode_utf8(&mut buf), prior(index));
                    }
                    position += count;
                }
            }
        }

        Ok(inverse)
    }

    /// Merge this operation and the one following it into a single
    /// operation with the effect of applying both in sequence.
    pub fn compose(&self, other: &TextOperation) -> Result<TextOperation> {
        if !self.can_merge_with(other) {
            return Err(SyncError::IncompatibleOperation(format!(
                "The base length of the second operation ({}) has to be the target length of the first operation ({})",
                other.base_length, self.target_length
            )));
        }

        let mut composed = TextOperation::new();
        let mut ops1 = self.ops.iter().cloned();
        let mut ops2 = other.ops.iter().cloned();
        let mut op1 = ops1.next();
        let mut op2 = ops2.next();

        loop {
            match (op1.take(), op2.take()) {
                (None, None) => break,
                (Some(TextOp::Delete { chars }), next2) => {
                    composed.delete(chars);
                    op1 = ops1.next();
                    op2 = next2;
                }
                (next1, Some(TextOp::Insert { text, attributes })) => {
                    composed.insert_with(&text, attributes);
                    op1 = next1;
                    op2 = ops2.next();
                }
                (None, Some(_)) => {
                    return Err(SyncError::IncompatibleOperation(
                        "Cannot compose operations: first operation is too short.".to_string(),
                    ));
                }
                (Some(_), None) => {
                    return Err(SyncError::IncompatibleOperation(
                        "Cannot compose operations: first operation is too long.".to_string(),
                    ));
                }
                (
                    Some(TextOp::Retain {
                        chars: n1,
                        attributes: a1,
                    }),
                    Some(TextOp::Retain {
                        chars: n2,
                        attributes: a2,
                    }),
                ) => {
                    let attributes = merge_attributes(&a1, &a2, false);
                    let step = n1.min(n2);
                    composed.retain_with(step, attributes);

                    op1 = remainder(
                        TextOp::Retain {
                            chars: n1,
                            attributes: a1,
                        },
                        step,
                        &mut ops1,
                    );
                    op2 = remainder(
                        TextOp::Retain {
                            chars: n2,
                            attributes: a2,
                        },
                        step,
                        &mut ops2,
                    );
                }
                (Some(insert @ TextOp::Insert { .. }), Some(TextOp::Delete { chars: n2 })) => {
                    // text inserted by the first operation and deleted by the second
                    let step = insert.len().min(n2);
                    op1 = remainder(insert, step, &mut ops1);
                    op2 = remainder(TextOp::Delete { chars: n2 }, step, &mut ops2);
                }
                (
                    Some(TextOp::Insert {
                        text,
                        attributes: a1,
                    }),
                    Some(TextOp::Retain {
                        chars: n2,
                        attributes: a2,
                    }),
                ) => {
                    let attributes = merge_attributes(&a1, &a2, true);
                    let step = char_len(&text).min(n2);
                    composed.insert_with(split_chars(&text, step).0, attributes);

                    op1 = remainder(
                        TextOp::Insert {
                            text,
                            attributes: a1,
                        },
                        step,
                        &mut ops1,
                    );
                    op2 = remainder(
                        TextOp::Retain {
                            chars: n2,
                            attributes: a2,
                        },
                        step,
                        &mut ops2,
                    );
                }
                (
                    Some(retain @ TextOp::Retain { .. }),
                    Some(TextOp::Delete { chars: n2 }),
                ) => {
                    let step = retain.len().min(n2);
                    composed.delete(step);
                    op1 = remainder(retain, step, &mut ops1);
                    op2 = remainder(TextOp::Delete { chars: n2 }, step, &mut ops2);
                }
            }
        }

        Ok(composed)
    }

    /// Transform two concurrent operations `a` and `b` (same base document)
    /// into `(a', b')` such that `a ∘ b'` and `b ∘ a'` converge.
    ///
    /// When both insert at the same position, `a`'s text lands first.
    pub fn transform(a: &TextOperation, b: &TextOperation) -> Result<(TextOperation, TextOperation)> {
        if a.base_length != b.base_length {
            return Err(SyncError::IncompatibleOperation(format!(
                "Both operations have to have the same base length ({} != {})",
                a.base_length, b.base_length
            )));
        }

        let mut a_prime = TextOperation::new();
        let mut b_prime = TextOperation::new();
        let mut ops1 = a.ops.iter().cloned();
        let mut ops2 = b.ops.iter().cloned();
        let mut op1 = ops1.next();
        let mut op2 = ops2.next();

        loop {
            // both imaginary cursors sit at the same input position here
            match (op1.take(), op2.take()) {
                (None, None) => break,
                (Some(TextOp::Insert { text, attributes }), next2) => {
                    b_prime.retain_with(char_len(&text), attributes.clone());
                    a_prime.insert_with(&text, attributes);
                    op1 = ops1.next();
                    op2 = next2;
                }
                (next1, Some(TextOp::Insert { text, attributes })) => {
                    a_prime.retain_with(char_len(&text), attributes.clone());
                    b_prime.insert_with(&text, attributes);
                    op1 = next1;
                    op2 = ops2.next();
                }
                (None, Some(_)) => {
                    return Err(SyncError::IncompatibleOperation(
                        "Cannot transform operations: first operation is too short.".to_string(),
                    ));
                }
                (Some(_), None) => {
                    return Err(SyncError::IncompatibleOperation(
                        "Cannot transform operations: first operation is too long.".to_string(),
                    ));
                }
                (
                    Some(TextOp::Retain {
                        chars: n1,
                        attributes: a1,
                    }),
                    Some(TextOp::Retain {
                        chars: n2,
                        attributes: a2,
                    }),
                ) => {
                    let (a1_prime, a2_prime) = transform_attributes(&a1, &a2);
                    let step = n1.min(n2);
                    a_prime.retain_with(step, a1_prime);
                    b_prime.retain_with(step, a2_prime);

                    op1 = remainder(
                        TextOp::Retain {
                            chars: n1,
                            attributes: a1,
                        },
                        step,
                        &mut ops1,
                    );
                    op2 = remainder(
                        TextOp::Retain {
                            chars: n2,
                            attributes: a2,
                        },
                        step,
                        &mut ops2,
                    );
                }
                (Some(TextOp::Delete { chars: n1 }), Some(TextOp::Delete { chars: n2 })) => {
                    // both deleted the same span: nothing left to do on either side
                    let step = n1.min(n2);
                    op1 = remainder(TextOp::Delete { chars: n1 }, step, &mut ops1);
                    op2 = remainder(TextOp::Delete { chars: n2 }, step, &mut ops2);
                }
                (Some(TextOp::Delete { chars: n1 }), Some(retain @ TextOp::Retain { .. })) => {
                    let step = n1.min(retain.len());
                    a_prime.delete(step);
                    op1 = remainder(TextOp::Delete { chars: n1 }, step, &mut ops1);
                    op2 = remainder(retain, step, &mut ops2);
                }
                (Some(retain @ TextOp::Retain { .. }), Some(TextOp::Delete { chars: n2 })) => {
                    let step = retain.len().min(n2);
                    b_prime.delete(step);
                    op1 = remainder(retain, step, &mut ops1);
                    op2 = remainder(TextOp::Delete { chars: n2 }, step, &mut ops2);
                }
            }
        }

        Ok((a_prime, b_prime))
    }

    /// Method form of [`TextOperation::transform`]: `a.transform_against(b)`
    pub fn transform_against(&self, other: &TextOperation) -> Result<(TextOperation, TextOperation)> {
        TextOperation::transform(self, other)
    }

    /// Whether `other`, applied right after this operation, continues the
    /// same gesture: contiguous typing or contiguous deleting (backspace or
    /// forward delete). Used for undo coalescing.
    pub fn should_be_composed_with(&self, other: &TextOperation) -> bool {
        if self.is_noop() || other.is_noop() {
            return true;
        }

        let start_a = self.start_index();
        let start_b = other.start_index();

        match (self.simple_op(), other.simple_op()) {
            (Some(TextOp::Insert { text, .. }), Some(TextOp::Insert { .. })) => {
                start_a + char_len(text) == start_b
            }
            (Some(TextOp::Delete { .. }), Some(TextOp::Delete { chars, .. })) => {
                start_b + chars == start_a || start_a == start_b
            }
            _ => false,
        }
    }

    /// Mirror of [`should_be_composed_with`](Self::should_be_composed_with)
    /// for inverted operations:
    /// `a.should_be_composed_with(b) == b⁻¹.should_be_composed_with_inverted(a⁻¹)`.
    pub fn should_be_composed_with_inverted(&self, other: &TextOperation) -> bool {
        if self.is_noop() || other.is_noop() {
            return true;
        }

        let start_a = self.start_index();
        let start_b = other.start_index();

        match (self.simple_op(), other.simple_op()) {
            (Some(TextOp::Insert { text, .. }), Some(TextOp::Insert { .. })) => {
                start_a + char_len(text) == start_b || start_a == start_b
            }
            (Some(TextOp::Delete { .. }), Some(TextOp::Delete { chars, .. })) => {
                start_b + chars == start_a
            }
            _ => false,
        }
    }

    /// The single non-retain op of an operation shaped like
    /// `[retain?] op [retain?]`
    fn simple_op(&self) -> Option<&TextOp> {
        match self.ops.as_slice() {
            [op] => Some(op),
            [TextOp::Retain { .. }, op] => Some(op),
            [op, TextOp::Retain { .. }] => Some(op),
            [TextOp::Retain { .. }, op, TextOp::Retain { .. }] => Some(op),
            _ => None,
        }
    }

    fn start_index(&self) -> usize {
        match self.ops.first() {
            Some(TextOp::Retain { chars, .. }) => *chars,
            _ => 0,
        }
    }

    fn check_base_length(&self, document: &str) -> Result<()> {
        let length = char_len(document);
        if length != self.base_length {
            return Err(SyncError::InvalidOperation(format!(
                "The operation's base length ({}) must be equal to the string's length ({})",
                self.base_length, length
            )));
        }
        Ok(())
    }
}

impl fmt::Display for TextOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, op) in self.ops.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

/// What is left of `op` after `step` chars, or the next op when it is spent
fn remainder<I>(op: TextOp, step: usize, rest: &mut I) -> Option<TextOp>
where
    I: Iterator<Item = TextOp>,
{
    op.advance(step).or_else(|| rest.next())
}

/// Split concurrent formatting of the same span. On conflicting values `b`
/// wins: `b'` re-applies it after `a`, `a'` leaves it alone.
fn transform_attributes(a: &Attributes, b: &Attributes) -> (Attributes, Attributes) {
    let mut a_prime = Attributes::new();
    let mut b_prime = Attributes::new();

    for (key, value_a) in a {
        match b.get(key) {
            None => {
                a_prime.insert(key.clone(), value_a.clone());
            }
            Some(value_b) if value_b == value_a => {}
            Some(value_b) => {
                b_prime.insert(key.clone(), value_b.clone());
            }
        }
    }

    for (key, value_b) in b {
        if !a.contains_key(key) {
            b_prime.insert(key.clone(), value_b.clone());
        }
    }

    (a_prime, b_prime)
}

fn checked_length(n: i64, what: &str) -> Result<usize> {
    match n.cmp(&0) {
        Ordering::Less => Err(SyncError::InvalidArgument(format!(
            "{} expects a non-negative integer, got {}",
            what, n
        ))),
        _ => usize::try_from(n).map_err(|_| {
            SyncError::InvalidArgument(format!("{} length {} does not fit in usize", what, n))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_lengths() {
        let mut op = TextOperation::new();
        assert_eq!(op.base_length(), 0);
        assert_eq!(op.target_length(), 0);

        op.retain(5);
        assert_eq!((op.base_length(), op.target_length()), (5, 5));

        op.insert("abc");
        assert_eq!((op.base_length(), op.target_length()), (5, 8));

        op.retain(2);
        assert_eq!((op.base_length(), op.target_length()), (7, 10));

        op.delete(2);
        assert_eq!((op.base_length(), op.target_length()), (9, 10));
    }

    #[test]
    fn test_zero_length_ops_are_dropped() {
        let mut op = TextOperation::new();
        op.retain(0).insert("").delete(0);
        assert!(op.ops().is_empty());
        assert!(op.is_noop());
    }

    #[test]
    fn test_negative_lengths_rejected() {
        let mut op = TextOperation::new();
        assert!(matches!(
            op.try_retain(-5, None),
            Err(SyncError::InvalidArgument(_))
        ));
        assert!(matches!(op.try_delete(-1), Err(SyncError::InvalidArgument(_))));

        op.try_retain(3, None).unwrap().try_delete(2).unwrap();
        assert_eq!(op.base_length(), 5);
    }

    #[test]
    fn test_builders_merge() {
        let mut op = TextOperation::new();
        op.retain(2).retain(3).insert("ab").insert("c").delete(1).delete(2);
        assert_eq!(op.ops().len(), 3);

        let mut expected = TextOperation::new();
        expected.retain(5).insert("abc").delete(3);
        assert!(op.equals(&expected));
    }

    #[test]
    fn test_retain_with_different_attributes_not_merged() {
        let mut op = TextOperation::new();
        op.retain_with(2, attrs(json!({"bold": true}))).retain(3);
        assert_eq!(op.ops().len(), 2);
    }

    #[test]
    fn test_insert_moves_before_delete() {
        let mut a = TextOperation::new();
        a.retain(2).delete(3).insert("abc");

        let mut b = TextOperation::new();
        b.retain(2).insert("abc").delete(3);

        assert!(a.equals(&b));
        assert!(a.ops()[1].is_insert());
        assert!(a.ops()[2].is_delete());
    }

    #[test]
    fn test_insert_after_delete_merges_two_back() {
        let mut op = TextOperation::new();
        op.insert("ab").delete(1).insert("cd");
        assert_eq!(
            op.ops(),
            &[
                TextOp::Insert {
                    text: "abcd".to_string(),
                    attributes: Attributes::new()
                },
                TextOp::Delete { chars: 1 }
            ]
        );
    }

    #[test]
    fn test_delete_text() {
        let mut op = TextOperation::new();
        op.delete_text("lorem");
        assert_eq!(op.base_length(), 5);
    }

    #[test]
    fn test_is_noop() {
        let mut op = TextOperation::new();
        assert!(op.is_noop());
        op.retain(5);
        assert!(op.is_noop());
        op.retain(3);
        assert!(op.is_noop());
        op.insert("lorem");
        assert!(!op.is_noop());

        let mut formatting = TextOperation::new();
        formatting.retain_with(4, attrs(json!({"bold": true})));
        assert!(!formatting.is_noop());
    }

    #[test]
    fn test_display() {
        let mut op = TextOperation::new();
        op.retain(2).insert("lorem").delete(5).retain(5);
        assert_eq!(op.to_string(), "retain 2, insert 'lorem', delete 5, retain 5");
    }

    #[test]
    fn test_apply() {
        let mut op = TextOperation::new();
        op.retain(6).delete(1).insert("D").retain(4);
        assert_eq!(op.apply("lorem dolor").unwrap(), "lorem Dolor");
    }

    #[test]
    fn test_apply_unicode() {
        let mut op = TextOperation::new();
        op.retain(2).insert("🚀").delete(1);
        assert_eq!(op.apply("héé").unwrap(), "hé🚀");
    }

    #[test]
    fn test_apply_length_mismatch() {
        let mut op = TextOperation::new();
        op.retain(3);
        assert!(matches!(
            op.apply("too long"),
            Err(SyncError::InvalidOperation(_))
        ));
        assert!(matches!(op.apply("ab"), Err(SyncError::InvalidOperation(_))));
    }

    #[test]
    fn test_apply_with_attributes() {
        let mut op = TextOperation::new();
        op.retain_with(2, attrs(json!({"bold": true})))
            .retain_with(1, attrs(json!({"italic": false})))
            .insert_with("x", attrs(json!({"color": "red"})));

        let before = vec![
            Attributes::new(),
            attrs(json!({"italic": true})),
            attrs(json!({"italic": true})),
        ];
        let (text, after) = op.apply_with_attributes("abc", &before).unwrap();

        assert_eq!(text, "abcx");
        assert_eq!(
            after,
            vec![
                attrs(json!({"bold": true})),
                attrs(json!({"bold": true, "italic": true})),
                Attributes::new(),
                attrs(json!({"color": "red"})),
            ]
        );
    }

    #[test]
    fn test_invert() {
        let mut op = TextOperation::new();
        op.retain(2).insert("lorem").delete(3).retain(1);

        let document = "abcdef";
        let inverse = op.invert(document).unwrap();
        assert_eq!(op.base_length(), inverse.target_length());
        assert_eq!(op.target_length(), inverse.base_length());
        assert_eq!(inverse.apply(&op.apply(document).unwrap()).unwrap(), document);
    }

    #[test]
    fn test_invert_restores_formatting() {
        let mut bold = TextOperation::new();
        bold.retain(1).retain_with(2, attrs(json!({"bold": true})));

        let before = vec![
            Attributes::new(),
            attrs(json!({"bold": "heavy"})),
            Attributes::new(),
        ];
        let inverse = bold.invert_with_attributes("abc", &before).unwrap();

        let (_, formatted) = bold.apply_with_attributes("abc", &before).unwrap();
        let (text, restored) = inverse.apply_with_attributes("abc", &formatted).unwrap();
        assert_eq!(text, "abc");
        assert_eq!(restored, before);
    }

    #[test]
    fn test_invert_delete_restores_attributes() {
        let mut op = TextOperation::new();
        op.delete(2);

        let before = vec![attrs(json!({"bold": true})), attrs(json!({"bold": true}))];
        let inverse = op.invert_with_attributes("ab", &before).unwrap();

        let mut expected = TextOperation::new();
        expected.insert_with("ab", attrs(json!({"bold": true})));
        assert!(inverse.equals(&expected));
    }

    #[test]
    fn test_compose() {
        let mut a = TextOperation::new();
        a.retain(6).delete(1).insert("D").retain(4);
        let mut b = TextOperation::new();
        b.retain(11).insert(" ipsum");

        let ab = a.compose(&b).unwrap();
        let document = "lorem dolor";
        assert_eq!(
            ab.apply(document).unwrap(),
            b.apply(&a.apply(document).unwrap()).unwrap()
        );
        assert_eq!(ab.apply(document).unwrap(), "lorem Dolor ipsum");
    }

    #[test]
    fn test_compose_insert_then_delete() {
        let mut a = TextOperation::new();
        a.insert("hello");
        let mut b = TextOperation::new();
        b.retain(1).delete(3).retain(1);

        let ab = a.compose(&b).unwrap();
        let mut expected = TextOperation::new();
        expected.insert("ho");
        assert!(ab.equals(&expected));
    }

    #[test]
    fn test_compose_attributes_second_wins() {
        let mut a = TextOperation::new();
        a.retain_with(3, attrs(json!({"color": "red", "bold": true})));
        let mut b = TextOperation::new();
        b.retain_with(3, attrs(json!({"color": "blue"})));

        let ab = a.compose(&b).unwrap();
        let mut expected = TextOperation::new();
        expected.retain_with(3, attrs(json!({"color": "blue", "bold": true})));
        assert!(ab.equals(&expected));
    }

    #[test]
    fn test_compose_insert_then_unformat() {
        let mut a = TextOperation::new();
        a.insert_with("ab", attrs(json!({"bold": true})));
        let mut b = TextOperation::new();
        b.retain_with(2, attrs(json!({"bold": false})));

        let mut expected = TextOperation::new();
        expected.insert("ab");
        assert!(a.compose(&b).unwrap().equals(&expected));
    }

    #[test]
    fn test_compose_incompatible() {
        let mut a = TextOperation::new();
        a.retain(3);
        let mut b = TextOperation::new();
        b.retain(4);
        assert!(matches!(
            a.compose(&b),
            Err(SyncError::IncompatibleOperation(_))
        ));
    }

    #[test]
    fn test_transform() {
        let mut a = TextOperation::new();
        a.retain(5).insert(" ipsum").retain(6);
        let mut b = TextOperation::new();
        b.retain(6).delete(5);

        let (a_prime, b_prime) = TextOperation::transform(&a, &b).unwrap();
        let document = "lorem dolor";
        let left = b_prime.apply(&a.apply(document).unwrap()).unwrap();
        let right = a_prime.apply(&b.apply(document).unwrap()).unwrap();

        assert_eq!(left, right);
        assert_eq!(left, "lorem ipsum ");
        assert!(a.compose(&b_prime).unwrap().equals(&b.compose(&a_prime).unwrap()));
    }

    #[test]
    fn test_transform_concurrent_inserts_prefer_first() {
        let mut a = TextOperation::new();
        a.retain(1).insert("A");
        let mut b = TextOperation::new();
        b.retain(1).insert("B");

        let (a_prime, b_prime) = a.transform_against(&b).unwrap();
        assert_eq!(b_prime.apply(&a.apply("x").unwrap()).unwrap(), "xAB");
        assert_eq!(a_prime.apply(&b.apply("x").unwrap()).unwrap(), "xAB");
    }

    #[test]
    fn test_transform_overlapping_deletes() {
        let mut a = TextOperation::new();
        a.retain(1).delete(3).retain(2);
        let mut b = TextOperation::new();
        b.retain(2).delete(3).retain(1);

        let (a_prime, b_prime) = TextOperation::transform(&a, &b).unwrap();
        let document = "abcdef";
        assert_eq!(b_prime.apply(&a.apply(document).unwrap()).unwrap(), "af");
        assert_eq!(a_prime.apply(&b.apply(document).unwrap()).unwrap(), "af");
    }

    #[test]
    fn test_transform_attribute_conflict_prefers_second() {
        let mut a = TextOperation::new();
        a.retain_with(2, attrs(json!({"color": "red"})));
        let mut b = TextOperation::new();
        b.retain_with(2, attrs(json!({"color": "blue"})));

        let (a_prime, b_prime) = TextOperation::transform(&a, &b).unwrap();
        assert!(a_prime.is_noop());

        let (_, via_a) = a
            .compose(&b_prime)
            .unwrap()
            .apply_with_attributes("xy", &[])
            .unwrap();
        let (_, via_b) = b
            .compose(&a_prime)
            .unwrap()
            .apply_with_attributes("xy", &[])
            .unwrap();
        assert_eq!(via_a, via_b);
        assert_eq!(via_a[0], attrs(json!({"color": "blue"})));
    }

    #[test]
    fn test_insert_drops_removed_attributes() {
        let mut op = TextOperation::new();
        op.insert_with("x", attrs(json!({"bold": false, "color": "red"})));

        let mut expected = TextOperation::new();
        expected.insert_with("x", attrs(json!({"color": "red"})));
        assert!(op.equals(&expected));
    }

    #[test]
    fn test_transform_insert_with_removed_attribute_converges() {
        let mut a = TextOperation::new();
        a.insert_with("x", attrs(json!({"bold": false})));
        let b = TextOperation::new();

        let (a_prime, b_prime) = TextOperation::transform(&a, &b).unwrap();
        let ab_prime = a.compose(&b_prime).unwrap();
        let ba_prime = b.compose(&a_prime).unwrap();
        assert!(ab_prime.equals(&ba_prime));

        let mut plain = TextOperation::new();
        plain.insert("x");
        assert!(ab_prime.equals(&plain));
    }

    #[test]
    fn test_transform_base_length_mismatch() {
        let mut a = TextOperation::new();
        a.retain(3);
        let mut b = TextOperation::new();
        b.retain(4);
        assert!(matches!(
            TextOperation::transform(&a, &b),
            Err(SyncError::IncompatibleOperation(_))
        ));
    }

    #[test]
    fn test_should_be_composed_with() {
        let mut a = TextOperation::new();
        a.retain(3);
        let mut b = TextOperation::new();
        b.retain(1).insert("tag").retain(2);
        assert!(a.should_be_composed_with(&b));
        assert!(b.should_be_composed_with(&a));

        let mut a = TextOperation::new();
        a.retain(1).insert("a").retain(2);
        let mut b = TextOperation::new();
        b.retain(2).insert("b").retain(2);
        assert!(a.should_be_composed_with(&b));

        a.delete(3);
        let mut b = TextOperation::new();
        b.retain(1).insert("b").retain(2);
        assert!(!a.should_be_composed_with(&b));

        let mut a = TextOperation::new();
        a.retain(4).delete(3).retain(10);
        let mut b = TextOperation::new();
        b.retain(2).delete(2).retain(10);
        assert!(a.should_be_composed_with(&b));

        let mut b = TextOperation::new();
        b.retain(4).delete(7).retain(3);
        assert!(a.should_be_composed_with(&b));

        let mut b = TextOperation::new();
        b.retain(2).delete(9).retain(3);
        assert!(!a.should_be_composed_with(&b));
    }

    #[test]
    fn test_should_be_composed_with_inverted_mirrors() {
        let document = "lorem ipsum dolor";

        let mut a = TextOperation::new();
        a.retain(5).insert("x").retain(12);
        let mut b = TextOperation::new();
        b.retain(6).insert("y").retain(12);

        let a_inverse = a.invert(document).unwrap();
        let after_a = a.apply(document).unwrap();
        let b_inverse = b.invert(&after_a).unwrap();

        assert!(a.should_be_composed_with(&b));
        assert_eq!(
            a.should_be_composed_with(&b),
            b_inverse.should_be_composed_with_inverted(&a_inverse)
        );
    }
}
