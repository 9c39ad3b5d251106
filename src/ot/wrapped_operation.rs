//! WrappedOperation: an operation bound to metadata kept in lockstep
//!
//! compose, invert and transform act on the operation and forward to the
//! metadata's [`OperationMetadata`] capabilities at the same time.

use super::cursor::Cursor;
use super::operation_meta::{OperationMeta, OperationMetadata};
use super::text_operation::TextOperation;
use crate::error::Result;
use std::fmt;

/// A [`TextOperation`] plus optional metadata (cursor state by default)
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedOperation<M = OperationMeta> {
    operation: TextOperation,
    meta: Option<M>,
}

impl<M: OperationMetadata> WrappedOperation<M> {
    pub fn new(operation: TextOperation, meta: Option<M>) -> Self {
        Self { operation, meta }
    }

    /// Wrap an operation that carries no metadata
    pub fn bare(operation: TextOperation) -> Self {
        Self::new(operation, None)
    }

    pub fn operation(&self) -> &TextOperation {
        &self.operation
    }

    pub fn meta(&self) -> Option<&M> {
        self.meta.as_ref()
    }

    pub fn into_parts(self) -> (TextOperation, Option<M>) {
        (self.operation, self.meta)
    }

    /// Cursor state after the operation, when the metadata tracks one
    pub fn cursor(&self) -> Option<Cursor> {
        self.meta.as_ref().and_then(OperationMetadata::cursor)
    }

    pub fn is_noop(&self) -> bool {
        self.operation.is_noop()
    }

    pub fn apply(&self, document: &str) -> Result<String> {
        self.operation.apply(document)
    }

    pub fn invert(&self, document: &str) -> Result<Self> {
        Ok(Self::new(
            self.operation.invert(document)?,
            self.meta.as_ref().map(OperationMetadata::invert),
        ))
    }

    pub fn compose(&self, other: &Self) -> Result<Self> {
        let meta = match (&self.meta, &other.meta) {
            (Some(first), Some(second)) => Some(first.compose(second)),
            (Some(first), None) => Some(first.clone()),
            (None, second) => second.clone(),
        };

        Ok(Self::new(self.operation.compose(&other.operation)?, meta))
    }

    /// Transform against a concurrent wrapped operation; each side's
    /// metadata is moved through the other side's operation.
    pub fn transform(&self, other: &Self) -> Result<(Self, Self)> {
        let (a_prime, b_prime) = TextOperation::transform(&self.operation, &other.operation)?;

        Ok((
            Self::new(
                a_prime,
                self.meta.as_ref().map(|meta| meta.transform(&other.operation)),
            ),
            Self::new(
                b_prime,
                other.meta.as_ref().map(|meta| meta.transform(&self.operation)),
            ),
        ))
    }

    /// Operations are compared by effect only; metadata is ignored
    pub fn equals(&self, other: &Self) -> bool {
        self.operation.equals(&other.operation)
    }

    pub fn can_merge_with(&self, other: &Self) -> bool {
        self.operation.can_merge_with(&other.operation)
    }

    pub fn should_be_composed_with(&self, other: &Self) -> bool {
        self.operation.should_be_composed_with(&other.operation)
    }

    pub fn should_be_composed_with_inverted(&self, other: &Self) -> bool {
        self.operation
            .should_be_composed_with_inverted(&other.operation)
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.operation.to_json()
    }
}

impl<M> From<TextOperation> for WrappedOperation<M> {
    fn from(operation: TextOperation) -> Self {
        Self {
            operation,
            meta: None,
        }
    }
}

impl<M> fmt::Display for WrappedOperation<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.operation, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(before: usize, after: usize) -> OperationMeta {
        OperationMeta::new(Some(Cursor::caret(before)), Some(Cursor::caret(after)))
    }

    #[test]
    fn test_apply() {
        let mut op = TextOperation::new();
        op.retain(5).insert(" ipsum");
        let wrapped = WrappedOperation::new(op, Some(meta(5, 11)));
        assert_eq!(wrapped.apply("lorem").unwrap(), "lorem ipsum");
        assert_eq!(wrapped.cursor(), Some(Cursor::caret(11)));
    }

    #[test]
    fn test_invert() {
        let mut op = TextOperation::new();
        op.retain(2).insert("ab");
        let wrapped = WrappedOperation::new(op, Some(meta(2, 4)));

        let inverse = wrapped.invert("xy").unwrap();
        assert_eq!(inverse.apply("xyab").unwrap(), "xy");
        assert_eq!(inverse.meta(), Some(&meta(4, 2)));
    }

    #[test]
    fn test_compose() {
        let mut a = TextOperation::new();
        a.insert("lorem");
        let mut b = TextOperation::new();
        b.retain(5).insert(" ipsum");

        let first = WrappedOperation::new(a, Some(meta(0, 5)));
        let second = WrappedOperation::new(b, Some(meta(5, 11)));

        let composed = first.compose(&second).unwrap();
        assert_eq!(composed.apply("").unwrap(), "lorem ipsum");
        assert_eq!(composed.meta(), Some(&meta(0, 11)));
    }

    #[test]
    fn test_compose_with_missing_meta() {
        let mut a = TextOperation::new();
        a.insert("a");
        let mut b = TextOperation::new();
        b.retain(1).insert("b");

        let first: WrappedOperation = WrappedOperation::bare(a);
        let second = WrappedOperation::new(b, Some(meta(1, 2)));
        assert_eq!(first.compose(&second).unwrap().meta(), Some(&meta(1, 2)));
    }

    #[test]
    fn test_transform() {
        let mut a = TextOperation::new();
        a.retain(1).insert("lorem").retain(2);
        let mut b = TextOperation::new();
        b.insert("ipsum ").retain(3);

        let wrapped_a = WrappedOperation::new(a, Some(meta(1, 6)));
        let wrapped_b = WrappedOperation::new(b, Some(meta(0, 6)));

        let (a_prime, b_prime) = wrapped_a.transform(&wrapped_b).unwrap();
        assert_eq!(a_prime.meta(), Some(&meta(7, 12)));
        assert_eq!(b_prime.meta(), Some(&meta(0, 11)));

        let document = "xyz";
        let left = b_prime
            .apply(&wrapped_a.apply(document).unwrap())
            .unwrap();
        let right = a_prime
            .apply(&wrapped_b.apply(document).unwrap())
            .unwrap();
        assert_eq!(left, right);
    }

    #[test]
    fn test_opaque_metadata() {
        let mut op = TextOperation::new();
        op.insert("abc");
        let wrapped: WrappedOperation<()> = WrappedOperation::new(op, Some(()));
        let inverse = wrapped.invert("").unwrap();
        assert_eq!(inverse.meta(), Some(&()));
        assert_eq!(inverse.cursor(), None);
    }

    #[test]
    fn test_equals_ignores_meta() {
        let mut op = TextOperation::new();
        op.retain(3);
        let a = WrappedOperation::new(op.clone(), Some(meta(0, 0)));
        let b = WrappedOperation::new(op, Some(meta(1, 2)));
        assert!(a.equals(&b));
        assert_ne!(a, b);
    }
}
