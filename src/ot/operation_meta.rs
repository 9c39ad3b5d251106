//! Metadata that travels with an operation through compose/invert/transform

use super::cursor::Cursor;
use super::text_operation::TextOperation;

/// Capabilities a metadata value may expose to [`WrappedOperation`].
///
/// Every method defaults to passing the metadata through unchanged, so a
/// type only overrides the capabilities it actually has.
///
/// [`WrappedOperation`]: super::WrappedOperation
pub trait OperationMetadata: Clone {
    /// Metadata of the inverted operation
    fn invert(&self) -> Self {
        self.clone()
    }

    /// Metadata of `self`'s operation composed with `other`'s
    fn compose(&self, other: &Self) -> Self {
        let _ = other;
        self.clone()
    }

    /// Metadata after a concurrent `operation` was transformed in
    fn transform(&self, operation: &TextOperation) -> Self {
        let _ = operation;
        self.clone()
    }

    /// Cursor state the operation leaves behind, if tracked
    fn cursor(&self) -> Option<Cursor> {
        None
    }
}

/// Opaque metadata: passes through every operation untouched
impl OperationMetadata for () {}

/// Cursor state before and after an operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationMeta {
    cursor_before: Option<Cursor>,
    cursor_after: Option<Cursor>,
}

impl OperationMeta {
    pub fn new(cursor_before: Option<Cursor>, cursor_after: Option<Cursor>) -> Self {
        Self {
            cursor_before,
            cursor_after,
        }
    }

    pub fn cursor_before(&self) -> Option<Cursor> {
        self.cursor_before
    }

    pub fn cursor_after(&self) -> Option<Cursor> {
        self.cursor_after
    }
}

impl OperationMetadata for OperationMeta {
    fn invert(&self) -> Self {
        Self::new(self.cursor_after, self.cursor_before)
    }

    fn compose(&self, other: &Self) -> Self {
        Self::new(self.cursor_before, other.cursor_after)
    }

    fn transform(&self, operation: &TextOperation) -> Self {
        Self::new(
            self.cursor_before.map(|cursor| cursor.transform(operation)),
            self.cursor_after.map(|cursor| cursor.transform(operation)),
        )
    }

    fn cursor(&self) -> Option<Cursor> {
        self.cursor_after
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invert_swaps_cursors() {
        let meta = OperationMeta::new(Some(Cursor::caret(0)), Some(Cursor::new(4, 9)));
        let inverted = meta.invert();
        assert_eq!(inverted.cursor_before(), Some(Cursor::new(4, 9)));
        assert_eq!(inverted.cursor_after(), Some(Cursor::caret(0)));
    }

    #[test]
    fn test_compose() {
        let first = OperationMeta::new(Some(Cursor::caret(1)), Some(Cursor::caret(2)));
        let second = OperationMeta::new(Some(Cursor::caret(2)), Some(Cursor::caret(5)));
        let composed = first.compose(&second);
        assert_eq!(composed.cursor_before(), Some(Cursor::caret(1)));
        assert_eq!(composed.cursor_after(), Some(Cursor::caret(5)));
    }

    #[test]
    fn test_transform_keeps_missing_cursors() {
        let meta = OperationMeta::new(None, Some(Cursor::caret(3)));
        let mut op = TextOperation::new();
        op.insert("ab").retain(5);

        let transformed = meta.transform(&op);
        assert_eq!(transformed.cursor_before(), None);
        assert_eq!(transformed.cursor_after(), Some(Cursor::caret(5)));
    }

    #[test]
    fn test_cursor_is_after_state() {
        let meta = OperationMeta::new(Some(Cursor::caret(1)), Some(Cursor::caret(7)));
        assert_eq!(OperationMetadata::cursor(&meta), Some(Cursor::caret(7)));
    }

    #[test]
    fn test_unit_metadata_passes_through() {
        let mut op = TextOperation::new();
        op.retain(1);
        let () = ().transform(&op);
        assert_eq!(OperationMetadata::cursor(&()), None);
    }
}
