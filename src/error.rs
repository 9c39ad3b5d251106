//! Error types for the OT core
//!
//! Every variant is a contract violation surfaced to the caller. Nothing in
//! the core retries or recovers from these on its own.

use thiserror::Error;

/// Unified error type for operation algebra, client protocol and adapters
#[derive(Debug, Error)]
pub enum SyncError {
    /// Non-positive length, zero undo depth and similar bad inputs
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation does not fit the document, or a malformed JSON encoding
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// compose/transform on operations from different document versions
    #[error("Incompatible operation: {0}")]
    IncompatibleOperation(String),

    /// Protocol call that is illegal in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Failure reported by an editor or database adapter
    #[error("Adapter error: {0}")]
    Adapter(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for OT operations
pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SyncError::InvalidState("There is no pending operation.".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid state: There is no pending operation."
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: SyncError = parse.unwrap_err().into();
        assert!(matches!(err, SyncError::Serialization(_)));
    }
}
