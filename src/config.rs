//! EditorClient tuning knobs
//!
//! Loaded from JSON by embedders that keep settings next to the document;
//! every field has a default, so a partial (or empty) object is valid.
//!
//! ```rust
//! use ot_sync_core::EditorClientConfig;
//!
//! let config = EditorClientConfig::from_json_str(r#"{"maxUndoDepth": 10}"#).unwrap();
//! assert_eq!(config.max_undo_depth, 10);
//! assert_eq!(config.synced_debounce_ms, 10);
//! ```

use crate::error::{Result, SyncError};
use crate::undo::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorClientConfig {
    /// Entries kept on each of the undo and redo stacks
    pub max_undo_depth: usize,

    /// Quiet period before a `Synced` event is emitted
    pub synced_debounce_ms: u64,

    /// Retry delay for cursor updates held back while local edits are
    /// buffered
    pub cursor_resend_delay_ms: u64,
}

impl Default for EditorClientConfig {
    fn default() -> Self {
        Self {
            max_undo_depth: DEFAULT_MAX_DEPTH,
            synced_debounce_ms: 10,
            cursor_resend_delay_ms: 3,
        }
    }
}

impl EditorClientConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_undo_depth == 0 {
            return Err(SyncError::InvalidArgument(
                "maxUndoDepth must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn synced_debounce(&self) -> Duration {
        Duration::from_millis(self.synced_debounce_ms)
    }

    pub fn cursor_resend_delay(&self) -> Duration {
        Duration::from_millis(self.cursor_resend_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorClientConfig::default();
        assert_eq!(config.max_undo_depth, 50);
        assert_eq!(config.synced_debounce(), Duration::from_millis(10));
        assert_eq!(config.cursor_resend_delay(), Duration::from_millis(3));
    }

    #[test]
    fn test_partial_json() {
        let config = EditorClientConfig::from_json_str(r#"{"cursorResendDelayMs": 7}"#).unwrap();
        assert_eq!(config.cursor_resend_delay_ms, 7);
        assert_eq!(config.max_undo_depth, 50);
        assert_eq!(EditorClientConfig::from_json_str("{}").unwrap(), EditorClientConfig::default());
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EditorClientConfig::from_json_str(r#"{"maxUndoDepth": 0}"#),
            Err(SyncError::InvalidArgument(_))
        ));
        assert!(matches!(
            EditorClientConfig::from_json_str(r#"{"maxUndoDepth": "many"}"#),
            Err(SyncError::Serialization(_))
        ));
    }
}
