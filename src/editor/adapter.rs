//! Contracts for the editor widget and the database transport
//!
//! Adapters are implemented outside the core. They expose commands as trait
//! methods; whatever they observe (user edits, server messages) is handed
//! to [`EditorClient`](super::EditorClient) as an event value.

use crate::error::Result;
use crate::ClientID;
use crate::ot::{Cursor, TextOperation, WrappedOperation};
use serde::{Deserialize, Serialize};

/// Snapshot attached to an adapter error
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorState {
    /// Operation being processed, in its JSON form
    pub operation: String,

    /// Document text at the time of the failure
    pub document: String,
}

/// Server side of the session
pub trait DatabaseAdapter {
    /// Submit a local operation as the next revision
    fn send_operation(&mut self, operation: &TextOperation) -> Result<()>;

    /// Publish the local cursor; `None` hides it from other users
    fn send_cursor(&mut self, cursor: Option<&Cursor>) -> Result<()>;

    fn is_history_empty(&self) -> bool;

    /// Whether `client_id` is the user this adapter runs as
    fn is_current_user(&self, client_id: &str) -> bool;
}

/// Editor widget showing the document
pub trait EditorAdapter {
    /// Apply a remote (or undo/redo) operation without reporting it back
    /// as a local change
    fn apply_operation(&mut self, operation: &TextOperation) -> Result<()>;

    fn get_cursor(&self) -> Option<Cursor>;

    fn set_cursor(&mut self, cursor: Cursor);

    /// Draw another user's cursor or selection
    fn set_other_cursor(
        &mut self,
        client_id: &str,
        cursor: &Cursor,
        color: Option<&str>,
        name: Option<&str>,
    ) -> Result<()>;

    /// Remove what [`set_other_cursor`](Self::set_other_cursor) drew
    fn dispose_cursor(&mut self, client_id: &str);

    fn get_text(&self) -> String;

    fn set_text(&mut self, text: &str);

    /// Enable change reporting once the initial revision is loaded
    fn set_initiated(&mut self, initiated: bool);

    /// Inverse of `operation` against the current content
    fn invert_operation(&self, operation: &WrappedOperation) -> Result<WrappedOperation> {
        operation.invert(&self.get_text())
    }
}

/// Notifications from the editor widget
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// The user edited the document; `inverse` reverts `operation`
    Change {
        operation: TextOperation,
        inverse: TextOperation,
    },
    CursorActivity,
    Blur,
    Focus,
    Undo,
    Redo,
    Error {
        error: String,
        operation: String,
        state: ErrorState,
    },
}

/// Notifications from the database transport
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseEvent {
    /// The outstanding operation was committed
    Acknowledge,

    /// Another client's operation, in revision order
    Operation(TextOperation),

    /// The outstanding operation was rejected and should be resent
    Retry,

    /// The stored history has been replayed into the editor
    InitialRevision,

    /// A user's cursor moved; `None` means it left
    CursorChange {
        client_id: ClientID,
        cursor: Option<Cursor>,
        color: Option<String>,
        name: Option<String>,
    },

    Error {
        error: String,
        operation: String,
        state: ErrorState,
    },

    Ready,
}
