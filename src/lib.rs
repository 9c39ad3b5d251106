//! OT Sync Core - collaborative text editing through Operational Transformation
//!
//! This is the Rust core of a real-time collaborative editor, compiled to
//! both native and WASM. It implements:
//! - The operation algebra (apply, compose, invert, transform) over text
//!   with per-span attributes
//! - Cursor transformation and cursor-carrying operation metadata
//! - The client synchronization state machine (outstanding + buffer)
//! - Undo/redo that stays valid under concurrent remote edits
//! - An editor client wiring editor and database adapters together
//!
//! # Examples
//!
//! ```rust
//! use ot_sync_core::{Client, ClientEvent, TextOperation};
//!
//! let mut client = Client::new();
//!
//! let mut local = TextOperation::new();
//! local.retain(5).insert(" ipsum");
//!
//! let event = client.apply_client(local.clone()).unwrap();
//! assert_eq!(event, Some(ClientEvent::SendOperation(local)));
//! assert!(client.is_awaiting_confirm());
//! ```

pub mod config;
pub mod editor;
pub mod error;
pub mod ot;
pub mod protocol;
pub mod sync;
pub mod undo;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use config::EditorClientConfig;
pub use editor::{DatabaseAdapter, DatabaseEvent, EditorAdapter, EditorClient, EditorClientEvent, EditorEvent};
pub use error::{Result, SyncError};
pub use ot::{Attributes, Cursor, OperationMeta, OperationMetadata, TextOp, TextOperation, WrappedOperation};
pub use sync::{Client, ClientEvent, ClientState};
pub use undo::UndoManager;

/// Remote user identifier type
pub type ClientID = String;
