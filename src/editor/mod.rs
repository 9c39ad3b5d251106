//! Glue between an editor widget, a database transport and the OT core
//!
//! [`EditorClient`] owns the protocol [`Client`](crate::sync::Client) and the
//! [`UndoManager`](crate::undo::UndoManager). The editor and database are
//! reached through the [`EditorAdapter`] and [`DatabaseAdapter`] traits;
//! their notifications are fed in as [`EditorEvent`] / [`DatabaseEvent`].

pub mod adapter;
pub mod editor_client;
pub mod emitter;
pub mod remote_client;
pub mod timer;

pub use adapter::{DatabaseAdapter, DatabaseEvent, EditorAdapter, EditorEvent, ErrorState};
pub use editor_client::{EditorClient, EditorClientEvent, EditorClientEventKind};
pub use emitter::{Event, EventEmitter, ListenerId};
pub use remote_client::{RemoteClient, RemoteClients};
pub use timer::Timer;
