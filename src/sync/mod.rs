//! Client-side synchronization with the central server
//!
//! The [`Client`] pairs local edits with server acknowledgements. At most one
//! operation is in flight at a time; edits made meanwhile are composed into
//! a single buffered operation.

pub mod client;

pub use client::{Client, ClientEvent, ClientState};
