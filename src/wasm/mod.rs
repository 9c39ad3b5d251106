//! WASM bindings for the OT core
//!
//! This module provides JavaScript-friendly bindings for the operation
//! algebra, cursors and the client state machine. Operations cross the
//! boundary in their JSON string form.

#[cfg(feature = "wasm")]
pub mod bindings;

#[cfg(feature = "wasm")]
pub mod utils;

// Re-export main types
#[cfg(feature = "wasm")]
pub use bindings::{WasmClient, WasmCursor, WasmTextOperation};
