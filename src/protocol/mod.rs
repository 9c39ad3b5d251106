//! Wire format for operations
//!
//! Operations travel (and are stored) as flat JSON arrays:
//!
//! - positive integer: retain that many chars
//! - negative integer: delete that many chars
//! - string: insert it
//! - object: attributes of the retain or insert that follows
//!
//! The empty operation is written as `[0]` so that stores which drop empty
//! arrays still keep the entry.

pub mod serialize;

pub use serialize::{decode_message, decode_operation, encode_message, encode_operation};
