//! Operational Transformation algebra
//!
//! This module contains the edit description types shared by every replica
//! of a collaboratively edited text document.
//!
//! # Types
//!
//! - **TextOp:** a single retain / insert / delete step
//! - **TextOperation:** an atomic edit; apply, invert, compose, transform
//! - **Cursor:** caret/selection that is moved through operations
//! - **OperationMeta:** cursor state before and after an operation
//! - **WrappedOperation:** operation + metadata transformed in lockstep
//!
//! # Properties
//!
//! - **Convergence:** for concurrent `a`, `b`, `a ∘ b'` equals `b ∘ a'`
//! - **Sequential equivalence:** `apply(s, a ∘ b) = apply(apply(s, a), b)`
//! - **Invertibility:** `apply(apply(s, a), invert(a, s)) = s`
//!
//! # References
//!
//! - "Concurrency Control in Groupware Systems" (Ellis & Gibbs)
//! - "High-latency, low-bandwidth windowing in the Jupiter collaboration system"

pub mod cursor;
pub mod operation_meta;
pub mod text_op;
pub mod text_operation;
pub mod wrapped_operation;

pub use cursor::Cursor;
pub use operation_meta::{OperationMeta, OperationMetadata};
pub use text_op::{Attributes, TextOp};
pub use text_operation::TextOperation;
pub use wrapped_operation::WrappedOperation;
