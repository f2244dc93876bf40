//! # Types
//!
//! Session-level data types shared across the decoder.
//!
//! These describe the *target* process: where a value lives ([`Address`])
//! and what shape it has ([`TypeDescriptor`]). Both are inputs the decoder
//! consumes; neither owns any target-process memory.

pub mod address;
pub mod descriptor;

// Re-export all public types
pub use address::Address;
pub use descriptor::{FieldDef, StructLayout, TypeDescriptor, TypeId, TypeKind, TypeTable};
