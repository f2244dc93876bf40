//! # Error Types
//!
//! Error handling for value decoding.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::memory::PeekError;
use crate::types::TypeId;

/// Main error type for decode operations
///
/// This enum represents all the ways decoding a value out of a target
/// process can fail. Decoding either fully succeeds or returns one of these;
/// no partially-populated value ever accompanies an error.
///
/// ## Error Categories
///
/// 1. **Shape errors**: InvalidSize, Alignment, InconsistentSlice
/// 2. **Layout-mismatch errors**: FieldNotFound, UnsupportedFieldType
/// 3. **Coverage errors**: UnsupportedType, UnknownType
/// 4. **Transport errors**: ReadFailure
///
/// Callers should treat `FieldNotFound`/`UnsupportedFieldType` as a sign
/// that the debug info and the target's runtime version disagree about an
/// internal header layout, and surface it distinctly from ordinary read
/// failures.
#[derive(Error, Debug)]
pub enum DecodeError
{
    /// A basic type declared a byte size outside the legal set, or a
    /// pointer type's size doesn't match the target architecture
    ///
    /// Legal sizes are {1, 2, 4, 8} for integer-like types, {4, 8} for
    /// floats and {8, 16} for complex numbers. Anything else means the
    /// debug info is corrupt or describes a platform we don't decode.
    #[error("invalid {what} size: {size}")]
    InvalidSize
    {
        /// What kind of value declared the bad size (e.g. "integer", "pointer")
        what: &'static str,
        /// The declared byte size
        size: u64,
    },

    /// A read from the target process failed
    ///
    /// Wraps the underlying memory-port error. This happens when:
    /// - The address isn't mapped in the target
    /// - The target process has exited or is otherwise unavailable
    /// - The transport lacks permission to read the target
    #[error("reading target memory: {0}")]
    ReadFailure(#[from] PeekError),

    /// A runtime-internal header field was not found by name
    ///
    /// The decoder locates slice/string/channel/map header fields by their
    /// declared names (`len`, `cap`, `buf`, ...). A miss means the target
    /// runtime lays this header out differently than the active layout
    /// table expects.
    #[error("struct field {0:?} not found")]
    FieldNotFound(String),

    /// A header field exists but has the wrong kind of type
    ///
    /// For example a `len` field that is declared as a struct, or an
    /// `array` field that is not a pointer.
    #[error("struct field {name:?} has unsupported type (expected {expected})")]
    UnsupportedFieldType
    {
        /// Name of the offending field
        name: String,
        /// What the decoder needed the field to be
        expected: &'static str,
    },

    /// A slice header declared a capacity smaller than its length
    ///
    /// `cap >= len` is a Go runtime invariant; a violation means we read a
    /// torn or corrupt header and none of the three header fields can be
    /// trusted.
    #[error("slice's capacity {capacity} is less than its length {length}")]
    InconsistentSlice
    {
        /// Declared element count
        length: u64,
        /// Declared capacity
        capacity: u64,
    },

    /// An array type's stride is not a whole number of bytes
    ///
    /// Bit-packed arrays are not supported.
    #[error("array stride of {stride_bits} bits is not byte-aligned")]
    Alignment
    {
        /// The declared stride in bits
        stride_bits: u64,
    },

    /// The type descriptor has no decoding rule
    ///
    /// Names the variant so a layout mismatch can be diagnosed from logs.
    #[error("unsupported type {0}")]
    UnsupportedType(String),

    /// A type descriptor references a type id absent from the session's
    /// type table
    ///
    /// Descriptors name their children by id so that cyclic type graphs
    /// (`type T struct { next *T }`) can be represented. A dangling id means
    /// the debug-information reader handed us an incomplete table.
    #[error("type table has no entry for {0}")]
    UnknownType(TypeId),
}

/// Convenience type alias for `Result<T, DecodeError>`
///
/// ```rust
/// use burrow_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, DecodeError>;
