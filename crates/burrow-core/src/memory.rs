//! # Memory Access Port
//!
//! The seam between the decoder and whatever actually reads target memory.
//!
//! The decoder never talks to a transport directly. It reads through the
//! [`Peek`] trait, so the same decoding logic runs against a ptrace-style
//! local transport, a remote-protocol connection, or an in-memory test
//! double.
//!
//! ## Why use a trait?
//!
//! - Transport code is platform-specific; decoding is not
//! - Tests can substitute a deterministic in-memory image and count reads
//! - Sessions can layer caching under the decoder without it noticing

use thiserror::Error;

use crate::types::Address;

/// Failure reading target-process memory
///
/// These are the transport's failure kinds, as observed at the port. The
/// decoder wraps them in `DecodeError::ReadFailure` and never inspects
/// them further; callers can, to distinguish a dead target from a bad
/// address.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeekError
{
    /// The address range is not mapped in the target
    #[error("address {addr} is not mapped in the target (reading {count} bytes)")]
    Unmapped
    {
        /// Start of the failed read
        addr: Address,
        /// Requested length in bytes
        count: usize,
    },

    /// The target process has exited or is otherwise gone
    #[error("target process is unavailable")]
    ProcessUnavailable,

    /// The transport lacks permission to read the target
    #[error("permission denied reading target memory")]
    PermissionDenied,
}

/// Raw read access to a target process
///
/// `peek` fills the caller's buffer with `buf.len()` bytes starting at
/// `addr`, or fails without partially filling it. Implementations must be
/// safe to call from multiple threads if decoding runs concurrently; the
/// decoder itself holds no state between reads.
///
/// Reads may block on transport I/O. A target that mutates concurrently can
/// change between two reads of one decode call; the decoder makes no
/// atomicity assumption across reads.
pub trait Peek
{
    /// Read exactly `buf.len()` bytes of target memory at `addr`
    fn peek(&self, addr: Address, buf: &mut [u8]) -> Result<(), PeekError>;
}

impl<T: Peek + ?Sized> Peek for &T
{
    fn peek(&self, addr: Address, buf: &mut [u8]) -> Result<(), PeekError>
    {
        (**self).peek(addr, buf)
    }
}
