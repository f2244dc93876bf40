//! Target-process memory address type.

use std::fmt;
use std::ops::Add;

/// Strongly typed address in the *target* process
///
/// This wrapper around `u64` keeps target addresses from mixing with the
/// sizes, counts and type ids that flow through the decoder alongside them.
/// An `Address` is only meaningful inside the debug session it was read
/// from; it never points into our own address space.
///
/// ## Example
///
/// ```rust
/// use burrow_core::types::Address;
///
/// let base = Address::new(0x1000);
/// let field = base.offset(0x18);
/// assert_eq!(field.value(), 0x1018);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// In the target runtime this is the representation of nil pointers,
    /// nil maps and nil channels, so it shows up as a *valid* decoded
    /// payload rather than an error.
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Compute the address of a field or element at a byte offset
    ///
    /// Offsets come from debug info supplied by the target, so arithmetic
    /// wraps rather than panicking; an absurd result will surface as an
    /// unmapped-address read failure instead of a crash.
    pub const fn offset(self, bytes: u64) -> Self
    {
        Address(self.0.wrapping_add(bytes))
    }

    /// Add an offset to this address, checking for overflow
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        self.offset(rhs)
    }
}
