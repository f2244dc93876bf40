//! # Architecture Decoder
//!
//! Pure byte-to-number conversion for the target platform.
//!
//! A debug session fixes one byte order and one pointer width up front;
//! every scalar the decoder pulls out of target memory goes through this
//! module. There is no I/O here and no failure mode: callers supply buffers
//! of exactly the width the type declared (the decoder validates declared
//! sizes before reading).

/// Byte order of the target process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder
{
    /// Least-significant byte first (x86-64, aarch64, riscv64)
    Little,
    /// Most-significant byte first
    Big,
}

/// Fixed decode rules for one target platform
///
/// Holds the two facts about the target that scalar decoding depends on:
/// byte order and pointer width. One `Architecture` is chosen when a debug
/// session opens and shared by every decode call in that session.
///
/// ## Example
///
/// ```rust
/// use burrow_core::arch::Architecture;
///
/// let arch = Architecture::amd64();
/// assert_eq!(arch.uint_n(&[0x34, 0x12]), 0x1234);
/// assert_eq!(arch.int_n(&[0xff]), -1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Architecture
{
    byte_order: ByteOrder,
    pointer_size: u64,
}

impl Architecture
{
    /// Describe a target by byte order and pointer width in bytes
    pub const fn new(byte_order: ByteOrder, pointer_size: u64) -> Self
    {
        Architecture {
            byte_order,
            pointer_size,
        }
    }

    /// 64-bit x86: little-endian, 8-byte pointers
    pub const fn amd64() -> Self
    {
        Self::new(ByteOrder::Little, 8)
    }

    /// 64-bit ARM: little-endian, 8-byte pointers
    pub const fn arm64() -> Self
    {
        Self::new(ByteOrder::Little, 8)
    }

    /// 32-bit x86: little-endian, 4-byte pointers
    pub const fn i386() -> Self
    {
        Self::new(ByteOrder::Little, 4)
    }

    /// The target's byte order
    pub const fn byte_order(self) -> ByteOrder
    {
        self.byte_order
    }

    /// The target's pointer width in bytes
    pub const fn pointer_size(self) -> u64
    {
        self.pointer_size
    }

    /// Decode an unsigned integer of `buf.len()` bytes, zero-extended to 64 bits
    pub fn uint_n(self, buf: &[u8]) -> u64
    {
        match self.byte_order {
            ByteOrder::Little => buf.iter().rev().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
            ByteOrder::Big => buf.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)),
        }
    }

    /// Decode a two's-complement signed integer of `buf.len()` bytes,
    /// sign-extended to 64 bits
    pub fn int_n(self, buf: &[u8]) -> i64
    {
        let raw = self.uint_n(buf);
        let bits = buf.len() * 8;
        if bits >= 64 {
            raw as i64
        } else {
            // Shift the value's sign bit up to bit 63, then arithmetic-shift back.
            let shift = 64 - bits as u32;
            ((raw << shift) as i64) >> shift
        }
    }

    /// Decode a 32-bit IEEE-754 float from a 4-byte buffer
    pub fn float32(self, buf: &[u8]) -> f32
    {
        f32::from_bits(self.uint_n(buf) as u32)
    }

    /// Decode a 64-bit IEEE-754 float from an 8-byte buffer
    pub fn float64(self, buf: &[u8]) -> f64
    {
        f64::from_bits(self.uint_n(buf))
    }

    /// Decode a 64-bit complex number (two 32-bit floats) from an 8-byte buffer
    pub fn complex64(self, buf: &[u8]) -> (f32, f32)
    {
        let (re, im) = buf.split_at(buf.len() / 2);
        (self.float32(re), self.float32(im))
    }

    /// Decode a 128-bit complex number (two 64-bit floats) from a 16-byte buffer
    pub fn complex128(self, buf: &[u8]) -> (f64, f64)
    {
        let (re, im) = buf.split_at(buf.len() / 2);
        (self.float64(re), self.float64(im))
    }

    /// Decode a pointer-width unsigned value as a raw address
    pub fn uintptr(self, buf: &[u8]) -> u64
    {
        self.uint_n(buf)
    }
}
