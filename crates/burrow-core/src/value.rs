//! # Value Model
//!
//! The tagged result type one decode call produces.
//!
//! Scalars carry their payload at the exact declared width (an 8-bit
//! integer decodes to [`Value::Int8`], never a promoted wider case).
//! Composites are *views*: an address plus the metadata needed to expand
//! them with further decode calls. No composite deep-copies target memory,
//! which keeps every decode call O(header size) no matter how large or
//! self-referential the target structure is.
//!
//! A `Value` is only as valid as the memory snapshot it was read from. It
//! owns none of the target's memory; once the target resumes or the session
//! ends, embedded addresses are stale.

use std::borrow::Cow;
use std::fmt;

use crate::types::{Address, TypeId};

/// A typed pointer read out of the target
///
/// Carries the pointee's type id and the raw address; the pointee is *not*
/// dereferenced. Callers expand it with a fresh decode call at `address`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerValue
{
    /// Type of the value this pointer leads to
    pub type_id: TypeId,
    /// Raw target address; zero for a nil pointer
    pub address: Address,
}

impl PointerValue
{
    /// Whether this is a nil pointer (a valid value, not an error)
    pub fn is_nil(&self) -> bool
    {
        self.address.is_null()
    }
}

/// View of contiguous element storage
///
/// Produced for fixed arrays and embedded in [`SliceValue`] for slices.
/// `address` is the first element's location; elements are not decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayValue
{
    /// Element type
    pub elem_type: TypeId,
    /// Address of element 0
    pub address: Address,
    /// Number of elements
    pub length: u64,
    /// Distance between consecutive elements, in bits (always a multiple of 8)
    pub stride_bits: u64,
}

impl ArrayValue
{
    /// Address of element `index`, or `None` past the end
    ///
    /// This is the lazy-expansion hook: decode the element type at the
    /// returned address to materialize one element.
    pub fn element_address(&self, index: u64) -> Option<Address>
    {
        if index >= self.length {
            return None;
        }
        (self.stride_bits / 8)
            .checked_mul(index)
            .and_then(|offset| self.address.checked_add(offset))
    }
}

/// View of a slice: element storage plus capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceValue
{
    /// The backing storage view (pointer, length, stride)
    pub array: ArrayValue,
    /// Declared capacity; always >= `array.length`
    pub capacity: u64,
}

/// One field of a struct view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField
{
    /// Declared field name
    pub name: String,
    /// Type of the field's contents
    pub type_id: TypeId,
    /// Absolute address of the field in the target
    pub address: Address,
}

/// View of a struct: named field locations, contents not decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructValue
{
    /// Fields in declaration order
    pub fields: Vec<StructField>,
}

impl StructValue
{
    /// Find a field view by name
    pub fn field(&self, name: &str) -> Option<&StructField>
    {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// View of a map: location and element count only
///
/// Entry enumeration is a separate, heavier capability; the decoder
/// deliberately stops at the count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapValue
{
    /// The map's own type id
    pub type_id: TypeId,
    /// Address of the map variable (not of the table header it points at)
    pub address: Address,
    /// Number of entries; 0 for a nil map
    pub length: u64,
}

/// A string: full declared length plus a bounded preview of the contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValue
{
    /// Byte length the header declares, reported in full
    pub length: u64,
    /// At most [`crate::layout::MAX_STRING_PREVIEW`] bytes of the contents
    ///
    /// Kept as raw bytes: the target is free to store non-UTF-8 data in a
    /// string. Use [`StringValue::preview_lossy`] for display.
    pub preview: Vec<u8>,
}

impl StringValue
{
    /// Whether the preview is shorter than the declared length
    pub fn truncated(&self) -> bool
    {
        (self.preview.len() as u64) < self.length
    }

    /// The preview as text, with invalid UTF-8 replaced
    pub fn preview_lossy(&self) -> Cow<'_, str>
    {
        String::from_utf8_lossy(&self.preview)
    }
}

/// View of a channel's ring buffer
///
/// All fields are zero for a nil channel except `elem_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelValue
{
    /// Element type
    pub elem_type: TypeId,
    /// Address of the runtime's channel header; zero for a nil channel
    pub address: Address,
    /// Address of the ring buffer's storage
    pub buffer: Address,
    /// Number of elements currently buffered
    pub length: u64,
    /// Buffer capacity; 0 for unbuffered channels
    pub capacity: u64,
    /// Element size in bytes
    pub stride: u64,
    /// Ring index the next receive will read from
    pub buffer_start: u64,
}

impl ChannelValue
{
    /// Whether this is a nil channel (a valid value, not an error)
    pub fn is_nil(&self) -> bool
    {
        self.address.is_null()
    }
}

/// A function value: its code address, captured state not inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuncValue
{
    /// Entry address; zero for a nil func
    pub address: Address,
}

/// The result of one decode call
///
/// Mirrors the type-descriptor variants one to one. Produced fresh per
/// call, never cached; composite cases hold views rather than contents.
#[derive(Debug, Clone, PartialEq)]
pub enum Value
{
    /// 8-bit signed integer
    Int8(i8),
    /// 16-bit signed integer
    Int16(i16),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 8-bit unsigned integer
    Uint8(u8),
    /// 16-bit unsigned integer
    Uint16(u16),
    /// 32-bit unsigned integer
    Uint32(u32),
    /// 64-bit unsigned integer
    Uint64(u64),
    /// Boolean
    Bool(bool),
    /// 32-bit float
    Float32(f32),
    /// 64-bit float
    Float64(f64),
    /// 64-bit complex number
    Complex64
    {
        /// Real part
        re: f32,
        /// Imaginary part
        im: f32,
    },
    /// 128-bit complex number
    Complex128
    {
        /// Real part
        re: f64,
        /// Imaginary part
        im: f64,
    },
    /// Typed pointer, not dereferenced
    Pointer(PointerValue),
    /// Fixed-array view
    Array(ArrayValue),
    /// Slice view
    Slice(SliceValue),
    /// Struct view
    Struct(StructValue),
    /// Map location and count
    Map(MapValue),
    /// String length and bounded preview
    String(StringValue),
    /// Channel ring-buffer view
    Channel(ChannelValue),
    /// Function value
    Func(FuncValue),
    /// Opaque interface marker; dynamic type and payload are not decoded
    Interface,
}

impl fmt::Display for Value
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Value::Int8(v) => write!(f, "{v}"),
            Value::Int16(v) => write!(f, "{v}"),
            Value::Int32(v) => write!(f, "{v}"),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Uint8(v) => write!(f, "{v}"),
            Value::Uint16(v) => write!(f, "{v}"),
            Value::Uint32(v) => write!(f, "{v}"),
            Value::Uint64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Float32(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Complex64 { re, im } => write!(f, "({re}+{im}i)"),
            Value::Complex128 { re, im } => write!(f, "({re}+{im}i)"),
            Value::Pointer(p) => {
                if p.is_nil() {
                    write!(f, "nil")
                } else {
                    write!(f, "{}", p.address)
                }
            }
            Value::Array(a) => write!(f, "[{} elements at {}]", a.length, a.address),
            Value::Slice(s) => write!(f, "[{}/{} elements at {}]", s.array.length, s.capacity, s.array.address),
            Value::Struct(s) => write!(f, "struct with {} fields", s.fields.len()),
            Value::Map(m) => {
                if m.length == 0 && m.address.is_null() {
                    write!(f, "map[nil]")
                } else {
                    write!(f, "map[{} entries]", m.length)
                }
            }
            Value::String(s) => {
                write!(f, "{:?}", s.preview_lossy())?;
                if s.truncated() {
                    write!(f, "... ({} bytes)", s.length)?;
                }
                Ok(())
            }
            Value::Channel(c) => {
                if c.is_nil() {
                    write!(f, "chan(nil)")
                } else {
                    write!(f, "chan({}/{} at {})", c.length, c.capacity, c.address)
                }
            }
            Value::Func(func) => {
                if func.address.is_null() {
                    write!(f, "func(nil)")
                } else {
                    write!(f, "func at {}", func.address)
                }
            }
            Value::Interface => write!(f, "interface"),
        }
    }
}
