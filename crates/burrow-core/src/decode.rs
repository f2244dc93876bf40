//! # Value Decoder
//!
//! The central dispatcher: given a type id and an address, reconstruct the
//! typed value stored there.
//!
//! [`Decoder::decode`] matches exhaustively over [`TypeKind`], so every
//! variant the descriptor model can express has a decoding rule (or an
//! explicit refusal) chosen at compile time. Scalars are read at their
//! declared width and never promoted; composites come back as views that
//! callers expand with further decode calls.
//!
//! Decoding is synchronous and stateless. A `Decoder` is a bundle of shared
//! references (architecture, type table, layout table, memory port) and can
//! be used from multiple threads as long as the memory port tolerates
//! concurrent reads. Composite headers are assembled from multiple
//! non-atomic reads, so a target mutating concurrently can produce a torn
//! view; that is an accepted property of observing a live process, not a
//! decoder bug.

use smallvec::{smallvec, SmallVec};
use tracing::{trace, warn};

use crate::arch::Architecture;
use crate::error::{DecodeError, Result};
use crate::layout::{RuntimeLayout, MAX_STRING_PREVIEW};
use crate::memory::Peek;
use crate::types::{Address, StructLayout, TypeDescriptor, TypeId, TypeKind, TypeTable};
use crate::value::{
    ArrayValue, ChannelValue, FuncValue, MapValue, PointerValue, SliceValue, StringValue, StructField, StructValue,
    Value,
};

/// Longest alias chain the decoder will chase
///
/// Real debug info nests typedefs a handful of levels deep; a chain longer
/// than this is cyclic or hostile, and chasing it further would recurse
/// forever.
const MAX_ALIAS_CHAIN: usize = 64;

/// Decodes values out of one target process
///
/// Bundles the session's fixed inputs: the target [`Architecture`], the
/// immutable [`TypeTable`] built by the debug-information reader, the
/// [`RuntimeLayout`] describing the target runtime's internal headers, and
/// the memory port. Construction is cheap; a decoder borrows everything it
/// uses and holds no mutable state.
///
/// ## Example
///
/// ```rust,no_run
/// use burrow_core::arch::Architecture;
/// use burrow_core::decode::Decoder;
/// use burrow_core::memory::{Peek, PeekError};
/// use burrow_core::types::{Address, TypeId, TypeTable};
/// # struct Transport;
/// # impl Peek for Transport {
/// #     fn peek(&self, _addr: Address, buf: &mut [u8]) -> Result<(), PeekError>
/// #     {
/// #         buf.fill(0);
/// #         Ok(())
/// #     }
/// # }
///
/// // The debug-information reader builds the table; the transport reads
/// // the target.
/// let types: TypeTable = TypeTable::new();
/// let memory = Transport;
/// let decoder = Decoder::new(Architecture::amd64(), &types, &memory);
/// let value = decoder.decode(TypeId(0x2a), Address::new(0xc000_0100_00))?;
/// println!("{value}");
/// # Ok::<(), burrow_core::error::DecodeError>(())
/// ```
pub struct Decoder<'a, M: Peek>
{
    arch: Architecture,
    types: &'a TypeTable,
    layout: &'static RuntimeLayout,
    memory: &'a M,
}

impl<'a, M: Peek> Decoder<'a, M>
{
    /// Create a decoder with the default (Go 1.x) runtime layout
    pub fn new(arch: Architecture, types: &'a TypeTable, memory: &'a M) -> Self
    {
        Self::with_layout(arch, types, memory, RuntimeLayout::go1())
    }

    /// Create a decoder for a specific runtime layout
    pub fn with_layout(arch: Architecture, types: &'a TypeTable, memory: &'a M, layout: &'static RuntimeLayout)
        -> Self
    {
        Decoder {
            arch,
            types,
            layout,
            memory,
        }
    }

    /// The session's architecture
    pub fn arch(&self) -> Architecture
    {
        self.arch
    }

    /// The active runtime layout
    pub fn layout(&self) -> &'static RuntimeLayout
    {
        self.layout
    }

    pub(crate) fn types(&self) -> &'a TypeTable
    {
        self.types
    }

    pub(crate) fn memory(&self) -> &'a M
    {
        self.memory
    }

    /// Decode the value of type `id` stored at `addr`
    ///
    /// Either fully succeeds or returns an error; no partially-populated
    /// value ever accompanies an error. Nil pointers, nil maps and nil
    /// channels are valid results.
    ///
    /// ## Errors
    ///
    /// - `UnknownType`: `id` (or a child id) is absent from the type table
    /// - `InvalidSize` / `Alignment` / `InconsistentSlice`: the descriptor
    ///   or the target's header data is malformed
    /// - `FieldNotFound` / `UnsupportedFieldType`: the debug info disagrees
    ///   with the active runtime layout (likely a version mismatch)
    /// - `ReadFailure`: the memory port could not read the target
    /// - `UnsupportedType`: the variant has no decoding rule
    pub fn decode(&self, id: TypeId, addr: Address) -> Result<Value>
    {
        let mut ty = self.types.lookup(id)?;

        // Aliases are pure name transparency: chase them up front, with a
        // cap so a cyclic chain in hostile debug info fails instead of
        // recursing forever.
        let mut hops = 0usize;
        while let TypeKind::Typedef { target } = &ty.kind {
            hops += 1;
            if hops > MAX_ALIAS_CHAIN {
                return Err(DecodeError::UnsupportedType(format!(
                    "alias chain at {id} exceeds {MAX_ALIAS_CHAIN} links"
                )));
            }
            ty = self.types.lookup(*target)?;
        }

        trace!(kind = ty.kind.name(), %addr, "decode");
        self.decode_resolved(ty, addr)
    }

    /// Dispatch on a descriptor whose aliases have already been resolved
    fn decode_resolved(&self, ty: &TypeDescriptor, addr: Address) -> Result<Value>
    {
        match &ty.kind {
            TypeKind::Int => {
                let buf = self.read_basic(addr, ty.byte_size)?;
                let x = self.arch.int_n(&buf);
                match ty.byte_size {
                    1 => Ok(Value::Int8(x as i8)),
                    2 => Ok(Value::Int16(x as i16)),
                    4 => Ok(Value::Int32(x as i32)),
                    8 => Ok(Value::Int64(x)),
                    size => Err(DecodeError::InvalidSize { what: "integer", size }),
                }
            }
            TypeKind::Uint | TypeKind::Addr => {
                let buf = self.read_basic(addr, ty.byte_size)?;
                let x = self.arch.uint_n(&buf);
                match ty.byte_size {
                    1 => Ok(Value::Uint8(x as u8)),
                    2 => Ok(Value::Uint16(x as u16)),
                    4 => Ok(Value::Uint32(x as u32)),
                    8 => Ok(Value::Uint64(x)),
                    size => Err(DecodeError::InvalidSize {
                        what: "unsigned integer",
                        size,
                    }),
                }
            }
            TypeKind::Bool => {
                if !matches!(ty.byte_size, 1 | 2 | 4 | 8) {
                    return Err(DecodeError::InvalidSize {
                        what: "boolean",
                        size: ty.byte_size,
                    });
                }
                let buf = self.read_basic(addr, ty.byte_size)?;
                Ok(Value::Bool(buf.iter().any(|&b| b != 0)))
            }
            TypeKind::Float => {
                let buf = self.read_basic(addr, ty.byte_size)?;
                match ty.byte_size {
                    4 => Ok(Value::Float32(self.arch.float32(&buf))),
                    8 => Ok(Value::Float64(self.arch.float64(&buf))),
                    size => Err(DecodeError::InvalidSize { what: "float", size }),
                }
            }
            TypeKind::Complex => {
                let buf = self.read_basic(addr, ty.byte_size)?;
                match ty.byte_size {
                    8 => {
                        let (re, im) = self.arch.complex64(&buf);
                        Ok(Value::Complex64 { re, im })
                    }
                    16 => {
                        let (re, im) = self.arch.complex128(&buf);
                        Ok(Value::Complex128 { re, im })
                    }
                    size => Err(DecodeError::InvalidSize { what: "complex", size }),
                }
            }
            TypeKind::Pointer { pointee } => {
                if ty.byte_size != self.arch.pointer_size() {
                    return Err(DecodeError::InvalidSize {
                        what: "pointer",
                        size: ty.byte_size,
                    });
                }
                let address = self.peek_ptr(addr)?;
                Ok(Value::Pointer(PointerValue {
                    type_id: *pointee,
                    address,
                }))
            }
            TypeKind::Slice { header, elem } => self.decode_slice(header, *elem, addr),
            TypeKind::Array {
                elem,
                count,
                stride_bits,
            } => {
                if stride_bits % 8 != 0 {
                    return Err(DecodeError::Alignment {
                        stride_bits: *stride_bits,
                    });
                }
                Ok(Value::Array(ArrayValue {
                    elem_type: *elem,
                    address: addr,
                    length: *count,
                    stride_bits: *stride_bits,
                }))
            }
            TypeKind::Struct(layout) => {
                let fields = layout
                    .fields
                    .iter()
                    .map(|field| StructField {
                        name: field.name.clone(),
                        type_id: field.type_id,
                        address: addr.offset(field.byte_offset),
                    })
                    .collect();
                Ok(Value::Struct(StructValue { fields }))
            }
            // Alias chains are resolved before dispatch; a typedef here is
            // unreachable but the match stays exhaustive by construction.
            TypeKind::Typedef { target } => self.decode(*target, addr),
            TypeKind::Map { .. } => {
                let length = self.map_count(ty, addr)?;
                Ok(Value::Map(MapValue {
                    type_id: ty.id,
                    address: addr,
                    length,
                }))
            }
            TypeKind::String { header } => self.decode_string(header, addr),
            TypeKind::Channel { header, elem } => self.decode_channel(*header, *elem, addr),
            TypeKind::Func => {
                let address = self.peek_ptr(addr)?;
                Ok(Value::Func(FuncValue { address }))
            }
            TypeKind::Interface => Ok(Value::Interface),
            TypeKind::Other { name } => Err(DecodeError::UnsupportedType(name.clone())),
        }
    }

    fn decode_slice(&self, header: &StructLayout, elem: TypeId, addr: Address) -> Result<Value>
    {
        let data = self.read_pointer_field(header, addr, self.layout.slice.data)?;
        let length = self.read_integer_field(header, addr, self.layout.slice.len)?;
        let capacity = self.read_integer_field(header, addr, self.layout.slice.cap)?;
        if capacity < length {
            warn!(length, capacity, %addr, "slice header inconsistent");
            return Err(DecodeError::InconsistentSlice { length, capacity });
        }

        let elem_size = self.types.lookup(elem)?.byte_size;
        Ok(Value::Slice(SliceValue {
            array: ArrayValue {
                elem_type: elem,
                address: data,
                length,
                stride_bits: elem_size * 8,
            },
            capacity,
        }))
    }

    fn decode_string(&self, header: &StructLayout, addr: Address) -> Result<Value>
    {
        let data = self.read_pointer_field(header, addr, self.layout.string.data)?;
        let length = self.read_integer_field(header, addr, self.layout.string.len)?;

        let preview_len = length.min(MAX_STRING_PREVIEW as u64) as usize;
        let mut preview = vec![0u8; preview_len];
        if preview_len > 0 {
            self.memory.peek(data, &mut preview)?;
        }
        Ok(Value::String(StringValue { length, preview }))
    }

    fn decode_channel(&self, header: TypeId, elem: TypeId, addr: Address) -> Result<Value>
    {
        let header_layout = self.struct_layout(header, "channel header")?;

        let header_addr = self.peek_ptr(addr)?;
        if header_addr.is_null() {
            // Nil channel: there is no header struct to read, and trying
            // would fault. This is a valid value.
            return Ok(Value::Channel(ChannelValue {
                elem_type: elem,
                address: Address::ZERO,
                buffer: Address::ZERO,
                length: 0,
                capacity: 0,
                stride: 0,
                buffer_start: 0,
            }));
        }

        let buffer = self.read_pointer_field(header_layout, header_addr, self.layout.chan.buf)?;
        let length = self.read_integer_field(header_layout, header_addr, self.layout.chan.qcount)?;
        let capacity = self.read_integer_field(header_layout, header_addr, self.layout.chan.dataqsiz)?;
        let buffer_start = self.read_integer_field(header_layout, header_addr, self.layout.chan.recvx)?;
        let stride = self.types.lookup(elem)?.byte_size;

        Ok(Value::Channel(ChannelValue {
            elem_type: elem,
            address: header_addr,
            buffer,
            length,
            capacity,
            stride,
            buffer_start,
        }))
    }

    /// Read the raw bytes of a basic value of `size` bytes at `addr`
    ///
    /// Sizes outside {1, 2, 4, 8, 16} are refused before touching the
    /// target (16 exists only for complex numbers).
    pub(crate) fn read_basic(&self, addr: Address, size: u64) -> Result<SmallVec<[u8; 16]>>
    {
        if !matches!(size, 1 | 2 | 4 | 8 | 16) {
            return Err(DecodeError::InvalidSize {
                what: "basic value",
                size,
            });
        }
        let mut buf: SmallVec<[u8; 16]> = smallvec![0u8; size as usize];
        self.memory.peek(addr, &mut buf)?;
        Ok(buf)
    }

    /// Read a pointer-width value at `addr` as a target address
    pub(crate) fn peek_ptr(&self, addr: Address) -> Result<Address>
    {
        let mut buf: SmallVec<[u8; 16]> = smallvec![0u8; self.arch.pointer_size() as usize];
        self.memory.peek(addr, &mut buf)?;
        Ok(Address::new(self.arch.uintptr(&buf)))
    }

    /// Resolve `id` and require it to be struct-shaped
    pub(crate) fn struct_layout(&self, id: TypeId, what: &'static str) -> Result<&'a StructLayout>
    {
        match &self.types.lookup(id)?.kind {
            TypeKind::Struct(layout) => Ok(layout),
            other => Err(DecodeError::UnsupportedType(format!(
                "{what} is a {}, not a struct",
                other.name()
            ))),
        }
    }
}
