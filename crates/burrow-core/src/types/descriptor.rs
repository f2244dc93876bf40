//! # Type Descriptors
//!
//! The immutable description of a value's memory shape, supplied once per
//! debug session by an external debug-information reader.
//!
//! Descriptors form a graph, not a tree: Go programs routinely declare
//! cyclic types (`type Node struct { next *Node }`), so a descriptor names
//! its children by [`TypeId`] and the whole graph lives in a [`TypeTable`]
//! that the decoder resolves through. A `TypeId` doubles as the stable
//! identifier the decoder embeds in composite values so callers can expand
//! nested structure lazily with further decode calls.

use std::collections::HashMap;
use std::fmt;

use crate::error::{DecodeError, Result};

/// Stable identifier of a type within one debug session
///
/// Debug-information readers typically use the type's offset inside the
/// debug section, which is unique per binary; the decoder only requires
/// that ids are unique within a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u64);

impl fmt::Display for TypeId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "type@0x{:x}", self.0)
    }
}

/// One field of a struct-shaped type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef
{
    /// Declared field name, exactly as the debug info spells it
    pub name: String,
    /// Type of the field's contents
    pub type_id: TypeId,
    /// Byte offset of the field from the start of the struct
    pub byte_offset: u64,
}

/// Ordered field list of a struct-shaped type
///
/// Order is declaration order; the decoder preserves it when producing
/// struct views and relies on exact name matches when locating
/// runtime-internal header fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructLayout
{
    /// Fields in declaration order
    pub fields: Vec<FieldDef>,
}

impl StructLayout
{
    /// Build a layout from a field list
    pub fn new(fields: Vec<FieldDef>) -> Self
    {
        StructLayout { fields }
    }

    /// Find a field by exact name
    pub fn field(&self, name: &str) -> Option<&FieldDef>
    {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The closed set of type shapes the decoder understands
///
/// This mirrors the variants the debug-information reader can produce for a
/// Go binary. The set is sealed on purpose: the decoder dispatches with an
/// exhaustive `match`, so adding a variant here forces a compile-time
/// decision in the decoder rather than a silent fall-through.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeKind
{
    /// Two's-complement signed integer (sizes 1, 2, 4, 8)
    Int,
    /// Unsigned integer (sizes 1, 2, 4, 8)
    Uint,
    /// `uintptr`-style address-sized unsigned integer
    Addr,
    /// Boolean; any nonzero byte reads as true
    Bool,
    /// IEEE-754 float (sizes 4, 8)
    Float,
    /// Complex number, two adjacent floats of half the total width (sizes 8, 16)
    Complex,
    /// Typed pointer; decoding yields the pointee's id without dereferencing
    Pointer
    {
        /// Type the pointer points at
        pointee: TypeId,
    },
    /// Growable array: a header struct of backing pointer, length, capacity
    Slice
    {
        /// Layout of the slice header the value's address points at
        header: StructLayout,
        /// Element type
        elem: TypeId,
    },
    /// Fixed-size array; storage starts at the value's own address
    Array
    {
        /// Element type
        elem: TypeId,
        /// Static element count
        count: u64,
        /// Distance between consecutive elements, in bits
        stride_bits: u64,
    },
    /// Plain struct
    Struct(StructLayout),
    /// Transparent alias for another type
    Typedef
    {
        /// The aliased type
        target: TypeId,
    },
    /// Hash map; the value is a pointer to a runtime-internal table header
    Map
    {
        /// Struct type of the table header the map pointer leads to
        header: TypeId,
    },
    /// String descriptor: a header struct of data pointer and length
    String
    {
        /// Layout of the string header the value's address points at
        header: StructLayout,
    },
    /// Channel; the value is a pointer to a runtime-internal ring-buffer header
    Channel
    {
        /// Struct type of the channel header the channel pointer leads to
        header: TypeId,
        /// Element type
        elem: TypeId,
    },
    /// Function value; decodes to its code address only
    Func,
    /// Interface value; decoding the dynamic type and payload is a
    /// documented limitation
    Interface,
    /// Anything the reader could not classify; always fails to decode
    Other
    {
        /// The reader's name for the unclassified type, used in errors
        name: String,
    },
}

impl TypeKind
{
    /// Short human-readable name of the variant, for errors and logs
    pub fn name(&self) -> &str
    {
        match self {
            TypeKind::Int => "int",
            TypeKind::Uint => "uint",
            TypeKind::Addr => "addr",
            TypeKind::Bool => "bool",
            TypeKind::Float => "float",
            TypeKind::Complex => "complex",
            TypeKind::Pointer { .. } => "pointer",
            TypeKind::Slice { .. } => "slice",
            TypeKind::Array { .. } => "array",
            TypeKind::Struct(_) => "struct",
            TypeKind::Typedef { .. } => "typedef",
            TypeKind::Map { .. } => "map",
            TypeKind::String { .. } => "string",
            TypeKind::Channel { .. } => "channel",
            TypeKind::Func => "func",
            TypeKind::Interface => "interface",
            TypeKind::Other { name } => name,
        }
    }
}

/// One type in the session's type graph
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor
{
    /// This type's own id
    pub id: TypeId,
    /// Total size of a value of this type, in bytes
    ///
    /// Basic types carry their numeric width here; pointers carry the
    /// target's pointer width; composites carry their header or storage
    /// size. The decoder validates the size against the variant's legal
    /// set before reading.
    pub byte_size: u64,
    /// The shape
    pub kind: TypeKind,
}

/// Immutable per-session collection of type descriptors
///
/// Built once by the debug-information reader when a session opens, then
/// shared read-only with every decoder. Lookups of ids the reader never
/// inserted fail with [`DecodeError::UnknownType`].
#[derive(Debug, Default)]
pub struct TypeTable
{
    types: HashMap<TypeId, TypeDescriptor>,
}

impl TypeTable
{
    /// Create an empty table
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Insert a descriptor, returning its id
    ///
    /// Re-inserting an id replaces the previous descriptor; readers are
    /// expected to assign unique ids.
    pub fn insert(&mut self, descriptor: TypeDescriptor) -> TypeId
    {
        let id = descriptor.id;
        self.types.insert(id, descriptor);
        id
    }

    /// Resolve an id to its descriptor
    pub fn lookup(&self, id: TypeId) -> Result<&TypeDescriptor>
    {
        self.types.get(&id).ok_or(DecodeError::UnknownType(id))
    }

    /// Number of types in the table
    pub fn len(&self) -> usize
    {
        self.types.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool
    {
        self.types.is_empty()
    }
}
