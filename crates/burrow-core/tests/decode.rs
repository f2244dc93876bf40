//! Tests for the value decoder
//!
//! Target memory is simulated with a sparse byte map that counts reads, so
//! tests can assert not just what was decoded but how much of the target
//! was touched doing it.

use std::cell::Cell;
use std::collections::HashMap;

use burrow_core::arch::Architecture;
use burrow_core::decode::Decoder;
use burrow_core::error::DecodeError;
use burrow_core::memory::{Peek, PeekError};
use burrow_core::types::{Address, FieldDef, StructLayout, TypeDescriptor, TypeId, TypeKind, TypeTable};
use burrow_core::value::Value;

/// Sparse in-memory image of a fake target process
#[derive(Default)]
struct MockMemory
{
    bytes: HashMap<u64, u8>,
    reads: Cell<usize>,
}

impl MockMemory
{
    fn new() -> Self
    {
        Self::default()
    }

    fn write(&mut self, addr: u64, data: &[u8])
    {
        for (i, b) in data.iter().enumerate() {
            self.bytes.insert(addr + i as u64, *b);
        }
    }

    fn write_u64(&mut self, addr: u64, value: u64)
    {
        self.write(addr, &value.to_le_bytes());
    }

    fn reads(&self) -> usize
    {
        self.reads.get()
    }
}

impl Peek for MockMemory
{
    fn peek(&self, addr: Address, buf: &mut [u8]) -> Result<(), PeekError>
    {
        self.reads.set(self.reads.get() + 1);
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.bytes.get(&(addr.value() + i as u64)) {
                Some(b) => *slot = *b,
                None => {
                    return Err(PeekError::Unmapped {
                        addr,
                        count: buf.len(),
                    })
                }
            }
        }
        Ok(())
    }
}

// Well-known type ids used across tests
const INT8: TypeId = TypeId(1);
const INT16: TypeId = TypeId(2);
const INT32: TypeId = TypeId(3);
const INT64: TypeId = TypeId(4);
const UINT8: TypeId = TypeId(5);
const UINT16: TypeId = TypeId(6);
const UINT32: TypeId = TypeId(7);
const UINT64: TypeId = TypeId(8);
const BOOL: TypeId = TypeId(9);
const FLOAT32: TypeId = TypeId(10);
const FLOAT64: TypeId = TypeId(11);
const COMPLEX64: TypeId = TypeId(12);
const COMPLEX128: TypeId = TypeId(13);
const UINTPTR: TypeId = TypeId(14);

fn desc(id: TypeId, byte_size: u64, kind: TypeKind) -> TypeDescriptor
{
    TypeDescriptor { id, byte_size, kind }
}

fn field(name: &str, type_id: TypeId, byte_offset: u64) -> FieldDef
{
    FieldDef {
        name: name.to_string(),
        type_id,
        byte_offset,
    }
}

/// Table preloaded with the basic types every composite test leans on
fn basic_table() -> TypeTable
{
    let mut table = TypeTable::new();
    table.insert(desc(INT8, 1, TypeKind::Int));
    table.insert(desc(INT16, 2, TypeKind::Int));
    table.insert(desc(INT32, 4, TypeKind::Int));
    table.insert(desc(INT64, 8, TypeKind::Int));
    table.insert(desc(UINT8, 1, TypeKind::Uint));
    table.insert(desc(UINT16, 2, TypeKind::Uint));
    table.insert(desc(UINT32, 4, TypeKind::Uint));
    table.insert(desc(UINT64, 8, TypeKind::Uint));
    table.insert(desc(BOOL, 1, TypeKind::Bool));
    table.insert(desc(FLOAT32, 4, TypeKind::Float));
    table.insert(desc(FLOAT64, 8, TypeKind::Float));
    table.insert(desc(COMPLEX64, 8, TypeKind::Complex));
    table.insert(desc(COMPLEX128, 16, TypeKind::Complex));
    table.insert(desc(UINTPTR, 8, TypeKind::Addr));
    table
}

/// Go-shaped slice header: array pointer, then len and cap
fn slice_header(ptr_type: TypeId, int_type: TypeId) -> StructLayout
{
    StructLayout::new(vec![
        field("array", ptr_type, 0),
        field("len", int_type, 8),
        field("cap", int_type, 16),
    ])
}

const BASE: u64 = 0x1000;

#[test]
fn test_signed_int_width_preserved()
{
    let table = basic_table();
    let mut mem = MockMemory::new();
    mem.write(BASE, &(-5i8).to_le_bytes());
    mem.write(BASE + 0x10, &(-500i16).to_le_bytes());
    mem.write(BASE + 0x20, &(-70_000i32).to_le_bytes());
    mem.write(BASE + 0x30, &(-5_000_000_000i64).to_le_bytes());
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    assert_eq!(decoder.decode(INT8, Address::new(BASE)).unwrap(), Value::Int8(-5));
    assert_eq!(
        decoder.decode(INT16, Address::new(BASE + 0x10)).unwrap(),
        Value::Int16(-500)
    );
    assert_eq!(
        decoder.decode(INT32, Address::new(BASE + 0x20)).unwrap(),
        Value::Int32(-70_000)
    );
    assert_eq!(
        decoder.decode(INT64, Address::new(BASE + 0x30)).unwrap(),
        Value::Int64(-5_000_000_000)
    );
}

#[test]
fn test_unsigned_int_width_preserved()
{
    let table = basic_table();
    let mut mem = MockMemory::new();
    mem.write(BASE, &0xabu8.to_le_bytes());
    mem.write(BASE + 0x10, &0xabcdu16.to_le_bytes());
    mem.write(BASE + 0x20, &0xdead_beefu32.to_le_bytes());
    mem.write(BASE + 0x30, &0xdead_beef_cafe_f00du64.to_le_bytes());
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    assert_eq!(decoder.decode(UINT8, Address::new(BASE)).unwrap(), Value::Uint8(0xab));
    assert_eq!(
        decoder.decode(UINT16, Address::new(BASE + 0x10)).unwrap(),
        Value::Uint16(0xabcd)
    );
    assert_eq!(
        decoder.decode(UINT32, Address::new(BASE + 0x20)).unwrap(),
        Value::Uint32(0xdead_beef)
    );
    assert_eq!(
        decoder.decode(UINT64, Address::new(BASE + 0x30)).unwrap(),
        Value::Uint64(0xdead_beef_cafe_f00d)
    );
}

#[test]
fn test_addr_decodes_as_unsigned()
{
    let table = basic_table();
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x7fff_0000_1234);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    assert_eq!(
        decoder.decode(UINTPTR, Address::new(BASE)).unwrap(),
        Value::Uint64(0x7fff_0000_1234)
    );
}

#[test]
fn test_int_invalid_size()
{
    let mut table = basic_table();
    let odd = table.insert(desc(TypeId(100), 3, TypeKind::Int));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(odd, Address::new(BASE)).unwrap_err();
    assert!(matches!(err, DecodeError::InvalidSize { size: 3, .. }));
    // Refused before any read
    assert_eq!(mem.reads(), 0);
}

#[test]
fn test_bool_any_nonzero_byte()
{
    let mut table = basic_table();
    let bool4 = table.insert(desc(TypeId(101), 4, TypeKind::Bool));
    let mut mem = MockMemory::new();
    mem.write(BASE, &[0, 0, 0, 0]);
    mem.write(BASE + 0x10, &[0, 0, 1, 0]);
    mem.write(BASE + 0x20, &[1]);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    assert_eq!(decoder.decode(bool4, Address::new(BASE)).unwrap(), Value::Bool(false));
    assert_eq!(
        decoder.decode(bool4, Address::new(BASE + 0x10)).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(decoder.decode(BOOL, Address::new(BASE + 0x20)).unwrap(), Value::Bool(true));
}

#[test]
fn test_float_roundtrip()
{
    let table = basic_table();
    let mut mem = MockMemory::new();
    mem.write(BASE, &1.5f32.to_le_bytes());
    mem.write(BASE + 0x10, &(-2.25f64).to_le_bytes());
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    assert_eq!(decoder.decode(FLOAT32, Address::new(BASE)).unwrap(), Value::Float32(1.5));
    assert_eq!(
        decoder.decode(FLOAT64, Address::new(BASE + 0x10)).unwrap(),
        Value::Float64(-2.25)
    );
}

#[test]
fn test_complex_roundtrip()
{
    let table = basic_table();
    let mut mem = MockMemory::new();
    mem.write(BASE, &1.5f32.to_le_bytes());
    mem.write(BASE + 4, &(-0.5f32).to_le_bytes());
    mem.write(BASE + 0x10, &3.25f64.to_le_bytes());
    mem.write(BASE + 0x18, &(-7.75f64).to_le_bytes());
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    assert_eq!(
        decoder.decode(COMPLEX64, Address::new(BASE)).unwrap(),
        Value::Complex64 { re: 1.5, im: -0.5 }
    );
    assert_eq!(
        decoder.decode(COMPLEX128, Address::new(BASE + 0x10)).unwrap(),
        Value::Complex128 { re: 3.25, im: -7.75 }
    );
}

#[test]
fn test_pointer_carries_pointee_without_deref()
{
    let mut table = basic_table();
    let ptr = table.insert(desc(TypeId(102), 8, TypeKind::Pointer { pointee: INT32 }));
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x2000);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let value = decoder.decode(ptr, Address::new(BASE)).unwrap();
    let Value::Pointer(p) = value else {
        panic!("expected pointer, got {value:?}")
    };
    assert_eq!(p.type_id, INT32);
    assert_eq!(p.address, Address::new(0x2000));
    // One read for the pointer itself; the pointee is never touched
    // (nothing is mapped at 0x2000, so a dereference would have failed).
    assert_eq!(mem.reads(), 1);
}

#[test]
fn test_nil_pointer_is_a_value()
{
    let mut table = basic_table();
    let ptr = table.insert(desc(TypeId(102), 8, TypeKind::Pointer { pointee: INT32 }));
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Pointer(p) = decoder.decode(ptr, Address::new(BASE)).unwrap() else {
        panic!("expected pointer")
    };
    assert!(p.is_nil());
}

#[test]
fn test_pointer_size_mismatch()
{
    let mut table = basic_table();
    let ptr = table.insert(desc(TypeId(102), 4, TypeKind::Pointer { pointee: INT32 }));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(ptr, Address::new(BASE)).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidSize {
            what: "pointer",
            size: 4
        }
    ));
}

#[test]
fn test_slice_view()
{
    let mut table = basic_table();
    let elem_ptr = table.insert(desc(TypeId(103), 8, TypeKind::Pointer { pointee: INT64 }));
    let slice = table.insert(desc(
        TypeId(104),
        24,
        TypeKind::Slice {
            header: slice_header(elem_ptr, INT64),
            elem: INT64,
        },
    ));

    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x2000); // array
    mem.write_u64(BASE + 8, 3); // len
    mem.write_u64(BASE + 16, 5); // cap
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Slice(s) = decoder.decode(slice, Address::new(BASE)).unwrap() else {
        panic!("expected slice")
    };
    assert_eq!(s.array.address, Address::new(0x2000));
    assert_eq!(s.array.length, 3);
    assert_eq!(s.capacity, 5);
    assert_eq!(s.array.elem_type, INT64);
    assert_eq!(s.array.stride_bits, 64);
    // Three header reads, no element reads
    assert_eq!(mem.reads(), 3);
}

#[test]
fn test_slice_capacity_less_than_length()
{
    let mut table = basic_table();
    let elem_ptr = table.insert(desc(TypeId(103), 8, TypeKind::Pointer { pointee: INT64 }));
    let slice = table.insert(desc(
        TypeId(104),
        24,
        TypeKind::Slice {
            header: slice_header(elem_ptr, INT64),
            elem: INT64,
        },
    ));

    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x2000);
    mem.write_u64(BASE + 8, 5); // len
    mem.write_u64(BASE + 16, 3); // cap
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(slice, Address::new(BASE)).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InconsistentSlice {
            length: 5,
            capacity: 3
        }
    ));
}

#[test]
fn test_slice_header_with_unsigned_fields()
{
    // Some runtime versions declare len/cap unsigned; the accessor hides that.
    let mut table = basic_table();
    let elem_ptr = table.insert(desc(TypeId(103), 8, TypeKind::Pointer { pointee: INT64 }));
    let slice = table.insert(desc(
        TypeId(104),
        24,
        TypeKind::Slice {
            header: slice_header(elem_ptr, UINT64),
            elem: INT64,
        },
    ));

    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x2000);
    mem.write_u64(BASE + 8, 2);
    mem.write_u64(BASE + 16, 2);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Slice(s) = decoder.decode(slice, Address::new(BASE)).unwrap() else {
        panic!("expected slice")
    };
    assert_eq!(s.array.length, 2);
    assert_eq!(s.capacity, 2);
}

#[test]
fn test_array_view()
{
    let mut table = basic_table();
    let array = table.insert(desc(
        TypeId(105),
        32,
        TypeKind::Array {
            elem: INT64,
            count: 4,
            stride_bits: 64,
        },
    ));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Array(a) = decoder.decode(array, Address::new(BASE)).unwrap() else {
        panic!("expected array")
    };
    assert_eq!(a.address, Address::new(BASE));
    assert_eq!(a.length, 4);
    assert_eq!(a.stride_bits, 64);
    // Arrays have no header; nothing is read
    assert_eq!(mem.reads(), 0);
}

#[test]
fn test_array_element_address()
{
    let mut table = basic_table();
    let array = table.insert(desc(
        TypeId(105),
        32,
        TypeKind::Array {
            elem: INT64,
            count: 4,
            stride_bits: 64,
        },
    ));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Array(a) = decoder.decode(array, Address::new(BASE)).unwrap() else {
        panic!("expected array")
    };
    assert_eq!(a.element_address(0), Some(Address::new(BASE)));
    assert_eq!(a.element_address(3), Some(Address::new(BASE + 24)));
    assert_eq!(a.element_address(4), None);
}

#[test]
fn test_array_stride_not_byte_aligned()
{
    let mut table = basic_table();
    let array = table.insert(desc(
        TypeId(105),
        6,
        TypeKind::Array {
            elem: INT8,
            count: 4,
            stride_bits: 12,
        },
    ));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(array, Address::new(BASE)).unwrap_err();
    assert!(matches!(err, DecodeError::Alignment { stride_bits: 12 }));
}

#[test]
fn test_struct_fields_are_views_not_values()
{
    let mut table = basic_table();
    let layout = StructLayout::new(vec![field("a", INT32, 0), field("b", INT64, 8)]);
    let st = table.insert(desc(TypeId(106), 16, TypeKind::Struct(layout)));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Struct(s) = decoder.decode(st, Address::new(BASE)).unwrap() else {
        panic!("expected struct")
    };
    assert_eq!(s.fields.len(), 2);
    assert_eq!(s.fields[0].name, "a");
    assert_eq!(s.fields[0].type_id, INT32);
    assert_eq!(s.fields[0].address, Address::new(BASE));
    assert_eq!(s.fields[1].name, "b");
    assert_eq!(s.fields[1].type_id, INT64);
    assert_eq!(s.fields[1].address, Address::new(BASE + 8));
    // Field contents are untouched: the whole struct decode is read-free
    assert_eq!(mem.reads(), 0);
    assert!(s.field("b").is_some());
    assert!(s.field("c").is_none());
}

#[test]
fn test_typedef_is_transparent()
{
    let mut table = basic_table();
    let alias = table.insert(desc(TypeId(107), 4, TypeKind::Typedef { target: INT32 }));
    let mut mem = MockMemory::new();
    mem.write(BASE, &(-42i32).to_le_bytes());
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let direct = decoder.decode(INT32, Address::new(BASE)).unwrap();
    let aliased = decoder.decode(alias, Address::new(BASE)).unwrap();
    assert_eq!(direct, aliased);
    assert_eq!(aliased, Value::Int32(-42));
}

#[test]
fn test_typedef_chain_resolves()
{
    let mut table = basic_table();
    let inner = table.insert(desc(TypeId(107), 4, TypeKind::Typedef { target: INT32 }));
    let outer = table.insert(desc(TypeId(108), 4, TypeKind::Typedef { target: inner }));
    let mut mem = MockMemory::new();
    mem.write(BASE, &7i32.to_le_bytes());
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    assert_eq!(decoder.decode(outer, Address::new(BASE)).unwrap(), Value::Int32(7));
}

#[test]
fn test_typedef_cycle_fails_instead_of_recursing()
{
    let mut table = basic_table();
    table.insert(desc(TypeId(107), 8, TypeKind::Typedef { target: TypeId(108) }));
    table.insert(desc(TypeId(108), 8, TypeKind::Typedef { target: TypeId(107) }));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(TypeId(107), Address::new(BASE)).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedType(_)));
}

/// Map descriptor plus the hash-table header struct it points at
fn map_types(table: &mut TypeTable) -> TypeId
{
    let header = table.insert(desc(
        TypeId(110),
        48,
        TypeKind::Struct(StructLayout::new(vec![field("count", INT64, 0)])),
    ));
    table.insert(desc(TypeId(111), 8, TypeKind::Map { header }))
}

#[test]
fn test_map_count()
{
    let mut table = basic_table();
    let map = map_types(&mut table);
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x3000); // map variable -> table header
    mem.write_u64(0x3000, 42); // header.count
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Map(m) = decoder.decode(map, Address::new(BASE)).unwrap() else {
        panic!("expected map")
    };
    assert_eq!(m.type_id, map);
    assert_eq!(m.address, Address::new(BASE));
    assert_eq!(m.length, 42);
}

#[test]
fn test_nil_map_counts_zero_with_one_read()
{
    let mut table = basic_table();
    let map = map_types(&mut table);
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Map(m) = decoder.decode(map, Address::new(BASE)).unwrap() else {
        panic!("expected map")
    };
    assert_eq!(m.length, 0);
    assert_eq!(mem.reads(), 1);
}

#[test]
fn test_map_count_standalone()
{
    let mut table = basic_table();
    let map = map_types(&mut table);
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x3000);
    mem.write_u64(0x3000, 7);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let descriptor = table.lookup(map).unwrap();
    assert_eq!(decoder.map_count(descriptor, Address::new(BASE)).unwrap(), 7);
}

/// String descriptor with a Go-shaped header
fn string_type(table: &mut TypeTable) -> TypeId
{
    let data_ptr = table.insert(desc(TypeId(112), 8, TypeKind::Pointer { pointee: UINT8 }));
    table.insert(desc(
        TypeId(113),
        16,
        TypeKind::String {
            header: StructLayout::new(vec![field("str", data_ptr, 0), field("len", INT64, 8)]),
        },
    ))
}

#[test]
fn test_string_preview_capped_at_256_bytes()
{
    let mut table = basic_table();
    let string = string_type(&mut table);
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x4000); // str
    mem.write_u64(BASE + 8, 1000); // len
    mem.write(0x4000, &[b'x'; 1000]);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::String(s) = decoder.decode(string, Address::new(BASE)).unwrap() else {
        panic!("expected string")
    };
    assert_eq!(s.length, 1000);
    assert_eq!(s.preview.len(), 256);
    assert!(s.truncated());
    assert_eq!(s.preview, vec![b'x'; 256]);
}

#[test]
fn test_short_string_materializes_fully()
{
    let mut table = basic_table();
    let string = string_type(&mut table);
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x4000);
    mem.write_u64(BASE + 8, 5);
    mem.write(0x4000, b"hello");
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::String(s) = decoder.decode(string, Address::new(BASE)).unwrap() else {
        panic!("expected string")
    };
    assert_eq!(s.length, 5);
    assert_eq!(s.preview, b"hello");
    assert!(!s.truncated());
    assert_eq!(s.preview_lossy(), "hello");
}

#[test]
fn test_empty_string_skips_contents_read()
{
    let mut table = basic_table();
    let string = string_type(&mut table);
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0); // str is nil for ""
    mem.write_u64(BASE + 8, 0);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::String(s) = decoder.decode(string, Address::new(BASE)).unwrap() else {
        panic!("expected string")
    };
    assert_eq!(s.length, 0);
    assert!(s.preview.is_empty());
    // Two header reads, no contents read
    assert_eq!(mem.reads(), 2);
}

/// Channel descriptor plus the ring-buffer header struct it points at
fn channel_types(table: &mut TypeTable) -> TypeId
{
    let header = table.insert(desc(
        TypeId(114),
        96,
        TypeKind::Struct(StructLayout::new(vec![
            field("qcount", UINT64, 0),
            field("dataqsiz", UINT64, 8),
            field("buf", UINTPTR, 16),
            field("recvx", UINT64, 32),
        ])),
    ));
    table.insert(desc(
        TypeId(115),
        8,
        TypeKind::Channel { header, elem: INT64 },
    ))
}

#[test]
fn test_channel_view()
{
    let mut table = basic_table();
    let chan = channel_types(&mut table);
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x5000); // chan variable -> header
    mem.write_u64(0x5000, 2); // qcount
    mem.write_u64(0x5008, 4); // dataqsiz
    mem.write_u64(0x5010, 0x6000); // buf
    mem.write_u64(0x5020, 1); // recvx
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Channel(c) = decoder.decode(chan, Address::new(BASE)).unwrap() else {
        panic!("expected channel")
    };
    assert_eq!(c.elem_type, INT64);
    assert_eq!(c.address, Address::new(0x5000));
    assert_eq!(c.buffer, Address::new(0x6000));
    assert_eq!(c.length, 2);
    assert_eq!(c.capacity, 4);
    assert_eq!(c.stride, 8);
    assert_eq!(c.buffer_start, 1);
    assert!(!c.is_nil());
}

#[test]
fn test_nil_channel_reads_nothing_past_the_pointer()
{
    let mut table = basic_table();
    let chan = channel_types(&mut table);
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Channel(c) = decoder.decode(chan, Address::new(BASE)).unwrap() else {
        panic!("expected channel")
    };
    assert!(c.is_nil());
    assert_eq!(c.address, Address::ZERO);
    assert_eq!(c.buffer, Address::ZERO);
    assert_eq!(c.length, 0);
    assert_eq!(c.capacity, 0);
    assert_eq!(c.stride, 0);
    assert_eq!(c.buffer_start, 0);
    // Exactly one read: the channel pointer itself
    assert_eq!(mem.reads(), 1);
}

#[test]
fn test_channel_header_must_be_a_struct()
{
    let mut table = basic_table();
    let chan = table.insert(desc(
        TypeId(115),
        8,
        TypeKind::Channel {
            header: INT64,
            elem: INT64,
        },
    ));
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x5000);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(chan, Address::new(BASE)).unwrap_err();
    assert!(matches!(err, DecodeError::UnsupportedType(_)));
}

#[test]
fn test_func_decodes_entry_address()
{
    let mut table = basic_table();
    let func = table.insert(desc(TypeId(116), 8, TypeKind::Func));
    let mut mem = MockMemory::new();
    mem.write_u64(BASE, 0x40_1000);
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let Value::Func(f) = decoder.decode(func, Address::new(BASE)).unwrap() else {
        panic!("expected func")
    };
    assert_eq!(f.address, Address::new(0x40_1000));
}

#[test]
fn test_interface_is_opaque()
{
    let mut table = basic_table();
    let iface = table.insert(desc(TypeId(117), 16, TypeKind::Interface));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    assert_eq!(decoder.decode(iface, Address::new(BASE)).unwrap(), Value::Interface);
    assert_eq!(mem.reads(), 0);
}

#[test]
fn test_unsupported_type_names_the_variant()
{
    let mut table = basic_table();
    let other = table.insert(desc(
        TypeId(118),
        8,
        TypeKind::Other {
            name: "unsafe.Pointer".to_string(),
        },
    ));
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(other, Address::new(BASE)).unwrap_err();
    match err {
        DecodeError::UnsupportedType(name) => assert_eq!(name, "unsafe.Pointer"),
        other => panic!("expected UnsupportedType, got {other:?}"),
    }
}

#[test]
fn test_unknown_type_id()
{
    let table = basic_table();
    let mem = MockMemory::new();
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(TypeId(999), Address::new(BASE)).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownType(TypeId(999))));
}

#[test]
fn test_read_failure_propagates()
{
    let table = basic_table();
    let mem = MockMemory::new(); // nothing mapped
    let decoder = Decoder::new(Architecture::amd64(), &table, &mem);

    let err = decoder.decode(INT64, Address::new(BASE)).unwrap_err();
    assert!(matches!(err, DecodeError::ReadFailure(PeekError::Unmapped { .. })));
}

#[test]
fn test_big_endian_target()
{
    use burrow_core::arch::ByteOrder;

    let table = basic_table();
    let mut mem = MockMemory::new();
    mem.write(BASE, &0x0102_0304u32.to_be_bytes());
    let arch = Architecture::new(ByteOrder::Big, 8);
    let decoder = Decoder::new(arch, &table, &mem);

    assert_eq!(
        decoder.decode(UINT32, Address::new(BASE)).unwrap(),
        Value::Uint32(0x0102_0304)
    );
}
