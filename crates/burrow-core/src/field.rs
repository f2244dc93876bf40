//! # Field Accessor
//!
//! Named-field reads inside struct-shaped headers.
//!
//! Slice, string, channel and map decoding all reduce to "find the field
//! called X in this header struct and read it as a pointer or an integer".
//! These two operations hide a real-world wrinkle: equivalent
//! runtime-internal header fields are declared signed in some runtime
//! versions and unsigned in others, so integer reads accept either and
//! widen to a common 64-bit result.

use smallvec::{smallvec, SmallVec};

use crate::decode::Decoder;
use crate::error::{DecodeError, Result};
use crate::memory::Peek;
use crate::types::{Address, StructLayout, TypeKind};

impl<M: Peek> Decoder<'_, M>
{
    /// Read a pointer-typed field of the struct at `base`
    ///
    /// Scans the declared field list for an exact name match, computes the
    /// field's address as `base + byte_offset`, and reads a pointer-width
    /// value there.
    ///
    /// ## Errors
    ///
    /// - `FieldNotFound`: no field has that exact name
    /// - `UnsupportedFieldType`: the field exists but isn't a pointer or
    ///   address kind
    pub fn read_pointer_field(&self, layout: &StructLayout, base: Address, name: &str) -> Result<Address>
    {
        let field = layout
            .field(name)
            .ok_or_else(|| DecodeError::FieldNotFound(name.to_string()))?;
        let field_ty = self.types().lookup(field.type_id)?;
        match field_ty.kind {
            TypeKind::Pointer { .. } | TypeKind::Addr => self.peek_ptr(base.offset(field.byte_offset)),
            _ => Err(DecodeError::UnsupportedFieldType {
                name: name.to_string(),
                expected: "pointer",
            }),
        }
    }

    /// Read an integer-typed field of the struct at `base`, widened to `u64`
    ///
    /// Accepts both signed and unsigned declarations. The value is decoded
    /// at the field's natural width, then sign-extended (`Int`) or
    /// zero-extended (`Uint`) into the returned `u64`; either way the raw
    /// bits survive the widening.
    ///
    /// ## Errors
    ///
    /// - `FieldNotFound`: no field has that exact name
    /// - `UnsupportedFieldType`: the field exists but isn't an integer kind
    /// - `InvalidSize`: the field declares a width outside {1, 2, 4, 8}
    pub fn read_integer_field(&self, layout: &StructLayout, base: Address, name: &str) -> Result<u64>
    {
        let field = layout
            .field(name)
            .ok_or_else(|| DecodeError::FieldNotFound(name.to_string()))?;
        let field_ty = self.types().lookup(field.type_id)?;

        let signed = match field_ty.kind {
            TypeKind::Int => true,
            TypeKind::Uint => false,
            _ => {
                return Err(DecodeError::UnsupportedFieldType {
                    name: name.to_string(),
                    expected: "integer",
                })
            }
        };

        if !matches!(field_ty.byte_size, 1 | 2 | 4 | 8) {
            return Err(DecodeError::InvalidSize {
                what: "integer",
                size: field_ty.byte_size,
            });
        }

        let mut buf: SmallVec<[u8; 8]> = smallvec![0u8; field_ty.byte_size as usize];
        self.memory().peek(base.offset(field.byte_offset), &mut buf)?;

        if signed {
            Ok(self.arch().int_n(&buf) as u64)
        } else {
            Ok(self.arch().uint_n(&buf))
        }
    }
}
