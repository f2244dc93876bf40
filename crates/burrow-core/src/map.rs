//! # Map Count Extraction
//!
//! The one map operation the decoder performs: how many entries does the
//! table at this address hold?
//!
//! The walk from a map variable to its count is tied to the target
//! runtime's hash-table representation, which is exactly the kind of
//! version-sensitive knowledge that belongs in the layout table rather
//! than the dispatcher. The operation is public so it can be exercised
//! on its own, and narrow on purpose: entry enumeration is a separate,
//! heavier capability built on top of the decoder, not inside it.

use tracing::debug;

use crate::decode::Decoder;
use crate::error::{DecodeError, Result};
use crate::memory::Peek;
use crate::types::{Address, TypeDescriptor, TypeKind};

impl<M: Peek> Decoder<'_, M>
{
    /// Extract the element count of the map value at `addr`
    ///
    /// A map variable holds a pointer to the runtime's table header. A nil
    /// map (zero pointer) has zero entries and is a valid value, so no
    /// header read is attempted for it. Otherwise the count is read from
    /// the header field the active runtime layout names.
    ///
    /// ## Errors
    ///
    /// - `UnsupportedType`: `map` is not a map descriptor, or its header
    ///   type is not a struct
    /// - `FieldNotFound` / `UnsupportedFieldType`: the header struct does
    ///   not match the active layout (runtime version mismatch)
    /// - `ReadFailure`: the memory port could not read the target
    pub fn map_count(&self, map: &TypeDescriptor, addr: Address) -> Result<u64>
    {
        let TypeKind::Map { header } = &map.kind else {
            return Err(DecodeError::UnsupportedType(format!(
                "map count requested for {} type",
                map.kind.name()
            )));
        };
        let header_layout = self.struct_layout(*header, "map header")?;

        let table_addr = self.peek_ptr(addr)?;
        if table_addr.is_null() {
            debug!(%addr, "nil map");
            return Ok(0);
        }

        self.read_integer_field(header_layout, table_addr, self.layout().map.count)
    }
}
