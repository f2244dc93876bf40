//! # Runtime Layout Tables
//!
//! Data-driven knowledge of the target runtime's internal memory layouts.
//!
//! Decoding a slice, string, map or channel means reading named fields out
//! of runtime-internal header structs. Those field names (`len`, `cap`,
//! `qcount`, ...) are unstable, version-specific facts about the target's
//! runtime, so they live here as data rather than inside the decoder's
//! logic: supporting a runtime that renames a header field is a new table
//! entry, not a decoder change.
//!
//! Layouts are registered under a version tag and looked up with
//! [`RuntimeLayout::for_version`]. [`RuntimeLayout::go1`] is the layout of
//! the Go 1.x runtime family and the default for new sessions.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Cap on how many bytes of a string's contents one decode call will
/// materialize
///
/// A decode call is O(header size) for every other composite; strings get
/// a bounded preview so an arbitrarily long target string cannot make a
/// single call arbitrarily expensive. The declared length is always
/// reported in full alongside the possibly-truncated preview.
pub const MAX_STRING_PREVIEW: usize = 256;

/// Header field names of a slice descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceFields
{
    /// Backing-array pointer field
    pub data: &'static str,
    /// Element-count field
    pub len: &'static str,
    /// Capacity field
    pub cap: &'static str,
}

/// Header field names of a string descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringFields
{
    /// Contents pointer field
    pub data: &'static str,
    /// Byte-length field
    pub len: &'static str,
}

/// Header field names of a channel's ring-buffer struct
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChanFields
{
    /// Ring-buffer pointer field
    pub buf: &'static str,
    /// Buffered-element-count field
    pub qcount: &'static str,
    /// Buffer-capacity field
    pub dataqsiz: &'static str,
    /// Next-receive-index field
    pub recvx: &'static str,
}

/// Field names and strategy for extracting a map's element count
///
/// Count extraction is deliberately the *only* map operation here; walking
/// the table's buckets to enumerate entries is a separate, heavier
/// capability that does not belong in the per-value decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapFields
{
    /// Element-count field of the table header reached through the map pointer
    pub count: &'static str,
}

/// Complete layout description for one runtime/ABI version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeLayout
{
    /// Version tag this layout is registered under
    pub version: &'static str,
    /// Slice header fields
    pub slice: SliceFields,
    /// String header fields
    pub string: StringFields,
    /// Channel header fields
    pub chan: ChanFields,
    /// Map count extraction
    pub map: MapFields,
}

/// The Go 1.x runtime family
///
/// Field names match `runtime.stringStructDWARF`, `runtime.slice`,
/// `runtime.hchan` and `runtime.hmap` as emitted into debug info; they have
/// been stable across the Go 1.x series.
static GO1: RuntimeLayout = RuntimeLayout {
    version: "go1",
    slice: SliceFields {
        data: "array",
        len: "len",
        cap: "cap",
    },
    string: StringFields { data: "str", len: "len" },
    chan: ChanFields {
        buf: "buf",
        qcount: "qcount",
        dataqsiz: "dataqsiz",
        recvx: "recvx",
    },
    map: MapFields { count: "count" },
};

static REGISTRY: Lazy<HashMap<&'static str, &'static RuntimeLayout>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, &'static RuntimeLayout> = HashMap::new();
    for layout in [&GO1] {
        table.insert(layout.version, layout);
    }
    table
});

impl RuntimeLayout
{
    /// The default layout: the Go 1.x runtime family
    pub fn go1() -> &'static Self
    {
        &GO1
    }

    /// Look up a registered layout by version tag
    ///
    /// Returns `None` for tags no layout was registered under; callers
    /// decide whether to fall back to [`RuntimeLayout::go1`] or refuse the
    /// session.
    pub fn for_version(tag: &str) -> Option<&'static Self>
    {
        REGISTRY.get(tag).copied()
    }
}
