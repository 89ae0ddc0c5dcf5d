//! The memory-reading/runtime-introspection collaborator contract.
//!
//! The export pipeline is a pure consumer: everything it knows about the
//! inspected process arrives through [`HeapSource`]. Implementations wrap a
//! crash dump, a live snapshot, or (in tests) a synthetic heap; the pipeline
//! treats any blocking inside these calls as opaque suspension points and does
//! not attempt to overlap them with computation.

use crate::{
    heap::{HandleDescriptor, ObjectDescriptor, SegmentKind},
    Result,
};

/// Access to a managed heap snapshot.
///
/// Both enumeration streams are finite and single-use; re-enumerating requires
/// asking the source again. Objects are delivered in the walker's traversal
/// order, which for every supported walker is ascending address order — the
/// fragmentation strategy relies on that.
///
/// # Examples
///
/// ```rust,ignore
/// use heapscope::heap::HeapSource;
///
/// fn count_objects(source: &dyn HeapSource) -> usize {
///     source.objects().count()
/// }
/// ```
pub trait HeapSource {
    /// Enumerate the heap object stream, in ascending address order.
    fn objects(&self) -> Box<dyn Iterator<Item = ObjectDescriptor> + '_>;

    /// Enumerate the GC handle table.
    fn handles(&self) -> Box<dyn Iterator<Item = HandleDescriptor> + '_>;

    /// Read the pointer-sized value at `address` in the inspected process.
    ///
    /// Used only as the type-handle recovery fallback when a descriptor
    /// carries no resolved handle.
    ///
    /// # Errors
    /// Returns an error if the address is not readable in the snapshot.
    fn read_pointer(&self, address: u64) -> Result<u64>;

    /// Resolve the display name of a type handle, if the runtime metadata
    /// for it is available.
    fn resolve_type_name(&self, type_handle: u64) -> Option<String>;

    /// Read up to `max_units` UTF-16 code units of the string payload of the
    /// object at `address`.
    ///
    /// The pipeline decodes and truncates the returned units itself; sources
    /// only hand back raw memory.
    ///
    /// # Errors
    /// Returns an error if the payload is not readable in the snapshot.
    fn read_string_payload(&self, address: u64, max_units: usize) -> Result<Vec<u16>>;

    /// Kind of the heap segment containing `address`, if known.
    fn segment_kind(&self, address: u64) -> Option<SegmentKind>;

    /// GC generation of the object at `address`, if known.
    fn generation(&self, address: u64) -> Option<u32>;

    /// Reachability oracle: whether the object at `address` is reachable from
    /// a root. "Dead" is defined as the negation of this, not a separately
    /// computed state.
    fn is_live(&self, address: u64) -> bool;

    /// Whether the heap is in a state the walker can traverse safely.
    fn is_walkable(&self) -> bool;
}

/// Resolve an item's type handle, falling back to a raw pointer read.
///
/// This is the single shared "resolved type, else recover" capability used by
/// the type-handle filter and the keyed-statistics strategies. When the
/// descriptor carries no resolved handle, the pointer-sized value at the
/// object's start is treated as the handle; if that read fails the item simply
/// has no handle — callers exclude it or bucket it under the placeholder name,
/// they never abort the pass.
#[must_use]
pub fn resolve_or_recover_type_handle(
    item: &ObjectDescriptor,
    source: &dyn HeapSource,
) -> Option<u64> {
    match item.type_handle {
        Some(handle) => Some(handle),
        None => source.read_pointer(item.address).ok(),
    }
}
