//! Descriptor records for heap objects and GC handles.
//!
//! Descriptors are produced one at a time by the external heap walker, carry no
//! identity beyond their address, and live only for the duration of a single
//! export pass. The aggregation strategies copy out whatever they need; nothing
//! here is retained once a report has rendered.

use strum::{Display, EnumIter, EnumString};

/// One entry of the heap object stream.
///
/// `type_handle` and `type_name` are `None` when the walker could not resolve
/// the object's method table; the pipeline's recovery path
/// ([`resolve_or_recover_type_handle`](crate::heap::resolve_or_recover_type_handle))
/// may still obtain a handle by reading the pointer-sized value at `address`.
///
/// # Examples
///
/// ```rust
/// use heapscope::heap::ObjectDescriptor;
///
/// let obj = ObjectDescriptor::new(0x2000_1000, Some(0x7fff_0010), 24);
/// assert!(obj.is_valid);
/// assert!(!obj.is_free);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    /// Start address of the object in the inspected process.
    pub address: u64,
    /// Resolved type handle (method table), if the walker could determine one.
    pub type_handle: Option<u64>,
    /// Declared size of the object in bytes.
    pub size: u64,
    /// Whether the walker considers this entry well-formed.
    pub is_valid: bool,
    /// Whether this entry is a free (unallocated) block rather than a live object.
    pub is_free: bool,
    /// Resolved display name of the object's type, if available.
    pub type_name: Option<String>,
}

impl ObjectDescriptor {
    /// Create a valid, non-free object descriptor.
    ///
    /// # Arguments
    /// * `address` - Start address of the object
    /// * `type_handle` - Resolved type handle, if any
    /// * `size` - Declared size in bytes
    #[must_use]
    pub fn new(address: u64, type_handle: Option<u64>, size: u64) -> Self {
        ObjectDescriptor {
            address,
            type_handle,
            size,
            is_valid: true,
            is_free: false,
            type_name: None,
        }
    }

    /// Create a descriptor for a free block of `size` bytes at `address`.
    #[must_use]
    pub fn free_block(address: u64, size: u64) -> Self {
        ObjectDescriptor {
            address,
            type_handle: None,
            size,
            is_valid: true,
            is_free: true,
            type_name: None,
        }
    }

    /// Attach a resolved display name to this descriptor.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.type_name = Some(name.to_string());
        self
    }

    /// Address one past the last byte of this entry.
    #[must_use]
    pub fn end_address(&self) -> u64 {
        self.address.saturating_add(self.size)
    }
}

/// The strength/kind of a GC handle.
///
/// Mirrors the handle categories exposed by the runtime's handle table. The
/// textual form (via [`Display`](std::fmt::Display)) is used directly as the
/// key column of per-kind handle totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
pub enum HandleKind {
    /// Weak reference that does not track resurrection.
    WeakShort,
    /// Weak reference that tracks resurrection.
    WeakLong,
    /// Strong reference; keeps the target alive.
    Strong,
    /// Strong reference that additionally pins the target in place.
    Pinned,
    /// COM interop reference-counted handle.
    RefCounted,
    /// Handle whose secondary target lives as long as the primary.
    Dependent,
    /// Pinned handle used for asynchronous I/O buffers.
    AsyncPinned,
    /// Handle carrying a sized reference for the GC's budget accounting.
    SizedRef,
    /// WinRT weak reference.
    WeakWinRT,
}

/// One entry of the GC handle table stream.
#[derive(Debug, Clone)]
pub struct HandleDescriptor {
    /// Address of the handle slot itself.
    pub handle_address: u64,
    /// Strength/kind of the handle.
    pub kind: HandleKind,
    /// The object the handle refers to.
    pub target: ObjectDescriptor,
    /// Secondary target, present only for [`HandleKind::Dependent`] handles.
    pub dependent_target: Option<ObjectDescriptor>,
}

/// Classification of the heap segment containing an address.
///
/// Fragmentation detection only confirms a block when the object following a
/// large free block sits in a [`SegmentKind::Regular`] segment; entries in
/// large-object, pinned-object and frozen segments are compacted differently
/// (or not at all) and are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub enum SegmentKind {
    /// A normally-collected small-object-heap segment.
    Regular,
    /// Large object heap segment.
    Large,
    /// Pinned object heap segment.
    Pinned,
    /// Frozen/read-only segment.
    Frozen,
}

impl SegmentKind {
    /// Whether entries in this segment participate in normal compaction.
    #[must_use]
    pub fn is_normally_collected(self) -> bool {
        matches!(self, SegmentKind::Regular)
    }
}
