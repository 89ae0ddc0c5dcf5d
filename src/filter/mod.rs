//! Composable, lazy filtering of the heap object stream.
//!
//! A filter chain is a conjunction of predicates applied to each incoming
//! [`ObjectDescriptor`]: all predicates must pass, the first failing predicate
//! skips the item without evaluating the rest, and surviving items keep their
//! original stream order. Predicates are ranked by evaluation cost when the
//! chain is built so that cheap checks (size and address bounds) run before
//! anything that may touch the inspected process (type-handle recovery).
//!
//! # Key Components
//!
//! - [`ObjectPredicate`] - The closed set of supported predicates
//! - [`ObjectFilterChain`] - An ordered conjunction applied lazily to a stream
//! - [`FilterChainBuilder`] - Fallible construction; malformed configuration
//!   (e.g. a non-hexadecimal address string) fails here, never mid-stream
//!
//! # Examples
//!
//! ```rust
//! use heapscope::filter::FilterChainBuilder;
//!
//! let chain = FilterChainBuilder::new()
//!     .with_size_bounds(64, 0)
//!     .with_address_range_hex("0x20000000", "0x30000000")?
//!     .build();
//! assert_eq!(chain.len(), 2);
//! # Ok::<(), heapscope::Error>(())
//! ```

use crate::{
    heap::{resolve_or_recover_type_handle, HeapSource, ObjectDescriptor, SegmentKind},
    utils::parse_hex_address,
    Result,
};

/// One predicate of a filter chain.
///
/// The set is closed: every way the pipeline can narrow the object stream is a
/// variant here, dispatched without dynamic trait objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectPredicate {
    /// `min <= size <= max`, either bound unbounded when 0. Invalid items
    /// never pass.
    SizeBounds {
        /// Minimum declared size in bytes, 0 for unbounded.
        min: u64,
        /// Maximum declared size in bytes, 0 for unbounded.
        max: u64,
    },
    /// `min <= address <= max`, `max` unbounded when 0.
    AddressRange {
        /// Lowest admitted address.
        min: u64,
        /// Highest admitted address, 0 for unbounded.
        max: u64,
    },
    /// Matches objects whose reachability equals `live`; dead is the negation
    /// of live, as reported by the source's oracle.
    Liveness(bool),
    /// Matches objects in the given GC generation.
    Generation(u32),
    /// Matches objects whose containing segment is of the given kind.
    Segment(SegmentKind),
    /// Byte-exact (ordinal) prefix match on the resolved display name. Items
    /// with no resolved name never match.
    TypeNamePrefix(String),
    /// Exact match against a target type handle, recovering the handle via a
    /// pointer read when the descriptor carries none. Items whose recovery
    /// fails are excluded silently.
    TypeHandle(u64),
}

impl ObjectPredicate {
    /// Relative evaluation cost, used to order predicates at build time.
    /// Bounds checks are free, metadata lookups may hit snapshot indices, and
    /// type-handle matching can fall back to a memory read.
    fn cost_rank(&self) -> u8 {
        match self {
            ObjectPredicate::SizeBounds { .. } | ObjectPredicate::AddressRange { .. } => 0,
            ObjectPredicate::Liveness(_)
            | ObjectPredicate::Generation(_)
            | ObjectPredicate::Segment(_) => 1,
            ObjectPredicate::TypeNamePrefix(_) => 2,
            ObjectPredicate::TypeHandle(_) => 3,
        }
    }

    /// Evaluate this predicate against one stream item.
    pub(crate) fn matches(&self, item: &ObjectDescriptor, source: &dyn HeapSource) -> bool {
        match self {
            ObjectPredicate::SizeBounds { min, max } => {
                item.is_valid
                    && (*min == 0 || item.size >= *min)
                    && (*max == 0 || item.size <= *max)
            }
            ObjectPredicate::AddressRange { min, max } => {
                item.address >= *min && (*max == 0 || item.address <= *max)
            }
            ObjectPredicate::Liveness(live) => source.is_live(item.address) == *live,
            ObjectPredicate::Generation(generation) => {
                source.generation(item.address) == Some(*generation)
            }
            ObjectPredicate::Segment(kind) => source.segment_kind(item.address) == Some(*kind),
            ObjectPredicate::TypeNamePrefix(prefix) => item
                .type_name
                .as_deref()
                .is_some_and(|name| name.as_bytes().starts_with(prefix.as_bytes())),
            ObjectPredicate::TypeHandle(target) => {
                resolve_or_recover_type_handle(item, source) == Some(*target)
            }
        }
    }
}

/// An ordered conjunction of predicates applied lazily to the object stream.
///
/// Surviving items preserve their relative order from the input stream.
pub struct ObjectFilterChain {
    predicates: Vec<ObjectPredicate>,
}

impl ObjectFilterChain {
    /// A chain with no predicates; every item survives.
    #[must_use]
    pub fn pass_all() -> Self {
        ObjectFilterChain {
            predicates: Vec::new(),
        }
    }

    /// Number of predicates in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether the chain has no predicates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluate all predicates against one item, short-circuiting on the
    /// first failure.
    #[must_use]
    pub fn matches(&self, item: &ObjectDescriptor, source: &dyn HeapSource) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(item, source))
    }

    /// Wrap `items` in a lazy filtering iterator. Items are pulled and tested
    /// one at a time; nothing is buffered.
    pub fn apply<'a>(
        &'a self,
        source: &'a dyn HeapSource,
        items: Box<dyn Iterator<Item = ObjectDescriptor> + 'a>,
    ) -> impl Iterator<Item = ObjectDescriptor> + 'a {
        items.filter(move |item| self.matches(item, source))
    }
}

/// Builder for [`ObjectFilterChain`].
///
/// Methods that parse textual arguments are fallible and return `Result<Self>`
/// so that configuration errors surface before the stream is touched.
#[derive(Default)]
pub struct FilterChainBuilder {
    predicates: Vec<ObjectPredicate>,
}

impl FilterChainBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        FilterChainBuilder::default()
    }

    /// Keep only objects of the exact type handle `target`.
    #[must_use]
    pub fn with_type_handle(mut self, target: u64) -> Self {
        self.predicates.push(ObjectPredicate::TypeHandle(target));
        self
    }

    /// Keep only objects of the type handle given as a hexadecimal string.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAddress`](crate::Error::InvalidAddress) if
    /// `target` is not valid hexadecimal.
    pub fn with_type_handle_hex(self, target: &str) -> Result<Self> {
        Ok(self.with_type_handle(parse_hex_address(target)?))
    }

    /// Keep only objects whose resolved display name starts with `prefix`
    /// (byte-exact comparison).
    #[must_use]
    pub fn with_name_prefix(mut self, prefix: &str) -> Self {
        self.predicates
            .push(ObjectPredicate::TypeNamePrefix(prefix.to_string()));
        self
    }

    /// Keep only valid objects with `min <= size <= max`; pass 0 to leave a
    /// bound open.
    #[must_use]
    pub fn with_size_bounds(mut self, min: u64, max: u64) -> Self {
        self.predicates.push(ObjectPredicate::SizeBounds { min, max });
        self
    }

    /// Keep only live (`true`) or only dead (`false`) objects.
    #[must_use]
    pub fn with_liveness(mut self, live: bool) -> Self {
        self.predicates.push(ObjectPredicate::Liveness(live));
        self
    }

    /// Keep only objects with `min <= address <= max`; pass 0 as `max` to
    /// leave the upper bound open.
    #[must_use]
    pub fn with_address_range(mut self, min: u64, max: u64) -> Self {
        self.predicates
            .push(ObjectPredicate::AddressRange { min, max });
        self
    }

    /// Keep only objects within the address range given as hexadecimal
    /// strings.
    ///
    /// # Errors
    /// Returns [`Error::InvalidAddress`](crate::Error::InvalidAddress) if
    /// either bound is not valid hexadecimal.
    pub fn with_address_range_hex(self, min: &str, max: &str) -> Result<Self> {
        let min = parse_hex_address(min)?;
        let max = parse_hex_address(max)?;
        Ok(self.with_address_range(min, max))
    }

    /// Keep only objects in GC generation `generation`.
    #[must_use]
    pub fn with_generation(mut self, generation: u32) -> Self {
        self.predicates
            .push(ObjectPredicate::Generation(generation));
        self
    }

    /// Keep only objects whose containing segment is of `kind`.
    #[must_use]
    pub fn with_segment(mut self, kind: SegmentKind) -> Self {
        self.predicates.push(ObjectPredicate::Segment(kind));
        self
    }

    /// Finish the chain. Predicates are stably ordered by evaluation cost so
    /// cheap checks run first.
    #[must_use]
    pub fn build(mut self) -> ObjectFilterChain {
        self.predicates
            .sort_by_key(ObjectPredicate::cost_rank);
        ObjectFilterChain {
            predicates: self.predicates,
        }
    }
}
