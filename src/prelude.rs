//! Curated re-exports of the most commonly used types.
//!
//! Pulling in the prelude gives a caller everything needed to configure and
//! drive a report: the two engines, the report selectors, the filter builder,
//! the output plumbing and the collaborator trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use heapscope::prelude::*;
//!
//! let chain = FilterChainBuilder::new().with_size_bounds(64, 0).build();
//! let outcome = HeapExportEngine::new(&snapshot)
//!     .with_filters(chain)
//!     .with_report(HeapReport::Fragmentation {
//!         min_block_size: DEFAULT_FRAGMENTATION_THRESHOLD,
//!     })
//!     .export(None, &CancellationToken::new())?;
//! # Ok::<(), heapscope::Error>(())
//! ```

pub use crate::{
    aggregate::{
        FragmentationBlock, HeapReport, TypeAggregate, ValueAggregate,
        DEFAULT_FRAGMENTATION_THRESHOLD, DEFAULT_STRING_LENGTH,
    },
    engine::{GcHandleReportEngine, HandleReport, HeapExportEngine, ScanOutcome},
    filter::{FilterChainBuilder, ObjectFilterChain, ObjectPredicate},
    heap::{
        HandleDescriptor, HandleKind, HeapSource, ObjectDescriptor, SegmentKind,
        UNKNOWN_TYPE_NAME,
    },
    report::{Cell, ColumnFormat, FileDestination, OutputFormat, OutputRouter, TableSink},
    utils::CancellationToken,
    Error, Result,
};
