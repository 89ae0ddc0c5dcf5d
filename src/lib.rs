#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # heapscope
//!
//! A streaming export pipeline for analyzing managed garbage-collected heap
//! snapshots. `heapscope` consumes a lazy stream of heap-object and GC-handle
//! descriptors from an external snapshot walker and renders diagnostic
//! reports — flat listings, per-type statistics, string-value statistics and
//! heap fragmentation — through a format-pluggable table writer, without ever
//! materializing a report in memory.
//!
//! ## Features
//!
//! - **Lazy filter chains** - Composable predicates (type, name prefix, size,
//!   liveness, address range, segment, generation) applied one item at a time
//! - **Single-pass aggregation** - Per-type and per-value statistics and
//!   adjacency fragmentation detection over millions of entries
//! - **Streaming rendering** - Console, comma/tab-delimited and structured
//!   output; only the current row is ever buffered
//! - **Cooperative cancellation** - Polled per stream item, surfaced as a
//!   distinct outcome rather than an error
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use heapscope::prelude::*;
//!
//! // `snapshot` is any HeapSource implementation (dump reader, live snapshot)
//! let outcome = HeapExportEngine::new(&snapshot)
//!     .with_filters(FilterChainBuilder::new().with_name_prefix("System.").build())
//!     .with_report(HeapReport::TypeStatistics)
//!     .with_format(OutputFormat::CommaDelimited)
//!     .export(None, &CancellationToken::new())?;
//!
//! assert!(outcome.is_completed());
//! # Ok::<(), heapscope::Error>(())
//! ```
//!
//! ## Architecture
//!
//! Data flows in a single forward pass:
//!
//! object/handle stream → [`filter`] → [`aggregate`] → [`report`] → byte sink
//!
//! - [`heap`] - Descriptor records and the [`HeapSource`](heap::HeapSource)
//!   collaborator trait behind which all memory reading lives
//! - [`filter`] - Lazy, order-preserving predicate chains
//! - [`aggregate`] - The four aggregation strategies
//! - [`report`] - Column formats, output encodings, and the destination set
//! - [`engine`] - The orchestrators driving one pass per report
//!
//! ## Error Handling
//!
//! Only configuration and precondition failures are errors; per-item
//! conditions are absorbed where they occur and destination write failures
//! are dropped per destination. See [`Error`] for the taxonomy and
//! [`engine::ScanOutcome`] for how cancellation is reported.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Aggregation strategies: listing, per-type statistics, string-value
/// statistics, fragmentation detection.
pub mod aggregate;

/// Report orchestration engines for heap objects and GC handles.
pub mod engine;

/// Lazy, composable filtering of the heap object stream.
pub mod filter;

/// Heap snapshot data model and the external collaborator contract.
pub mod heap;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,ignore
/// use heapscope::prelude::*;
///
/// let outcome = HeapExportEngine::new(&snapshot)
///     .export(None, &CancellationToken::new())?;
/// # Ok::<(), heapscope::Error>(())
/// ```
pub mod prelude;

/// Streaming table rendering: columns, encodings, destinations.
pub mod report;

/// Small shared helpers: hex parsing, cancellation.
pub mod utils;

/// `heapscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`], used throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `heapscope` Error type
///
/// Covers configuration, precondition, sink lifecycle and destination setup
/// failures. Recoverable per-item conditions never surface here.
pub use error::Error;

/// The two report orchestrators and the pass outcome.
pub use engine::{GcHandleReportEngine, HeapExportEngine, ScanOutcome};

/// The selectable output formats.
pub use report::OutputFormat;
