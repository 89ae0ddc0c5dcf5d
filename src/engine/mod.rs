//! Report orchestration engines.
//!
//! An engine drives one single forward pass: it checks preconditions, runs the
//! filter chain over the incoming stream, routes each surviving item into the
//! selected aggregation strategy, and renders through the streaming table
//! sink. Cancellation is polled once per incoming item — not once per output
//! row, since under the keyed strategies many items map to the same row.
//!
//! # Key Components
//!
//! - [`HeapExportEngine`] - Reports over the heap object stream
//! - [`GcHandleReportEngine`] - Reports over the GC handle table
//! - [`ScanOutcome`] - Distinguishes normal completion from cancellation

mod handles;
mod heap;

pub use handles::{GcHandleReportEngine, HandleReport};
pub use heap::HeapExportEngine;

/// Terminal state of a report pass.
///
/// Cancellation is a distinct outcome from both success and failure: a
/// cancelled pass returns `Ok(ScanOutcome::Cancelled { .. })`, leaving the
/// destination flushed but without a footer. Errors (`Err`) are reserved for
/// configuration and precondition failures detected before the stream is
/// touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The stream was fully consumed and the footer written.
    Completed {
        /// Total rows emitted through the sink.
        rows_written: u32,
    },
    /// Cancellation was observed between items; no footer was written.
    Cancelled {
        /// Items consumed from the stream before the signal was observed.
        items_seen: u64,
    },
}

impl ScanOutcome {
    /// Whether the pass ran to completion.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, ScanOutcome::Completed { .. })
    }
}
