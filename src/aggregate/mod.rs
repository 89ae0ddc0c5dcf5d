//! Aggregation strategies for the export pass.
//!
//! Each strategy is a small state machine: empty accumulator in, rendered
//! table out, with no observable intermediate states. The engine routes every
//! surviving stream item into the selected strategy and asks it to finish once
//! the stream is exhausted.
//!
//! # Key Components
//!
//! - [`HeapReport`] - Caller-facing selection of the aggregation mode
//! - [`TypeAggregate`] - Per-type count/size buckets
//! - [`ValueAggregate`] - Per-(string value, size) buckets
//! - [`FragmentationBlock`] - Confirmed free-block/live-block adjacencies

mod fragmentation;
mod typestats;
mod valuestats;

pub use fragmentation::FragmentationBlock;
pub(crate) use fragmentation::FragmentationScan;
pub use typestats::TypeAggregate;
pub(crate) use typestats::TypeStatistics;
pub use valuestats::ValueAggregate;
pub(crate) use valuestats::ValueStatistics;

use crate::{
    heap::{HeapSource, ObjectDescriptor},
    report::{Cell, ColumnFormat, TableSink},
    Result,
};

/// Default truncation length for string payloads, in UTF-16 code units.
pub const DEFAULT_STRING_LENGTH: usize = 128;

/// Default minimum free-block size considered by fragmentation detection.
pub const DEFAULT_FRAGMENTATION_THRESHOLD: u64 = 512 * 1024;

/// Which aggregation the heap export engine runs over the surviving stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapReport {
    /// One row per surviving object, in stream order.
    Listing,
    /// Per-type count and cumulative size, sorted by cumulative size.
    TypeStatistics,
    /// Per-(value, size) string statistics, sorted by `count x size`.
    StringStatistics {
        /// Truncation length in UTF-16 code units; longer payloads are cut,
        /// never rejected.
        max_length: usize,
    },
    /// Free-block/live-block adjacency detection.
    Fragmentation {
        /// Minimum free-block size to consider, in bytes.
        min_block_size: u64,
    },
}

impl HeapReport {
    /// Reject nonsensical mode parameters before the stream is touched.
    ///
    /// # Errors
    /// Returns [`Error::Config`](crate::Error::Config) for a zero truncation
    /// length or a zero fragmentation threshold.
    pub fn validate(&self) -> Result<()> {
        match self {
            HeapReport::StringStatistics { max_length: 0 } => Err(config_error!(
                "string statistics truncation length must be nonzero"
            )),
            HeapReport::Fragmentation { min_block_size: 0 } => Err(config_error!(
                "fragmentation threshold must be nonzero"
            )),
            _ => Ok(()),
        }
    }

    /// Instantiate the accumulator for this report mode.
    pub(crate) fn strategy(&self) -> Box<dyn Strategy> {
        match self {
            HeapReport::Listing => Box::new(Listing),
            HeapReport::TypeStatistics => Box::new(TypeStatistics::new()),
            HeapReport::StringStatistics { max_length } => {
                Box::new(ValueStatistics::new(*max_length))
            }
            HeapReport::Fragmentation { min_block_size } => {
                Box::new(FragmentationScan::new(*min_block_size))
            }
        }
    }
}

/// One aggregation mode of the export pass.
///
/// `accept` is called once per surviving item; `finish` once after the stream
/// is exhausted. Pass-through strategies write rows from `accept`, aggregating
/// strategies from `finish` — the sink sees a single consistent
/// header/row/footer lifecycle either way.
pub(crate) trait Strategy {
    /// Header titles, which double as structured field names.
    fn titles(&self) -> &'static [&'static str];

    /// Column formatting rules, one per title.
    fn columns(&self) -> Vec<ColumnFormat>;

    /// Route one surviving item into the accumulator (or straight to the
    /// sink).
    fn accept(
        &mut self,
        item: &ObjectDescriptor,
        source: &dyn HeapSource,
        sink: &mut TableSink,
    ) -> Result<()>;

    /// Emit whatever the accumulator holds. Called exactly once, after the
    /// stream completed without cancellation.
    fn finish(&mut self, sink: &mut TableSink) -> Result<()>;
}

/// Pass-through: each surviving object becomes a row immediately.
struct Listing;

impl Strategy for Listing {
    fn titles(&self) -> &'static [&'static str] {
        &["Address", "TypeHandle", "Size", "Free"]
    }

    fn columns(&self) -> Vec<ColumnFormat> {
        vec![
            ColumnFormat::Address { width: 16 },
            ColumnFormat::Address { width: 16 },
            ColumnFormat::Integer,
            ColumnFormat::Text,
        ]
    }

    fn accept(
        &mut self,
        item: &ObjectDescriptor,
        _source: &dyn HeapSource,
        sink: &mut TableSink,
    ) -> Result<()> {
        sink.write_row(&[
            Cell::Number(item.address),
            Cell::Number(item.type_handle.unwrap_or(0)),
            Cell::Number(item.size),
            Cell::Text(if item.is_free { "Free".to_string() } else { String::new() }),
        ])
    }

    fn finish(&mut self, _sink: &mut TableSink) -> Result<()> {
        Ok(())
    }
}
