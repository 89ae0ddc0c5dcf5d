//! Adjacency fragmentation detection.
//!
//! A single stateful pass over the (ascending-address) object stream that
//! reports every sufficiently large free block immediately followed — with no
//! gap — by a valid live object in a normally-collected segment. One candidate
//! free block is held at a time: a new qualifying free block overwrites it,
//! any other intervening item clears it. Confirmed blocks are appended in
//! discovery order and never revisited.

use crate::{
    heap::{
        resolve_or_recover_type_handle, HeapSource, ObjectDescriptor, SegmentKind,
        UNKNOWN_TYPE_NAME,
    },
    report::{Cell, ColumnFormat, TableSink},
    Result,
};

use super::Strategy;

/// A confirmed free-block/live-block adjacency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentationBlock {
    /// Start address of the free block.
    pub free_address: u64,
    /// Size of the free block in bytes.
    pub free_size: u64,
    /// Start address of the object immediately following the free block.
    pub next_object_address: u64,
    /// Display name of that object's type.
    pub next_object_type: String,
}

/// Accumulator for the fragmentation report.
pub(crate) struct FragmentationScan {
    threshold: u64,
    candidate: Option<(u64, u64)>,
    blocks: Vec<FragmentationBlock>,
}

impl FragmentationScan {
    pub(crate) fn new(threshold: u64) -> Self {
        FragmentationScan {
            threshold,
            candidate: None,
            blocks: Vec::new(),
        }
    }

    /// Feed one stream item through the candidate/confirm state machine.
    fn record(&mut self, item: &ObjectDescriptor, source: &dyn HeapSource) {
        if item.is_free {
            // a qualifying free block becomes (or replaces) the candidate;
            // an undersized one breaks any adjacency being tracked
            self.candidate = (item.size >= self.threshold).then_some((item.address, item.size));
            return;
        }

        if let Some((free_address, free_size)) = self.candidate.take() {
            if item.is_valid
                && free_address.saturating_add(free_size) == item.address
                && source
                    .segment_kind(item.address)
                    .is_some_and(SegmentKind::is_normally_collected)
            {
                self.blocks.push(FragmentationBlock {
                    free_address,
                    free_size,
                    next_object_address: item.address,
                    next_object_type: following_type_name(item, source),
                });
            }
        }
    }

    /// Confirmed blocks in discovery order.
    pub(crate) fn blocks(&self) -> &[FragmentationBlock] {
        &self.blocks
    }
}

impl Strategy for FragmentationScan {
    fn titles(&self) -> &'static [&'static str] {
        &["FreeBlock", "FreeSize", "NextObject", "NextObjectType"]
    }

    fn columns(&self) -> Vec<ColumnFormat> {
        vec![
            ColumnFormat::Address { width: 16 },
            ColumnFormat::Integer,
            ColumnFormat::Address { width: 16 },
            ColumnFormat::TypeName,
        ]
    }

    fn accept(
        &mut self,
        item: &ObjectDescriptor,
        source: &dyn HeapSource,
        _sink: &mut TableSink,
    ) -> Result<()> {
        self.record(item, source);
        Ok(())
    }

    fn finish(&mut self, sink: &mut TableSink) -> Result<()> {
        for block in self.blocks.drain(..) {
            sink.write_row(&[
                Cell::Number(block.free_address),
                Cell::Number(block.free_size),
                Cell::Number(block.next_object_address),
                Cell::Text(block.next_object_type),
            ])?;
        }
        Ok(())
    }
}

/// Display name of the object following a candidate block, falling back to
/// handle resolution and finally the placeholder.
fn following_type_name(item: &ObjectDescriptor, source: &dyn HeapSource) -> String {
    item.type_name
        .clone()
        .or_else(|| {
            resolve_or_recover_type_handle(item, source)
                .and_then(|handle| source.resolve_type_name(handle))
        })
        .unwrap_or_else(|| UNKNOWN_TYPE_NAME.to_string())
}
