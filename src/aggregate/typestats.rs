//! Keyed per-type statistics.
//!
//! Buckets surviving items by their resolved (or recovered) type handle into
//! `{count, cumulative size, display name}` aggregates, the streaming
//! replacement for what a reflection-style implementation would do with
//! dynamically typed dictionaries. Exactly one aggregate exists per distinct
//! handle; counts and sizes only grow during the pass.

use std::collections::HashMap;

use crate::{
    heap::{resolve_or_recover_type_handle, HeapSource, ObjectDescriptor, UNKNOWN_TYPE_NAME},
    report::{Cell, ColumnFormat, TableSink},
    Result,
};

use super::Strategy;

/// Running per-type summary built during a single pass.
#[derive(Debug, Clone)]
pub struct TypeAggregate {
    /// The keying type handle; 0 when neither resolution nor recovery
    /// produced one.
    pub type_handle: u64,
    /// Number of surviving objects of this type.
    pub count: u32,
    /// Sum of their declared sizes in bytes.
    pub cumulative_size: u64,
    /// Display name, `"UNKNOWN"` when unresolvable.
    pub display_name: String,
    /// Discovery index, for stable ordering among equal sizes.
    order: u32,
}

/// Accumulator for the type-statistics report.
pub(crate) struct TypeStatistics {
    buckets: HashMap<u64, TypeAggregate>,
    discovered: u32,
}

impl TypeStatistics {
    pub(crate) fn new() -> Self {
        TypeStatistics {
            buckets: HashMap::new(),
            discovered: 0,
        }
    }

    /// Insert-or-update the aggregate for one item. Shared with the handle
    /// report engine, which feeds handle *targets* through the same buckets.
    pub(crate) fn record(&mut self, item: &ObjectDescriptor, source: &dyn HeapSource) {
        let handle = resolve_or_recover_type_handle(item, source).unwrap_or(0);

        let aggregate = self.buckets.entry(handle).or_insert_with(|| {
            let display_name = item
                .type_name
                .clone()
                .or_else(|| (handle != 0).then(|| source.resolve_type_name(handle)).flatten())
                .unwrap_or_else(|| UNKNOWN_TYPE_NAME.to_string());
            let order = self.discovered;
            self.discovered += 1;
            TypeAggregate {
                type_handle: handle,
                count: 0,
                cumulative_size: 0,
                display_name,
                order,
            }
        });
        aggregate.count += 1;
        aggregate.cumulative_size += item.size;
    }

    /// Drain the buckets sorted by cumulative size ascending, discovery order
    /// among ties.
    pub(crate) fn into_sorted(self) -> Vec<TypeAggregate> {
        let mut aggregates: Vec<TypeAggregate> = self.buckets.into_values().collect();
        aggregates.sort_by_key(|aggregate| (aggregate.cumulative_size, aggregate.order));
        aggregates
    }

    /// Emit the sorted aggregates as rows.
    pub(crate) fn emit(self, sink: &mut TableSink) -> Result<()> {
        for aggregate in self.into_sorted() {
            sink.write_row(&[
                Cell::Number(aggregate.type_handle),
                Cell::Number(u64::from(aggregate.count)),
                Cell::Number(aggregate.cumulative_size),
                Cell::Text(aggregate.display_name),
            ])?;
        }
        Ok(())
    }

    pub(crate) fn stat_titles() -> &'static [&'static str] {
        &["TypeHandle", "Count", "TotalSize", "TypeName"]
    }

    pub(crate) fn stat_columns() -> Vec<ColumnFormat> {
        vec![
            ColumnFormat::Address { width: 16 },
            ColumnFormat::Count { width: 12 },
            ColumnFormat::Integer,
            ColumnFormat::TypeName,
        ]
    }
}

impl Strategy for TypeStatistics {
    fn titles(&self) -> &'static [&'static str] {
        TypeStatistics::stat_titles()
    }

    fn columns(&self) -> Vec<ColumnFormat> {
        TypeStatistics::stat_columns()
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
        std::mem::replace(self, TypeStatistics::new()).emit(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::FakeHeap;

    #[test]
    fn counts_and_sizes_are_conserved() {
        let mut heap = FakeHeap::new();
        heap.push_named_type(0x10, "T");
        heap.push_named_type(0x20, "U");

        let items = [
            ObjectDescriptor::new(0x1000, Some(0x10), 16),
            ObjectDescriptor::new(0x2000, Some(0x10), 32),
            ObjectDescriptor::new(0x3000, Some(0x20), 8),
            ObjectDescriptor::new(0x4000, Some(0x10), 48),
        ];

        let mut stats = TypeStatistics::new();
        for item in &items {
            stats.record(item, &heap);
        }

        let aggregates = stats.into_sorted();
        let total_count: u32 = aggregates.iter().map(|a| a.count).sum();
        let total_size: u64 = aggregates.iter().map(|a| a.cumulative_size).sum();
        assert_eq!(total_count, 4);
        assert_eq!(total_size, 16 + 32 + 8 + 48);
    }

    #[test]
    fn sorted_by_cumulative_size_ascending() {
        let mut heap = FakeHeap::new();
        heap.push_named_type(0x10, "T");
        heap.push_named_type(0x20, "U");

        let mut stats = TypeStatistics::new();
        for item in [
            ObjectDescriptor::new(0x1000, Some(0x10), 16),
            ObjectDescriptor::new(0x2000, Some(0x10), 32),
            ObjectDescriptor::new(0x3000, Some(0x10), 48),
            ObjectDescriptor::new(0x4000, Some(0x20), 8),
        ] {
            stats.record(&item, &heap);
        }

        let aggregates = stats.into_sorted();
        assert_eq!(aggregates.len(), 2);
        assert_eq!(aggregates[0].display_name, "U");
        assert_eq!(aggregates[0].count, 1);
        assert_eq!(aggregates[0].cumulative_size, 8);
        assert_eq!(aggregates[1].display_name, "T");
        assert_eq!(aggregates[1].count, 3);
        assert_eq!(aggregates[1].cumulative_size, 96);
    }

    #[test]
    fn equal_sizes_keep_discovery_order() {
        let heap = FakeHeap::new();
        let mut stats = TypeStatistics::new();
        for item in [
            ObjectDescriptor::new(0x1000, Some(0x30), 24),
            ObjectDescriptor::new(0x2000, Some(0x40), 24),
            ObjectDescriptor::new(0x3000, Some(0x50), 24),
        ] {
            stats.record(&item, &heap);
        }

        let handles: Vec<u64> = stats.into_sorted().iter().map(|a| a.type_handle).collect();
        assert_eq!(handles, vec![0x30, 0x40, 0x50]);
    }

    #[test]
    fn recovery_and_placeholder_paths() {
        let mut heap = FakeHeap::new();
        heap.push_named_type(0xABCD, "Recovered");
        heap.pointers.insert(0x1000, 0xABCD);

        let mut stats = TypeStatistics::new();
        // recovers 0xABCD via the pointer read
        stats.record(&ObjectDescriptor::new(0x1000, None, 16), &heap);
        // unreadable: buckets under handle 0 with the placeholder name
        stats.record(&ObjectDescriptor::new(0x9000, None, 8), &heap);

        let aggregates = stats.into_sorted();
        assert_eq!(aggregates.len(), 2);
        let unknown = aggregates.iter().find(|a| a.type_handle == 0).unwrap();
        assert_eq!(unknown.display_name, "UNKNOWN");
        let recovered = aggregates.iter().find(|a| a.type_handle == 0xABCD).unwrap();
        assert_eq!(recovered.display_name, "Recovered");
    }
}
