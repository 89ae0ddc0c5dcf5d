//! Keyed string-value statistics.
//!
//! Buckets surviving string objects by their `(raw value, size)` pair. The
//! payload is decoded from UTF-16 and truncated at a configured length —
//! truncated, never rejected. Sanitization for display happens at render time
//! only and never touches the grouping key, so two raw values that sanitize to
//! the same text still count separately.

use std::collections::HashMap;

use widestring::U16Str;

use crate::{
    heap::{HeapSource, ObjectDescriptor},
    report::{Cell, ColumnFormat, TableSink},
    Result,
};

use super::Strategy;

/// Character substituted for everything that is not alphanumeric, punctuation
/// or space when a value is sanitized for display.
const SANITIZE_PLACEHOLDER: char = '.';

/// Running per-(value, size) summary built during a single pass.
#[derive(Debug, Clone)]
pub struct ValueAggregate {
    /// The raw (unsanitized) decoded value.
    pub value: String,
    /// Declared object size of every member of this bucket.
    pub size: u64,
    /// Number of surviving objects with this exact value and size.
    pub count: u32,
    /// Discovery index, for stable ordering among equal weights.
    order: u32,
}

impl ValueAggregate {
    /// Weight used for output ordering: `count x size`.
    fn weight(&self) -> u128 {
        u128::from(self.count) * u128::from(self.size)
    }
}

/// Accumulator for the string-statistics report.
pub(crate) struct ValueStatistics {
    max_length: usize,
    buckets: HashMap<(String, u64), ValueAggregate>,
    discovered: u32,
}

impl ValueStatistics {
    pub(crate) fn new(max_length: usize) -> Self {
        ValueStatistics {
            max_length,
            buckets: HashMap::new(),
            discovered: 0,
        }
    }

    /// Decode and bucket one item. Items whose payload cannot be read are
    /// skipped; a short read is a valid (truncated) value.
    fn record(&mut self, item: &ObjectDescriptor, source: &dyn HeapSource) {
        let Ok(units) = source.read_string_payload(item.address, self.max_length) else {
            return;
        };
        let value = U16Str::from_slice(&units).to_string_lossy();

        let aggregate = self
            .buckets
            .entry((value, item.size))
            .or_insert_with_key(|(value, size)| {
                let order = self.discovered;
                self.discovered += 1;
                ValueAggregate {
                    value: value.clone(),
                    size: *size,
                    count: 0,
                    order,
                }
            });
        aggregate.count += 1;
    }

    /// Drain the buckets sorted by `count x size` ascending, discovery order
    /// among ties.
    fn into_sorted(self) -> Vec<ValueAggregate> {
        let mut aggregates: Vec<ValueAggregate> = self.buckets.into_values().collect();
        aggregates.sort_by_key(|aggregate| (aggregate.weight(), aggregate.order));
        aggregates
    }
}

impl Strategy for ValueStatistics {
    fn titles(&self) -> &'static [&'static str] {
        &["Size", "Count", "Value"]
    }

    fn columns(&self) -> Vec<ColumnFormat> {
        vec![
            ColumnFormat::Integer,
            ColumnFormat::Count { width: 12 },
            ColumnFormat::Text,
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
        let max_length = self.max_length;
        let drained = std::mem::replace(self, ValueStatistics::new(max_length));
        for aggregate in drained.into_sorted() {
            sink.write_row(&[
                Cell::Number(aggregate.size),
                Cell::Number(u64::from(aggregate.count)),
                Cell::Text(sanitize(&aggregate.value)),
            ])?;
        }
        Ok(())
    }
}

/// Sanitize a value for display.
///
/// A value containing any non-alphanumeric character is rewritten in full:
/// every character that is not alphanumeric, punctuation or space becomes the
/// placeholder. Fully alphanumeric values pass through untouched.
fn sanitize(value: &str) -> String {
    if value.chars().all(char::is_alphanumeric) {
        return value.to_string();
    }
    value
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_ascii_punctuation() || c == ' ' {
                c
            } else {
                SANITIZE_PLACEHOLDER
            }
        })
        .collect()
}
