//! The GC handle report engine.

use std::collections::HashMap;
use std::path::Path;

use strum::IntoEnumIterator;

use crate::{
    aggregate::TypeStatistics,
    engine::{heap::shaped_columns, ScanOutcome},
    heap::{
        resolve_or_recover_type_handle, HandleDescriptor, HandleKind, HeapSource,
        ObjectDescriptor, UNKNOWN_TYPE_NAME,
    },
    report::{Cell, ColumnFormat, OutputFormat, OutputRouter, TableSink},
    utils::CancellationToken,
    Result,
};

/// Which shape the handle report takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleReport {
    /// One row per handle, in table order.
    Listing,
    /// Per-type statistics over the handles' target objects.
    TargetTypeStatistics,
    /// Handle counts per [`HandleKind`].
    KindTotals,
}

/// Orchestrator for GC handle table reports.
///
/// A sibling of [`HeapExportEngine`](crate::engine::HeapExportEngine) over
/// the handle stream, sharing the column formats and the streaming sink.
pub struct GcHandleReportEngine<'a> {
    source: &'a dyn HeapSource,
    report: HandleReport,
    format: OutputFormat,
}

impl<'a> GcHandleReportEngine<'a> {
    /// Create an engine over `source` with the listing report and console
    /// output.
    #[must_use]
    pub fn new(source: &'a dyn HeapSource) -> Self {
        GcHandleReportEngine {
            source,
            report: HandleReport::Listing,
            format: OutputFormat::Console,
        }
    }

    /// Select the report shape.
    #[must_use]
    pub fn with_report(mut self, report: HandleReport) -> Self {
        self.report = report;
        self
    }

    /// Select the output format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Run one pass over the handle table, writing through the caller's
    /// destination set. Same footer and cancellation contract as the heap
    /// engine.
    ///
    /// # Errors
    /// Returns an error only for sink lifecycle misuse; per-handle conditions
    /// never abort the pass.
    pub fn run(&self, router: &OutputRouter, token: &CancellationToken) -> Result<ScanOutcome> {
        match self.report {
            HandleReport::Listing => self.run_listing(router, token),
            HandleReport::TargetTypeStatistics => self.run_target_stats(router, token),
            HandleReport::KindTotals => self.run_kind_totals(router, token),
        }
    }

    /// Run one pass to the console, or to `destination` when given.
    ///
    /// # Errors
    /// Propagates [`run`](GcHandleReportEngine::run) errors, plus
    /// [`Error::FileError`](crate::Error::FileError) if the destination
    /// cannot be created.
    pub fn export(
        &self,
        destination: Option<&Path>,
        token: &CancellationToken,
    ) -> Result<ScanOutcome> {
        match destination {
            Some(path) => {
                let router = OutputRouter::new();
                let file = router.enable_file(path)?;
                let outcome = self.run(&router, token)?;
                file.disable();
                Ok(outcome)
            }
            None => self.run(&OutputRouter::console(), token),
        }
    }

    fn run_listing(&self, router: &OutputRouter, token: &CancellationToken) -> Result<ScanOutcome> {
        let columns = vec![
            ColumnFormat::Address { width: 16 },
            ColumnFormat::Text,
            ColumnFormat::Address { width: 16 },
            ColumnFormat::TypeName,
            ColumnFormat::Text,
        ];
        let mut sink = TableSink::new(self.format, shaped_columns(columns, self.format), router);
        sink.write_header(&["Handle", "Kind", "Target", "TargetType", "Dependent"])?;

        let mut items_seen: u64 = 0;
        for handle in self.source.handles() {
            if token.is_cancelled() {
                router.flush_all();
                return Ok(ScanOutcome::Cancelled { items_seen });
            }
            items_seen += 1;

            sink.write_row(&[
                Cell::Number(handle.handle_address),
                Cell::Text(handle.kind.to_string()),
                Cell::Number(handle.target.address),
                Cell::Text(target_type_name(&handle.target, self.source)),
                dependent_cell(&handle),
            ])?;
        }

        if token.is_cancelled() {
            router.flush_all();
            return Ok(ScanOutcome::Cancelled { items_seen });
        }

        sink.write_footer()?;
        Ok(ScanOutcome::Completed {
            rows_written: sink.rows_emitted(),
        })
    }

    fn run_target_stats(
        &self,
        router: &OutputRouter,
        token: &CancellationToken,
    ) -> Result<ScanOutcome> {
        let mut stats = TypeStatistics::new();
        let mut sink = TableSink::new(
            self.format,
            shaped_columns(TypeStatistics::stat_columns(), self.format),
            router,
        );
        sink.write_header(TypeStatistics::stat_titles())?;

        let mut items_seen: u64 = 0;
        for handle in self.source.handles() {
            if token.is_cancelled() {
                router.flush_all();
                return Ok(ScanOutcome::Cancelled { items_seen });
            }
            items_seen += 1;
            stats.record(&handle.target, self.source);
        }

        if token.is_cancelled() {
            router.flush_all();
            return Ok(ScanOutcome::Cancelled { items_seen });
        }

        stats.emit(&mut sink)?;
        sink.write_footer()?;
        Ok(ScanOutcome::Completed {
            rows_written: sink.rows_emitted(),
        })
    }

    fn run_kind_totals(
        &self,
        router: &OutputRouter,
        token: &CancellationToken,
    ) -> Result<ScanOutcome> {
        let columns = vec![ColumnFormat::Text, ColumnFormat::Count { width: 12 }];
        let mut sink = TableSink::new(self.format, shaped_columns(columns, self.format), router);
        sink.write_header(&["Kind", "Count"])?;

        let mut totals: HashMap<HandleKind, u64> = HashMap::new();
        let mut items_seen: u64 = 0;
        for handle in self.source.handles() {
            if token.is_cancelled() {
                router.flush_all();
                return Ok(ScanOutcome::Cancelled { items_seen });
            }
            items_seen += 1;
            *totals.entry(handle.kind).or_insert(0) += 1;
        }

        if token.is_cancelled() {
            router.flush_all();
            return Ok(ScanOutcome::Cancelled { items_seen });
        }

        // declaration order, observed kinds only
        for kind in HandleKind::iter() {
            if let Some(count) = totals.get(&kind) {
                sink.write_row(&[Cell::Text(kind.to_string()), Cell::Number(*count)])?;
            }
        }

        sink.write_footer()?;
        Ok(ScanOutcome::Completed {
            rows_written: sink.rows_emitted(),
        })
    }
}

/// Display name of a handle's target, falling back to handle resolution and
/// finally the placeholder.
fn target_type_name(target: &ObjectDescriptor, source: &dyn HeapSource) -> String {
    target
        .type_name
        .clone()
        .or_else(|| {
            resolve_or_recover_type_handle(target, source)
                .and_then(|handle| source.resolve_type_name(handle))
        })
        .unwrap_or_else(|| UNKNOWN_TYPE_NAME.to_string())
}

/// The dependent-target column: the secondary target's address, or empty for
/// every other handle kind.
fn dependent_cell(handle: &HandleDescriptor) -> Cell {
    match &handle.dependent_target {
        Some(dependent) => Cell::Text(format!("{:016x}", dependent.address)),
        None => Cell::Text(String::new()),
    }
}
