//! The heap object export engine.

use std::path::Path;

use crate::{
    aggregate::HeapReport,
    engine::ScanOutcome,
    filter::ObjectFilterChain,
    heap::HeapSource,
    report::{ColumnFormat, OutputFormat, OutputRouter, TableSink},
    utils::CancellationToken,
    Error, Result,
};

/// Orchestrator for heap object reports.
///
/// Configured builder-style, then driven with [`run`](HeapExportEngine::run)
/// (caller-supplied destinations) or [`export`](HeapExportEngine::export)
/// (console or file). An engine is reusable: each call performs one complete
/// pass with fresh accumulator state.
///
/// # Examples
///
/// ```rust,ignore
/// use heapscope::prelude::*;
///
/// let outcome = HeapExportEngine::new(&snapshot)
///     .with_report(HeapReport::TypeStatistics)
///     .with_format(OutputFormat::CommaDelimited)
///     .export(None, &CancellationToken::new())?;
/// assert!(outcome.is_completed());
/// ```
pub struct HeapExportEngine<'a> {
    source: &'a dyn HeapSource,
    chain: ObjectFilterChain,
    report: HeapReport,
    format: OutputFormat,
    force: bool,
}

impl<'a> HeapExportEngine<'a> {
    /// Create an engine over `source` with no filters, the listing report and
    /// console output.
    #[must_use]
    pub fn new(source: &'a dyn HeapSource) -> Self {
        HeapExportEngine {
            source,
            chain: ObjectFilterChain::pass_all(),
            report: HeapReport::Listing,
            format: OutputFormat::Console,
            force: false,
        }
    }

    /// Apply a filter chain to the object stream.
    #[must_use]
    pub fn with_filters(mut self, chain: ObjectFilterChain) -> Self {
        self.chain = chain;
        self
    }

    /// Select the aggregation mode.
    #[must_use]
    pub fn with_report(mut self, report: HeapReport) -> Self {
        self.report = report;
        self
    }

    /// Select the output format.
    #[must_use]
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Skip the walkable-heap precondition check.
    #[must_use]
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Run one pass, writing through the caller's destination set.
    ///
    /// On completion the sink's footer has been written exactly once. On
    /// cancellation the already-buffered output is flushed, no footer is
    /// written, and the outcome reports how many items were consumed.
    ///
    /// # Errors
    /// Returns [`Error::HeapNotWalkable`] if the heap cannot be traversed and
    /// the check was not overridden. Configuration errors surface before any
    /// output is written.
    pub fn run(&self, router: &OutputRouter, token: &CancellationToken) -> Result<ScanOutcome> {
        self.report.validate()?;
        if !self.force && !self.source.is_walkable() {
            return Err(Error::HeapNotWalkable);
        }

        let mut strategy = self.report.strategy();
        let mut sink = TableSink::new(
            self.format,
            shaped_columns(strategy.columns(), self.format),
            router,
        );

        sink.write_header(strategy.titles())?;

        let mut items_seen: u64 = 0;
        for item in self.source.objects() {
            if token.is_cancelled() {
                router.flush_all();
                return Ok(ScanOutcome::Cancelled { items_seen });
            }
            items_seen += 1;

            if !self.chain.matches(&item, self.source) {
                continue;
            }
            strategy.accept(&item, self.source, &mut sink)?;
        }

        if token.is_cancelled() {
            router.flush_all();
            return Ok(ScanOutcome::Cancelled { items_seen });
        }

        strategy.finish(&mut sink)?;
        sink.write_footer()?;
        Ok(ScanOutcome::Completed {
            rows_written: sink.rows_emitted(),
        })
    }

    /// Run one pass to the console, or to `destination` when given.
    ///
    /// The file destination is established before the pass and released right
    /// after the footer.
    ///
    /// # Errors
    /// Propagates [`run`](HeapExportEngine::run) errors, plus
    /// [`Error::FileError`] if the destination cannot be created.
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
}

/// Keep console columns padded; every other encoding consumes natural-width
/// counts (addresses stay zero-padded everywhere).
pub(crate) fn shaped_columns(columns: Vec<ColumnFormat>, format: OutputFormat) -> Vec<ColumnFormat> {
    if format == OutputFormat::Console {
        return columns;
    }
    columns
        .into_iter()
        .map(|column| match column {
            ColumnFormat::Count { .. } => ColumnFormat::Count { width: 0 },
            other => other,
        })
        .collect()
}
