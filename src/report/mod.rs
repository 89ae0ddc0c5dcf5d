//! Streaming, format-pluggable table rendering.
//!
//! Reports render incrementally: the sink buffers only the row being written,
//! so a report over millions of heap entries never materializes in memory.
//!
//! # Key Components
//!
//! - [`ColumnFormat`] / [`Cell`] - Pure per-value formatting rules
//! - [`OutputFormat`] - The closed set of selectable encodings
//! - [`TableSink`] - The header/row/footer lifecycle over a destination set
//! - [`OutputRouter`] / [`FileDestination`] - Concurrently mutable destination
//!   list with an owned guard for the single active file destination

mod column;
mod destination;
mod sink;

pub use column::{Cell, ColumnFormat};
pub use destination::{FileDestination, OutputRouter};
pub use sink::{OutputFormat, TableSink};
