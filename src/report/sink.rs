//! The streaming table sink and its output encodings.
//!
//! A [`TableSink`] renders one report through the
//! `write_header` / `write_row` / `write_footer` lifecycle. Only the row
//! currently being encoded is buffered; everything else goes straight to the
//! [`OutputRouter`](crate::report::OutputRouter).
//!
//! # Encodings
//!
//! - *Console*: values padded to their column display width, space-joined.
//! - *Delimited* (comma or tab): values joined by the separator, one line per
//!   row. The separator is never escaped or quoted inside values — a known
//!   limitation of the format, kept as-is.
//! - *Structured*: a single top-level bracketed sequence of bracketed field
//!   maps, using the header titles as field names. Values are quoted as text
//!   except [`ColumnFormat::Integer`] numbers; no separator before the first
//!   row or after the last; no pretty-printing.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::{
    report::{destination::OutputRouter, Cell, ColumnFormat},
    Error, Result,
};

/// The closed set of selectable output formats.
///
/// Parsing is case-insensitive and accepts the short aliases `csv`, `tab` and
/// `json`; anything else is [`Error::InvalidOutputFormat`], never a silent
/// default.
///
/// # Examples
///
/// ```rust
/// use heapscope::OutputFormat;
///
/// let format = OutputFormat::parse_selector("csv")?;
/// assert_eq!(format, OutputFormat::CommaDelimited);
/// assert!(OutputFormat::parse_selector("yaml").is_err());
/// # Ok::<(), heapscope::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum OutputFormat {
    /// Width-padded plain text for terminals.
    Console,
    /// Comma-separated values.
    #[strum(serialize = "CommaDelimited", serialize = "csv")]
    CommaDelimited,
    /// Tab-separated values.
    #[strum(serialize = "TabDelimited", serialize = "tab")]
    TabDelimited,
    /// Bracketed-object sequence (JSON-shaped).
    #[strum(serialize = "Structured", serialize = "json")]
    Structured,
}

impl OutputFormat {
    /// Parse a user-supplied format selector, surfacing the crate error type.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOutputFormat`] for unrecognized names.
    pub fn parse_selector(name: &str) -> Result<Self> {
        OutputFormat::from_str(name).map_err(|_| Error::InvalidOutputFormat(name.to_string()))
    }

    fn encoding(self) -> TableEncoding {
        match self {
            OutputFormat::Console => TableEncoding::Console,
            OutputFormat::CommaDelimited => TableEncoding::Delimited(','),
            OutputFormat::TabDelimited => TableEncoding::Delimited('\t'),
            OutputFormat::Structured => TableEncoding::Structured,
        }
    }
}

/// How rows are encoded on the wire. Exactly these cases exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableEncoding {
    Console,
    Delimited(char),
    Structured,
}

/// Row-oriented streaming writer over a destination set.
///
/// The lifecycle is enforced: the header must be written exactly once before
/// any row, the footer exactly once after all rows. Violations surface as
/// [`Error::TableProtocol`]; they indicate a driver bug, not bad input.
pub struct TableSink<'a> {
    router: &'a OutputRouter,
    encoding: TableEncoding,
    columns: Vec<ColumnFormat>,
    titles: Vec<String>,
    rows_emitted: u32,
    header_written: bool,
    footer_written: bool,
}

impl<'a> TableSink<'a> {
    /// Create a sink for `format` with the given column specs, writing
    /// through `router`.
    #[must_use]
    pub fn new(format: OutputFormat, columns: Vec<ColumnFormat>, router: &'a OutputRouter) -> Self {
        TableSink {
            router,
            encoding: format.encoding(),
            columns,
            titles: Vec::new(),
            rows_emitted: 0,
            header_written: false,
            footer_written: false,
        }
    }

    /// Number of rows written so far.
    #[must_use]
    pub fn rows_emitted(&self) -> u32 {
        self.rows_emitted
    }

    /// Write the header. Titles double as field names in the structured
    /// encoding.
    ///
    /// # Errors
    /// Returns [`Error::TableProtocol`] if a header was already written.
    pub fn write_header(&mut self, titles: &[&str]) -> Result<()> {
        if self.header_written {
            return Err(Error::TableProtocol("header written twice"));
        }
        self.header_written = true;
        self.titles = titles.iter().map(|title| (*title).to_string()).collect();

        match self.encoding {
            TableEncoding::Console => {
                let line = self
                    .titles
                    .iter()
                    .enumerate()
                    .map(|(i, title)| pad(title, self.column_width(i)))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.router.write_line(line.trim_end());
            }
            TableEncoding::Delimited(separator) => {
                let line = self.titles.join(&separator.to_string());
                self.router.write_line(&line);
            }
            TableEncoding::Structured => {
                self.router.write_raw("[");
            }
        }
        Ok(())
    }

    /// Write one row. Values beyond the declared column count render with the
    /// default text format.
    ///
    /// # Errors
    /// Returns [`Error::TableProtocol`] if called before the header or after
    /// the footer.
    pub fn write_row(&mut self, cells: &[Cell]) -> Result<()> {
        if !self.header_written {
            return Err(Error::TableProtocol("row written before header"));
        }
        if self.footer_written {
            return Err(Error::TableProtocol("row written after footer"));
        }

        match self.encoding {
            TableEncoding::Console => {
                let line = cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| pad(&self.column(i).render(cell), self.column_width(i)))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.router.write_line(line.trim_end());
            }
            TableEncoding::Delimited(separator) => {
                let line = cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| self.column(i).render(cell))
                    .collect::<Vec<_>>()
                    .join(&separator.to_string());
                self.router.write_line(&line);
            }
            TableEncoding::Structured => {
                let mut row = String::new();
                if self.rows_emitted > 0 {
                    row.push(',');
                }
                row.push('{');
                for (i, cell) in cells.iter().enumerate() {
                    if i > 0 {
                        row.push(',');
                    }
                    let name = self.titles.get(i).map_or("", String::as_str);
                    row.push_str(&json_text(name));
                    row.push(':');

                    let column = self.column(i);
                    match cell {
                        Cell::Number(value) if column.is_bare_numeric() => {
                            row.push_str(&value.to_string());
                        }
                        _ => row.push_str(&json_text(&column.render(cell))),
                    }
                }
                row.push('}');
                self.router.write_raw(&row);
            }
        }

        self.rows_emitted += 1;
        Ok(())
    }

    /// Write the footer and flush every destination. This is the only point
    /// at which a file-backed destination is considered complete.
    ///
    /// # Errors
    /// Returns [`Error::TableProtocol`] if called before the header or twice.
    pub fn write_footer(&mut self) -> Result<()> {
        if !self.header_written {
            return Err(Error::TableProtocol("footer written before header"));
        }
        if self.footer_written {
            return Err(Error::TableProtocol("footer written twice"));
        }
        self.footer_written = true;

        if self.encoding == TableEncoding::Structured {
            self.router.write_raw("]");
        }
        self.router.flush_all();
        Ok(())
    }

    /// Column spec for index `i`, falling back to the default text format for
    /// values beyond the declared columns.
    fn column(&self, i: usize) -> ColumnFormat {
        self.columns.get(i).copied().unwrap_or(ColumnFormat::Text)
    }

    fn column_width(&self, i: usize) -> usize {
        self.column(i).display_width()
    }
}

/// Left-align `text` in a field of `width` (0 = natural width).
fn pad(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

/// JSON-escape `text` as a quoted string.
fn json_text(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
