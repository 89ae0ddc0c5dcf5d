use thiserror::Error;

macro_rules! config_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Config {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Config {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Per the propagation policy of the export pipeline, only configuration and precondition
/// failures surface through this type. Recoverable per-item conditions (an unresolved type
/// handle, a failed pointer-read recovery, a truncated string payload) are absorbed where they
/// occur, and destination write failures are swallowed per destination per write. Cancellation
/// is not an error at all — it surfaces as
/// [`ScanOutcome::Cancelled`](crate::engine::ScanOutcome::Cancelled).
///
/// # Error Categories
///
/// ## Configuration Errors
/// - [`Error::InvalidOutputFormat`] - Unrecognized output-format name
/// - [`Error::InvalidAddress`] - Malformed hexadecimal address or filter argument
/// - [`Error::Config`] - Other malformed report configuration
///
/// ## Precondition Errors
/// - [`Error::HeapNotWalkable`] - Snapshot heap not in a walkable state
///
/// ## Usage and I/O Errors
/// - [`Error::TableProtocol`] - Header/row/footer lifecycle violated on a table sink
/// - [`Error::FileError`] - Filesystem I/O errors while establishing a destination
///
/// # Examples
///
/// ```rust
/// use heapscope::OutputFormat;
///
/// match "yaml".parse::<OutputFormat>() {
///     Ok(format) => println!("selected {format}"),
///     Err(_) => eprintln!("not a recognized output format"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The requested output format is not one of the supported set.
    ///
    /// Output-format selection is validated against the closed set
    /// {Console, CommaDelimited, TabDelimited, Structured}; an unrecognized
    /// name is a configuration error, never silently defaulted.
    #[error("Unrecognized output format - {0}")]
    InvalidOutputFormat(String),

    /// An address or filter argument failed to parse as hexadecimal.
    ///
    /// Detected when the filter chain is built, before the object stream is
    /// touched — malformed configuration never fails mid-stream.
    #[error("Malformed hexadecimal value - {0}")]
    InvalidAddress(String),

    /// The report configuration is malformed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file in which the error was detected
    /// * `line` - Source line in which the error was detected
    #[error("Config - {file}:{line}: {message}")]
    Config {
        /// The message to be printed for the Config error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The snapshot heap is not in a walkable state.
    ///
    /// Enumeration is refused before it begins unless the caller explicitly
    /// overrides the check.
    #[error("The heap is not in a walkable state (use force to override)")]
    HeapNotWalkable,

    /// The table sink lifecycle was violated.
    ///
    /// The header must be written exactly once before any row, and the footer
    /// exactly once after all rows.
    #[error("Table protocol violation - {0}")]
    TableProtocol(&'static str),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors encountered while opening or creating an
    /// output destination. Write failures on an established destination are
    /// never surfaced here; they are dropped per destination.
    #[error("{0}")]
    FileError(#[from] std::io::Error),
}
