//! The destination set behind a table sink.
//!
//! A report can mirror to several destinations at once (console plus a file,
//! or arbitrary writers in tests). The set is concurrently mutable:
//! collaborators may enable or disable the file destination while a pass is
//! writing, so the writer list lives in a [`DashMap`] — a writer disappearing
//! mid-iteration is skipped, never a reason to lock the whole list or abort
//! the report.
//!
//! # Write Failure Policy
//!
//! A destination that has been closed or become unwritable silently drops that
//! write; the remaining destinations still receive it. No retry is attempted.
//!
//! # Thread Safety
//!
//! All operations take `&self`; identifiers are allocated atomically and the
//! single active file destination is coordinated through an atomic slot.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;

use crate::Result;

/// No active file destination.
const NO_FILE: u64 = 0;

/// A concurrently mutable set of byte destinations.
///
/// At most one *file* destination is active at a time: enabling a new one
/// tears down the previous one first. Arbitrary additional writers (console,
/// capture buffers) can be attached and detached freely.
///
/// # Examples
///
/// ```rust
/// use heapscope::report::OutputRouter;
///
/// let router = OutputRouter::new();
/// router.attach(Box::new(std::io::sink()));
/// router.write_line("Address,Size");
/// ```
pub struct OutputRouter {
    writers: DashMap<u64, Box<dyn Write + Send>>,
    next_id: AtomicU64,
    active_file: AtomicU64,
}

impl Default for OutputRouter {
    fn default() -> Self {
        OutputRouter::new()
    }
}

impl OutputRouter {
    /// Create a router with no destinations.
    #[must_use]
    pub fn new() -> Self {
        OutputRouter {
            writers: DashMap::new(),
            // id 0 is reserved as the "no file" marker
            next_id: AtomicU64::new(1),
            active_file: AtomicU64::new(NO_FILE),
        }
    }

    /// Create a router writing to standard output.
    #[must_use]
    pub fn console() -> Self {
        let router = OutputRouter::new();
        router.attach(Box::new(std::io::stdout()));
        router
    }

    /// Attach an arbitrary writer; returns its identifier for [`detach`].
    ///
    /// [`detach`]: OutputRouter::detach
    pub fn attach(&self, writer: Box<dyn Write + Send>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.writers.insert(id, writer);
        id
    }

    /// Flush and remove a writer. Unknown identifiers are a no-op.
    pub fn detach(&self, id: u64) {
        if let Some((_, mut writer)) = self.writers.remove(&id) {
            let _ = writer.flush();
        }
    }

    /// Establish `path` as the file destination, tearing down any previously
    /// enabled file destination first.
    ///
    /// The returned [`FileDestination`] guard releases the file when dropped,
    /// so the destination cannot outlive the scope that enabled it.
    ///
    /// # Errors
    /// Returns [`Error::FileError`](crate::Error::FileError) if the file
    /// cannot be created.
    pub fn enable_file<'a>(&'a self, path: &Path) -> Result<FileDestination<'a>> {
        let file = File::create(path)?;

        self.disable_file();

        let id = self.attach(Box::new(BufWriter::new(file)));
        self.active_file.store(id, Ordering::Release);
        Ok(FileDestination { router: self, id })
    }

    /// Flush and release the active file destination. A no-op when none is
    /// established.
    pub fn disable_file(&self) {
        let id = self.active_file.swap(NO_FILE, Ordering::AcqRel);
        if id != NO_FILE {
            self.detach(id);
        }
    }

    /// Whether a file destination is currently established.
    #[must_use]
    pub fn has_file(&self) -> bool {
        self.active_file.load(Ordering::Acquire) != NO_FILE
    }

    /// Number of attached destinations.
    #[must_use]
    pub fn destination_count(&self) -> usize {
        self.writers.len()
    }

    /// Write `text` followed by a line break to every destination.
    pub fn write_line(&self, text: &str) {
        self.write_raw(text);
        self.write_raw("\n");
    }

    /// Write `text` verbatim to every destination. Failures drop that write
    /// on that destination only.
    pub fn write_raw(&self, text: &str) {
        for mut entry in self.writers.iter_mut() {
            let _ = entry.value_mut().write_all(text.as_bytes());
        }
    }

    /// Flush every destination, ignoring per-destination failures.
    pub fn flush_all(&self) {
        for mut entry in self.writers.iter_mut() {
            let _ = entry.value_mut().flush();
        }
    }

    /// Release the file destination owned by `guard_id` if it is still the
    /// active one. Called from the guard; a newer `enable_file` has already
    /// torn this writer down, in which case nothing is left to do.
    fn release_if_active(&self, guard_id: u64) {
        if self
            .active_file
            .compare_exchange(guard_id, NO_FILE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.detach(guard_id);
        }
    }
}

/// Owned guard for an established file destination.
///
/// Dropping the guard flushes and releases the file unless a newer file
/// destination has replaced it in the meantime. This makes the
/// enable/disable toggle an explicitly owned resource rather than ambient
/// state.
pub struct FileDestination<'a> {
    router: &'a OutputRouter,
    id: u64,
}

impl FileDestination<'_> {
    /// Flush and release the file destination now.
    pub fn disable(self) {
        // Drop does the work
    }
}

impl Drop for FileDestination<'_> {
    fn drop(&mut self) {
        self.router.release_if_active(self.id);
    }
}
