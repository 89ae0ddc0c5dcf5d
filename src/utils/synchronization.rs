//! Cooperative cancellation for long-running scan passes.
//!
//! A heap export over a large snapshot can take a while; callers hand the
//! engine a [`CancellationToken`] and may signal it from another thread. The
//! engines poll the token once per incoming stream item — there is no forced
//! preemption, so a collaborator call that never returns cannot be cancelled
//! externally.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cloneable, thread-safe cancellation flag.
///
/// All clones observe the same flag. Signaling is sticky: once cancelled, a
/// token stays cancelled.
///
/// # Examples
///
/// ```rust
/// use heapscope::utils::CancellationToken;
///
/// let token = CancellationToken::new();
/// let watcher = token.clone();
/// assert!(!watcher.is_cancelled());
///
/// token.cancel();
/// assert!(watcher.is_cancelled());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        CancellationToken {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation has been signaled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
