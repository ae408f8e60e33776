//! Cooperative progress reporting and cancellation.
//!
//! Long-running operations (hierarchy computation, full-region
//! classification, the composite coordinator phases) accept a
//! [`ProgressSink`] and poll it at each major loop iteration. Cancellation
//! is cooperative: a cancelled sink is observed at the next poll point and
//! surfaces as [`Cancelled`], a distinct error kind so callers can treat it
//! as a no-op abort rather than a failure.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Cooperative cancellation was observed.
///
/// Kept distinct from resolution failures so callers can suppress
/// user-visible error reporting and discard partial results silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Sink for progress reporting and cancellation polling.
///
/// Implementations are polled synchronously on the caller's thread; no
/// preemption is involved. `worked` is advisory and may be a no-op.
pub trait ProgressSink {
    /// Whether cancellation has been requested.
    fn is_cancelled(&self) -> bool;

    /// Report that `units` units of work completed.
    fn worked(&self, units: usize);

    /// Translate a pending cancellation request into an error.
    fn check_cancelled(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// A sink that is never cancelled and discards progress reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn is_cancelled(&self) -> bool {
        false
    }

    fn worked(&self, _units: usize) {}
}

#[derive(Debug, Default)]
struct CancelFlagInner {
    cancelled: AtomicBool,
    worked: AtomicUsize,
}

/// A cloneable cancellation flag with a work counter.
///
/// The flag can be handed to the code requesting cancellation (another
/// thread, a signal handler) while a clone is passed into the operation as
/// its progress sink.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    inner: Arc<CancelFlagInner>,
}

impl CancelFlag {
    /// Create a new, not-yet-cancelled flag.
    pub fn new() -> Self {
        CancelFlag::default()
    }

    /// Request cancellation. Observed at the operation's next poll point.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    /// Total units of work reported so far.
    pub fn units_done(&self) -> usize {
        self.inner.worked.load(Ordering::SeqCst)
    }
}

impl ProgressSink for CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    fn worked(&self, units: usize) {
        self.inner.worked.fetch_add(units, Ordering::SeqCst);
    }
}
