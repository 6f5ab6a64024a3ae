//! Cancellation tokens and version tracking for enumeration jobs.
//!
//! Cancellation is cooperative: a job polls its token at every checkpoint
//! (loop heads, recursive descent, catalog row iteration) and unwinds with
//! `None` once the token has been cancelled.
//!
//! Versions are assigned by the caller. The [`VersionTracker`] remembers the
//! newest version a caller has submitted so late deliveries for superseded
//! requests can be recognised and dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::Thread;

use parking_lot::Mutex;

/// Tracks the newest request version submitted by one caller context.
#[derive(Debug, Default)]
pub struct VersionTracker {
    active_version: AtomicU64,
}

impl VersionTracker {
    /// Creates a new version tracker.
    pub fn new() -> Self {
        Self {
            active_version: AtomicU64::new(0),
        }
    }

    /// Marks a caller-provided version as active if it is newer than the
    /// currently active version.
    ///
    /// Returns the resulting active version after the update attempt.
    pub fn activate_version(&self, version: u64) -> u64 {
        let mut current = self.active_version.load(Ordering::SeqCst);
        loop {
            if version <= current {
                return current;
            }
            match self.active_version.compare_exchange(
                current,
                version,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return version,
                Err(observed) => current = observed,
            }
        }
    }

    /// Returns the current active version without incrementing.
    pub fn current_version(&self) -> u64 {
        self.active_version.load(Ordering::SeqCst)
    }

    /// Returns true if `version` is the newest one submitted.
    pub fn is_current(&self, version: u64) -> bool {
        self.current_version() == version
    }
}

/// A cancellation token owned by one enumeration job.
///
/// Clones share the same flag, so the caller keeps one clone and the worker
/// polls another.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: AtomicBool,
    worker: Mutex<Option<Thread>>,
}

impl CancellationToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation and wakes the worker if it is parked.
    ///
    /// Returns `false` if the token had already been cancelled.
    pub fn cancel(&self) -> bool {
        let first = !self.inner.cancelled.swap(true, Ordering::SeqCst);
        if first {
            if let Some(worker) = self.inner.worker.lock().as_ref() {
                worker.unpark();
            }
        }
        first
    }

    /// Returns true once cancellation was requested.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Relaxed)
    }

    /// Checks if this token is still active.
    ///
    /// Returns `Some(())` if still active, `None` if cancelled.
    /// This enables use with the `?` operator for early returns.
    #[inline]
    pub fn checkpoint(&self) -> Option<()> {
        if self.is_cancelled() {
            None
        } else {
            Some(())
        }
    }

    /// Registers the thread that should be woken on cancellation.
    pub(crate) fn bind_worker(&self, worker: Thread) {
        *self.inner.worker.lock() = Some(worker);
    }
}
