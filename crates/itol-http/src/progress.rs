//! Progress and cancellation bookkeeping for one logical transfer.
//!
//! A [`ProgressReporter`] is a cheap handle; clones observe the same state.
//! Children created with [`ProgressReporter::create_child`] keep their own
//! byte counts but share the root's cancellation flag, so cancelling the
//! root stops whichever phase is transferring.

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

const UNKNOWN: u64 = u64::MAX;

#[derive(Debug)]
struct Inner {
    name: String,
    total: AtomicU64,
    transferred: AtomicU64,
    finished: AtomicBool,
    cancelled: Arc<AtomicBool>,
    params: Mutex<Option<String>>,
    children: Mutex<Vec<ProgressReporter>>,
}

/// Tracks total and transferred bytes and a cancellation request.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    inner: Arc<Inner>,
}

impl ProgressReporter {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_flag(name.into(), Arc::new(AtomicBool::new(false)))
    }

    fn with_flag(name: String, cancelled: Arc<AtomicBool>) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                total: AtomicU64::new(UNKNOWN),
                transferred: AtomicU64::new(0),
                finished: AtomicBool::new(false),
                cancelled,
                params: Mutex::new(None),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Record the expected byte count; `None` when unknown. Advisory only.
    pub fn set_total(&self, total: Option<u64>) {
        self.inner
            .total
            .store(total.unwrap_or(UNKNOWN), Ordering::Relaxed);
    }

    #[must_use]
    pub fn total(&self) -> Option<u64> {
        match self.inner.total.load(Ordering::Relaxed) {
            UNKNOWN => None,
            total => Some(total),
        }
    }

    pub fn set_progress(&self, transferred: u64) {
        self.inner.transferred.store(transferred, Ordering::Relaxed);
    }

    #[must_use]
    pub fn progress(&self) -> u64 {
        self.inner.transferred.load(Ordering::Relaxed)
    }

    /// Request cancellation of this reporter, its root and every sibling
    /// phase. Transfers notice at their next chunk boundary.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Reporter for a named sub-phase such as `"upload"` or `"download"`.
    ///
    /// The child is retained so the phase can be inspected later through
    /// [`ProgressReporter::child`].
    #[must_use]
    pub fn create_child(&self, name: &str) -> Self {
        let child = Self::with_flag(name.to_string(), Arc::clone(&self.inner.cancelled));
        self.inner.children.lock().push(child.clone());
        child
    }

    /// Most recently created child with this name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<Self> {
        self.inner
            .children
            .lock()
            .iter()
            .rev()
            .find(|child| child.name() == name)
            .cloned()
    }

    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.inner.children.lock().clone()
    }

    /// Mark the phase complete. Calling it again has no effect.
    pub fn set_finished(&self) {
        if !self.inner.finished.swap(true, Ordering::AcqRel) {
            tracing::trace!(
                phase = %self.inner.name,
                transferred = self.progress(),
                "progress finished"
            );
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.inner.finished.load(Ordering::Acquire)
    }

    /// Attach a descriptive parameter, e.g. a `Content-Disposition` value.
    pub fn set_params(&self, params: impl Into<String>) {
        *self.inner.params.lock() = Some(params.into());
    }

    #[must_use]
    pub fn params(&self) -> Option<String> {
        self.inner.params.lock().clone()
    }

    /// Guard that calls [`ProgressReporter::set_finished`] when dropped.
    #[must_use]
    pub fn finish_on_drop(&self) -> FinishGuard<'_> {
        FinishGuard { reporter: self }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new("request")
    }
}

/// Marks a reporter finished on scope exit, including early returns.
#[derive(Debug)]
pub struct FinishGuard<'a> {
    reporter: &'a ProgressReporter,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.reporter.set_finished();
    }
}
