//! Reference-counting metrics and statistics.
//!
//! Counters are kept per thread, matching the single-threaded ownership
//! model: a control block is created, disposed and freed on the thread that
//! owns it.

use std::cell::Cell;

/// Snapshot of the control-block activity on the current thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RcMetrics {
    /// Control blocks allocated.
    pub blocks_allocated: usize,
    /// Control blocks whose weak count reached zero and were freed.
    pub blocks_freed: usize,
    /// Pointees disposed because their strong count reached zero.
    pub pointees_disposed: usize,
    /// Weak-to-strong promotions attempted.
    pub lock_attempts: usize,
    /// Promotions that found the pointee already expired.
    pub lock_failures: usize,
    /// Allocation requests refused by the allocator.
    pub alloc_failures: usize,
}

impl RcMetrics {
    /// Create a new `RcMetrics` with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            blocks_allocated: 0,
            blocks_freed: 0,
            pointees_disposed: 0,
            lock_attempts: 0,
            lock_failures: 0,
            alloc_failures: 0,
        }
    }

    /// Blocks allocated but not yet freed (live or expired).
    #[must_use]
    pub const fn live_blocks(&self) -> usize {
        self.blocks_allocated.saturating_sub(self.blocks_freed)
    }

    /// Blocks whose pointee is gone but which are still held by weak pointers.
    #[must_use]
    pub const fn expired_blocks(&self) -> usize {
        self.pointees_disposed.saturating_sub(self.blocks_freed)
    }

    /// Counter-wise difference between this snapshot and an `earlier` one.
    ///
    /// ```
    /// use sharc::{rc_metrics, SharedPtr};
    ///
    /// let before = rc_metrics();
    /// drop(SharedPtr::new(1));
    /// let delta = rc_metrics().since(&before);
    /// assert_eq!(delta.blocks_allocated, 1);
    /// assert_eq!(delta.blocks_freed, 1);
    /// ```
    #[must_use]
    pub const fn since(&self, earlier: &Self) -> Self {
        Self {
            blocks_allocated: self.blocks_allocated.saturating_sub(earlier.blocks_allocated),
            blocks_freed: self.blocks_freed.saturating_sub(earlier.blocks_freed),
            pointees_disposed: self
                .pointees_disposed
                .saturating_sub(earlier.pointees_disposed),
            lock_attempts: self.lock_attempts.saturating_sub(earlier.lock_attempts),
            lock_failures: self.lock_failures.saturating_sub(earlier.lock_failures),
            alloc_failures: self.alloc_failures.saturating_sub(earlier.alloc_failures),
        }
    }
}

thread_local! {
    static METRICS: Cell<RcMetrics> = const { Cell::new(RcMetrics::new()) };
}

/// Get the metrics recorded on the current thread.
#[must_use]
pub fn rc_metrics() -> RcMetrics {
    METRICS.try_with(Cell::get).unwrap_or_default()
}

/// Clear the current thread's counters.
pub fn reset_rc_metrics() {
    let _ = METRICS.try_with(|m| m.set(RcMetrics::new()));
}

// Pointers dropped from other thread-locals' destructors may outlive
// `METRICS`; those updates are discarded.
fn update(f: impl FnOnce(&mut RcMetrics)) {
    let _ = METRICS.try_with(|m| {
        let mut metrics = m.get();
        f(&mut metrics);
        m.set(metrics);
    });
}

pub(crate) fn record_block_allocated() {
    update(|m| m.blocks_allocated += 1);
}

pub(crate) fn record_block_freed() {
    update(|m| m.blocks_freed += 1);
}

pub(crate) fn record_pointee_disposed() {
    update(|m| m.pointees_disposed += 1);
}

pub(crate) fn record_lock(success: bool) {
    update(|m| {
        m.lock_attempts += 1;
        if !success {
            m.lock_failures += 1;
        }
    });
}

pub(crate) fn record_alloc_failure() {
    update(|m| m.alloc_failures += 1);
}
