//! Queue statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between a queue and its execution stream.
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Commands accepted by `submit`.
    pub submitted: AtomicU64,
    /// Commands whose `perform` has returned.
    pub executed: AtomicU64,
}

impl QueueStats {
    /// Returns the number of submitted commands.
    #[inline]
    #[must_use]
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Acquire)
    }

    /// Returns the number of executed commands.
    #[inline]
    #[must_use]
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Acquire)
    }

    /// Returns how many commands are still waiting or running.
    #[must_use]
    pub fn pending(&self) -> u64 {
        // Read executed first so a concurrent execution can only make the
        // result larger, never wrap.
        let executed = self.executed();
        self.submitted().saturating_sub(executed)
    }

    pub(crate) fn record_submit(&self) {
        self.submitted.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn record_execute(&self) {
        self.executed.fetch_add(1, Ordering::AcqRel);
    }
}
