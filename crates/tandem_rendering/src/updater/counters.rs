//! Per-updater flush bookkeeping.

use std::time::Duration;

/// Indices drawn into the current back buffer before a threshold flush.
pub const FLUSH_INDEX_THRESHOLD: usize = 20_000;

/// Drawing volume and time since the last flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushCounters {
    accumulated_index_count: usize,
    last_flush: Duration,
}

impl FlushCounters {
    /// Creates zeroed counters with the timer starting at `now`.
    #[must_use]
    pub const fn new(now: Duration) -> Self {
        Self {
            accumulated_index_count: 0,
            last_flush: now,
        }
    }

    /// Returns the indices drawn since the last flush.
    #[inline]
    #[must_use]
    pub const fn accumulated_index_count(&self) -> usize {
        self.accumulated_index_count
    }

    /// Returns the time since the last flush.
    #[inline]
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.last_flush)
    }

    /// Adds drawn indices.
    #[inline]
    pub fn accumulate(&mut self, index_count: usize) {
        self.accumulated_index_count = self.accumulated_index_count.saturating_add(index_count);
    }

    /// Subtracts one threshold's worth of indices and restarts the timer.
    ///
    /// Overshoot past the threshold is kept, so a burst counts towards the
    /// next flush instead of being forgotten.
    pub fn carry_over(&mut self, threshold: usize, now: Duration) {
        self.accumulated_index_count = self.accumulated_index_count.saturating_sub(threshold);
        self.last_flush = now;
    }

    /// Zeroes the count and restarts the timer.
    pub fn reset(&mut self, now: Duration) {
        self.accumulated_index_count = 0;
        self.last_flush = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_carry_over_keeps_overshoot() {
        let mut counters = FlushCounters::new(Duration::ZERO);
        counters.accumulate(47_500);
        counters.carry_over(FLUSH_INDEX_THRESHOLD, Duration::from_secs(1));

        assert_eq!(counters.accumulated_index_count(), 27_500);
        assert_eq!(counters.elapsed(Duration::from_secs(3)), Duration::from_secs(2));
    }

    #[test]
    fn test_carry_over_never_goes_negative() {
        let mut counters = FlushCounters::new(Duration::ZERO);
        counters.accumulate(10);
        counters.carry_over(FLUSH_INDEX_THRESHOLD, Duration::ZERO);
        assert_eq!(counters.accumulated_index_count(), 0);
    }

    #[test]
    fn test_reset() {
        let mut counters = FlushCounters::new(Duration::ZERO);
        counters.accumulate(500);
        counters.reset(Duration::from_secs(5));

        assert_eq!(counters, FlushCounters::new(Duration::from_secs(5)));
    }

    #[test]
    fn test_elapsed_saturates_on_clock_reset() {
        let counters = FlushCounters::new(Duration::from_secs(10));
        assert_eq!(counters.elapsed(Duration::from_secs(1)), Duration::ZERO);
    }
}
