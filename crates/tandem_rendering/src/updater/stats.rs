//! Flush statistics.

/// Why a flush happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushTrigger {
    /// Drawing volume and elapsed time crossed their thresholds.
    Threshold,
    /// The clip rectangle changed with drawing pending.
    ClipRect,
    /// The frame ended.
    EndOfFrame,
    /// The caller asked for it.
    Explicit,
}

/// Flush counts per trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdaterStats {
    /// Threshold-triggered flushes.
    pub threshold_flushes: u64,
    /// Clip-rectangle flushes.
    pub clip_flushes: u64,
    /// End-of-frame flushes.
    pub frame_flushes: u64,
    /// Explicit flushes.
    pub explicit_flushes: u64,
}

impl UpdaterStats {
    /// Returns the total number of flushes.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.threshold_flushes + self.clip_flushes + self.frame_flushes + self.explicit_flushes
    }

    pub(crate) fn record(&mut self, trigger: FlushTrigger) {
        match trigger {
            FlushTrigger::Threshold => self.threshold_flushes += 1,
            FlushTrigger::ClipRect => self.clip_flushes += 1,
            FlushTrigger::EndOfFrame => self.frame_flushes += 1,
            FlushTrigger::Explicit => self.explicit_flushes += 1,
        }
    }
}
