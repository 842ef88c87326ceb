//! Backend that records what it was asked to do.
//!
//! Used for headless runs and tests: the event log shows exactly which GPU
//! operations a flush produced and in which order.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use super::{GraphicsBackend, TexturedQuad};
use crate::geometry::Geometry;
use crate::target::{ClipRect, Color, RenderTarget, TargetId};

/// One backend call.
#[derive(Clone, Debug, PartialEq)]
pub enum BackendEvent {
    /// `draw_geometry`.
    Draw {
        /// Target drawn into.
        target: TargetId,
        /// Indices drawn.
        index_count: usize,
        /// Whether the clip test was on.
        clipped: bool,
    },
    /// `set_scissor_rect`.
    ScissorRect(ClipRect),
    /// `set_scissor_enabled`.
    ScissorEnabled(bool),
    /// `clear`.
    Clear {
        /// Target cleared.
        target: TargetId,
        /// Fill colour.
        color: Color,
    },
    /// `blit`.
    Blit {
        /// Sampled target.
        source: TargetId,
        /// Target drawn into.
        destination: TargetId,
    },
    /// `fence`.
    Fence,
    /// `finish`.
    Finish,
}

/// Shared, append-only list of backend events.
#[derive(Clone, Debug, Default)]
pub struct EventLog(Arc<Mutex<Vec<BackendEvent>>>);

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event so far.
    #[must_use]
    pub fn events(&self) -> Vec<BackendEvent> {
        self.0.lock().clone()
    }

    /// Returns the number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Counts events matching `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&BackendEvent) -> bool) -> usize {
        self.0.lock().iter().filter(|event| predicate(event)).count()
    }

    /// Drops every recorded event.
    pub fn clear(&self) {
        self.0.lock().clear();
    }

    fn push(&self, event: BackendEvent) {
        self.0.lock().push(event);
    }
}

/// [`GraphicsBackend`] that appends every call to an [`EventLog`].
#[derive(Debug)]
pub struct RecordingBackend {
    log: EventLog,
    scissor_enabled: bool,
    finish_delay: Option<Duration>,
}

impl RecordingBackend {
    /// Creates a backend writing into `log`.
    #[must_use]
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            scissor_enabled: false,
            finish_delay: None,
        }
    }

    /// Makes every `finish` sleep, standing in for a busy GPU.
    #[must_use]
    pub fn with_finish_delay(mut self, delay: Duration) -> Self {
        self.finish_delay = Some(delay);
        self
    }

    /// Returns the log this backend writes into.
    #[must_use]
    pub fn log(&self) -> &EventLog {
        &self.log
    }
}

impl GraphicsBackend for RecordingBackend {
    fn draw_geometry(&mut self, target: &RenderTarget, geometry: &Geometry) {
        target.assert_drawable();
        self.log.push(BackendEvent::Draw {
            target: target.id(),
            index_count: geometry.index_count,
            clipped: self.scissor_enabled,
        });
    }

    fn set_scissor_rect(&mut self, rect: ClipRect) {
        self.log.push(BackendEvent::ScissorRect(rect));
    }

    fn set_scissor_enabled(&mut self, enabled: bool) {
        self.scissor_enabled = enabled;
        self.log.push(BackendEvent::ScissorEnabled(enabled));
    }

    fn clear(&mut self, target: &RenderTarget, color: Color) {
        self.log.push(BackendEvent::Clear {
            target: target.id(),
            color,
        });
    }

    fn blit(&mut self, _quad: &TexturedQuad, source: &RenderTarget, destination: &RenderTarget) {
        self.log.push(BackendEvent::Blit {
            source: source.id(),
            destination: destination.id(),
        });
    }

    fn fence(&mut self) {
        self.log.push(BackendEvent::Fence);
    }

    fn finish(&mut self) {
        if let Some(delay) = self.finish_delay {
            thread::sleep(delay);
        }
        self.log.push(BackendEvent::Finish);
    }
}
