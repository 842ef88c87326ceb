//! # Render State Updater
//!
//! Flush policy layered over a [`DrawLayer`].
//!
//! ## Flush points
//!
//! ```text
//! draw_geometry   ─ periodic update on, state attached,
//!                   count > 20000 and elapsed > interval → flush, count -= 20000
//! set_clip_rect   ─ state attached and count > 0         → flush, count = 0
//! end_frame       ─ state attached                       → flush, count = 0
//! begin_frame     ─ never flushes                        →        count = 0
//! ```
//!
//! ## Swap protocol
//!
//! ```text
//! submit Finish
//! lock slots ─┬─ swap actual_target <-> back_buffer_layers.front()
//!             ├─ submit PublishActualTarget(current_screen snapshot)
//!             └─ retarget drawing to back_buffer_layers.front()
//! unlock
//! submit PrepareBackBuffer
//! ```
//!
//! Only pointer moves happen under the lock. Every GPU operation runs later,
//! on the queue's execution stream.
//!
//! If the render state's targets are replaced wholesale, the updater moves
//! its drawing to the new pool before the next draw or flush.

mod clock;
mod counters;
mod stats;

pub use clock::{Clock, ManualClock, SystemClock};
pub use counters::{FlushCounters, FLUSH_INDEX_THRESHOLD};
pub use stats::{FlushTrigger, UpdaterStats};

use std::sync::Arc;
use std::time::Duration;

use crate::command::{Command, PrepareBackBuffer, PublishActualTarget};
use crate::config::UpdaterParams;
use crate::geometry::Geometry;
use crate::layer::DrawLayer;
use crate::state::RenderState;
use crate::target::ClipRect;

/// Drawing layer that publishes its output through a [`RenderState`].
///
/// With no render state attached it is a plain pass-through to the
/// wrapped layer: counters still move, but nothing is ever flushed.
pub struct RenderStateUpdater<L> {
    layer: L,
    render_state: Option<Arc<RenderState>>,
    periodic_update: bool,
    update_interval: Duration,
    counters: FlushCounters,
    clock: Arc<dyn Clock>,
    stats: UpdaterStats,
    targets_epoch: u64,
}

impl<L: DrawLayer> RenderStateUpdater<L> {
    /// Wraps `layer` using the system clock.
    #[must_use]
    pub fn new(layer: L, params: UpdaterParams) -> Self {
        Self::with_clock(layer, params, Arc::new(SystemClock::new()))
    }

    /// Wraps `layer` using `clock` for the flush interval.
    ///
    /// If a render state is attached and the layer has no target yet, the
    /// layer is pointed at the next back buffer, never at the actual target.
    #[must_use]
    pub fn with_clock(mut layer: L, params: UpdaterParams, clock: Arc<dyn Clock>) -> Self {
        let mut targets_epoch = 0;
        if let Some(state) = &params.render_state {
            let slots = state.lock_slots();
            targets_epoch = state.targets_epoch();
            if layer.render_target().is_none() {
                layer.set_render_target(Arc::clone(slots.front()));
            }
        }

        let counters = FlushCounters::new(clock.now());

        Self {
            layer,
            render_state: params.render_state,
            periodic_update: params.enable_periodic_update,
            update_interval: params.update_interval,
            counters,
            clock,
            stats: UpdaterStats::default(),
            targets_epoch,
        }
    }

    /// Returns the attached render state.
    #[must_use]
    pub fn render_state(&self) -> Option<&Arc<RenderState>> {
        self.render_state.as_ref()
    }

    /// Returns the wrapped layer.
    #[must_use]
    pub fn layer(&self) -> &L {
        &self.layer
    }

    /// Returns the wrapped layer mutably.
    ///
    /// Calls made directly on the layer bypass the flush policy.
    pub fn layer_mut(&mut self) -> &mut L {
        &mut self.layer
    }

    /// Unwraps the layer.
    #[must_use]
    pub fn into_layer(self) -> L {
        self.layer
    }

    /// Returns the flush counters.
    #[must_use]
    pub fn counters(&self) -> &FlushCounters {
        &self.counters
    }

    /// Returns the indices drawn since the last flush.
    #[must_use]
    pub fn accumulated_index_count(&self) -> usize {
        self.counters.accumulated_index_count()
    }

    /// Returns flush statistics.
    #[must_use]
    pub fn stats(&self) -> UpdaterStats {
        self.stats
    }

    /// Returns true if volume/time based flushing is on.
    #[must_use]
    pub fn periodic_update(&self) -> bool {
        self.periodic_update
    }

    /// Returns the minimum time between threshold flushes.
    #[must_use]
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Draws a batch, then flushes if volume and time both call for it.
    pub fn draw_geometry(&mut self, geometry: Geometry) {
        self.follow_target_reset();
        self.layer.draw_geometry(geometry);
        self.counters.accumulate(geometry.index_count);

        if !self.periodic_update
            || self.render_state.is_none()
            || self.counters.accumulated_index_count() <= FLUSH_INDEX_THRESHOLD
        {
            return;
        }

        let now = self.clock.now();
        if self.counters.elapsed(now) > self.update_interval {
            self.update_actual_target(FlushTrigger::Threshold);
            self.counters.carry_over(FLUSH_INDEX_THRESHOLD, now);
        }
    }

    /// Starts a frame. Never flushes.
    pub fn begin_frame(&mut self) {
        self.follow_target_reset();
        self.layer.begin_frame();
        self.counters.reset(self.clock.now());
    }

    /// Changes the clip rectangle, publishing pending drawing first.
    pub fn set_clip_rect(&mut self, rect: ClipRect) {
        if self.render_state.is_some() && self.counters.accumulated_index_count() > 0 {
            self.update_actual_target(FlushTrigger::ClipRect);
            self.counters.reset(self.clock.now());
        }

        self.layer.set_clip_rect(rect);
    }

    /// Ends a frame, publishing it if a render state is attached.
    pub fn end_frame(&mut self) {
        if self.render_state.is_some() {
            self.update_actual_target(FlushTrigger::EndOfFrame);
        }
        self.counters.reset(self.clock.now());
        self.layer.end_frame();
    }

    /// Publishes the current drawing immediately.
    ///
    /// Returns false (and does nothing) when no render state is attached.
    pub fn flush(&mut self) -> bool {
        if self.render_state.is_none() {
            return false;
        }
        self.update_actual_target(FlushTrigger::Explicit);
        self.counters.reset(self.clock.now());
        true
    }

    /// Retargets the layer if [`RenderState::reset_targets`] replaced the pool.
    fn follow_target_reset(&mut self) {
        let Some(render_state) = &self.render_state else {
            return;
        };
        if render_state.targets_epoch() == self.targets_epoch {
            return;
        }

        let slots = render_state.lock_slots();
        self.targets_epoch = render_state.targets_epoch();
        self.layer.set_render_target(Arc::clone(slots.front()));

        tracing::debug!("Render targets replaced; drawing into {}", slots.front().id());
    }

    fn update_actual_target(&mut self, trigger: FlushTrigger) {
        self.follow_target_reset();

        let Some(render_state) = self.render_state.clone() else {
            return;
        };

        // Everything drawn so far must land before its target is promoted.
        self.layer.submit(Command::Finish);

        let prepare = {
            let mut slots = render_state.lock_slots();
            slots.swap_front();

            let publish = PublishActualTarget::new(
                Arc::clone(&render_state),
                render_state.current_screen(),
                Arc::clone(&slots.actual_target),
                render_state.targets_epoch(),
            );
            self.layer.submit(Command::PublishActualTarget(publish));

            let back_buffer = Arc::clone(slots.front());
            self.layer.set_render_target(Arc::clone(&back_buffer));

            PrepareBackBuffer::new(
                Arc::clone(&render_state),
                Arc::clone(&slots.actual_target),
                back_buffer,
                Arc::clone(self.layer.resource_manager()),
                self.layer.clip_rect_enabled(),
            )
        };

        tracing::debug!(
            "Flush ({:?}): actual target {}, drawing into {}, {} indices pending",
            trigger,
            prepare.actual_target().id(),
            prepare.back_buffer().id(),
            self.counters.accumulated_index_count()
        );

        self.layer.submit(Command::PrepareBackBuffer(prepare));
        self.stats.record(trigger);
    }
}
