//! # Commands
//!
//! The closed set of work items the render queue executes.
//!
//! ```text
//! Draw / SetScissor     ─ base drawing layer output
//! Finish                ─ barrier: previous GPU work is complete
//! PublishActualTarget   ─ actual_screen = snapshot of current_screen
//! PrepareBackBuffer     ─ clear + blit published frame + fence + invalidate
//! ```

mod swap;

pub use swap::{PrepareBackBuffer, PublishActualTarget};

use tandem_core::{CommandQueue, Perform, QueueConfig, QueueResult};

use crate::backend::GraphicsBackend;
use crate::geometry::Geometry;
use crate::target::{ClipRect, SharedTarget};

/// Deferred work for a [`GraphicsBackend`].
pub enum Command {
    /// Draw a geometry batch into a target.
    Draw {
        /// Target being drawn into.
        target: SharedTarget,
        /// Batch to draw.
        geometry: Geometry,
    },
    /// Set the clip rectangle and enable the clip test, or disable it.
    SetScissor(Option<ClipRect>),
    /// Block the execution stream until the GPU is idle.
    Finish,
    /// Publish a transform snapshot as the visible one.
    PublishActualTarget(PublishActualTarget),
    /// Refill the new drawing target from the published frame.
    PrepareBackBuffer(PrepareBackBuffer),
}

impl Command {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Draw { .. } => "Draw",
            Self::SetScissor(_) => "SetScissor",
            Self::Finish => "Finish",
            Self::PublishActualTarget(_) => "PublishActualTarget",
            Self::PrepareBackBuffer(_) => "PrepareBackBuffer",
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Perform for Command {
    type Context = Box<dyn GraphicsBackend>;

    fn perform(self, backend: &mut Self::Context) {
        match self {
            Self::Draw { target, geometry } => backend.draw_geometry(&target, &geometry),
            Self::SetScissor(Some(rect)) => {
                backend.set_scissor_rect(rect);
                backend.set_scissor_enabled(true);
            }
            Self::SetScissor(None) => backend.set_scissor_enabled(false),
            Self::Finish => backend.finish(),
            Self::PublishActualTarget(command) => command.perform(),
            Self::PrepareBackBuffer(command) => command.perform(&mut **backend),
        }
    }
}

/// Command queue driving a graphics backend.
pub type RenderQueue = CommandQueue<Command>;

/// Builds a render queue and moves `backend` onto its execution stream.
///
/// # Errors
///
/// See [`CommandQueue::new`].
pub fn render_queue(config: &QueueConfig, backend: impl GraphicsBackend + 'static) -> QueueResult<RenderQueue> {
    let backend: Box<dyn GraphicsBackend> = Box::new(backend);
    CommandQueue::new(config, backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendEvent, EventLog, RecordingBackend};
    use crate::target::RenderTarget;

    #[test]
    fn test_scissor_command_sets_rect_then_enables() {
        let log = EventLog::new();
        let queue = render_queue(&QueueConfig::inline(), RecordingBackend::new(log.clone())).unwrap();
        let rect = ClipRect::new(1, 2, 3, 4);

        queue.submit(Command::SetScissor(Some(rect)));
        queue.submit(Command::SetScissor(None));

        assert_eq!(
            log.events(),
            vec![
                BackendEvent::ScissorRect(rect),
                BackendEvent::ScissorEnabled(true),
                BackendEvent::ScissorEnabled(false),
            ]
        );
    }

    #[test]
    fn test_draw_and_finish_reach_backend() {
        let log = EventLog::new();
        let queue = render_queue(&QueueConfig::threaded("command-test"), RecordingBackend::new(log.clone())).unwrap();
        let target = RenderTarget::shared(16, 16);

        queue.submit(Command::Draw {
            target: target.clone(),
            geometry: Geometry::with_indices(6),
        });
        queue.submit(Command::Finish);
        queue.wait_idle();

        assert_eq!(
            log.events(),
            vec![
                BackendEvent::Draw {
                    target: target.id(),
                    index_count: 6,
                    clipped: false,
                },
                BackendEvent::Finish,
            ]
        );
    }

    #[test]
    fn test_debug_uses_variant_name() {
        assert_eq!(format!("{:?}", Command::Finish), "Finish");
    }
}
