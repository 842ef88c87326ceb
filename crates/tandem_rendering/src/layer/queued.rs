//! Stock [`DrawLayer`] that forwards everything to a [`RenderQueue`].

use std::sync::Arc;

use super::DrawLayer;
use crate::backend::ResourceManager;
use crate::command::{Command, RenderQueue};
use crate::geometry::Geometry;
use crate::target::{ClipRect, SharedTarget};

/// Drawing layer backed by a shared render queue.
///
/// Draw calls become [`Command::Draw`] carrying the target that was
/// current when the call was made, so retargeting never affects work
/// already queued.
pub struct QueuedDrawLayer {
    queue: Arc<RenderQueue>,
    resource_manager: Arc<ResourceManager>,
    render_target: Option<SharedTarget>,
    clip_rect: Option<ClipRect>,
    clip_rect_enabled: bool,
    in_frame: bool,
    frames: u64,
}

impl QueuedDrawLayer {
    /// Creates a layer with no render target.
    #[must_use]
    pub fn new(queue: Arc<RenderQueue>, resource_manager: Arc<ResourceManager>) -> Self {
        Self {
            queue,
            resource_manager,
            render_target: None,
            clip_rect: None,
            clip_rect_enabled: false,
            in_frame: false,
            frames: 0,
        }
    }

    /// Returns the queue commands are submitted to.
    #[must_use]
    pub fn queue(&self) -> &Arc<RenderQueue> {
        &self.queue
    }

    /// Returns the last clip rectangle set.
    #[must_use]
    pub fn clip_rect(&self) -> Option<ClipRect> {
        self.clip_rect
    }

    /// Turns clipping on (with the last rectangle) or off.
    pub fn set_clip_rect_enabled(&mut self, enabled: bool) {
        if enabled == self.clip_rect_enabled {
            return;
        }
        match (enabled, self.clip_rect) {
            (true, Some(rect)) => {
                self.clip_rect_enabled = true;
                self.queue.submit(Command::SetScissor(Some(rect)));
            }
            (true, None) => tracing::warn!("Clip enabled with no clip rectangle set; ignored"),
            (false, _) => {
                self.clip_rect_enabled = false;
                self.queue.submit(Command::SetScissor(None));
            }
        }
    }

    /// Returns true between `begin_frame` and `end_frame`.
    #[must_use]
    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    /// Returns the number of completed frames.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl DrawLayer for QueuedDrawLayer {
    fn draw_geometry(&mut self, geometry: Geometry) {
        let Some(target) = &self.render_target else {
            panic!("draw call issued with no render target bound");
        };
        if geometry.index_count == 0 {
            return;
        }
        self.queue.submit(Command::Draw {
            target: Arc::clone(target),
            geometry,
        });
    }

    fn begin_frame(&mut self) {
        if self.in_frame {
            tracing::warn!("begin_frame called inside frame {}", self.frames);
        }
        self.in_frame = true;
    }

    fn end_frame(&mut self) {
        if !self.in_frame {
            tracing::warn!("end_frame called without begin_frame");
        }
        self.in_frame = false;
        self.frames += 1;
    }

    fn set_clip_rect(&mut self, rect: ClipRect) {
        self.clip_rect = Some(rect);
        self.clip_rect_enabled = true;
        self.queue.submit(Command::SetScissor(Some(rect)));
    }

    fn clip_rect_enabled(&self) -> bool {
        self.clip_rect_enabled
    }

    fn set_render_target(&mut self, target: SharedTarget) {
        self.render_target = Some(target);
    }

    fn render_target(&self) -> Option<&SharedTarget> {
        self.render_target.as_ref()
    }

    fn resource_manager(&self) -> &Arc<ResourceManager> {
        &self.resource_manager
    }

    fn submit(&self, command: Command) {
        self.queue.submit(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendEvent, EventLog, RecordingBackend};
    use crate::command::render_queue;
    use crate::target::RenderTarget;
    use tandem_core::QueueConfig;

    fn layer() -> (QueuedDrawLayer, EventLog) {
        let log = EventLog::new();
        let queue = render_queue(&QueueConfig::inline(), RecordingBackend::new(log.clone())).unwrap();
        (QueuedDrawLayer::new(Arc::new(queue), Arc::new(ResourceManager::new())), log)
    }

    #[test]
    fn test_draw_goes_to_current_target() {
        let (mut layer, log) = layer();
        let first = RenderTarget::shared(8, 8);
        let second = RenderTarget::shared(8, 8);

        layer.set_render_target(Arc::clone(&first));
        layer.draw_geometry(Geometry::with_indices(3));
        layer.set_render_target(Arc::clone(&second));
        layer.draw_geometry(Geometry::with_indices(6));

        assert_eq!(
            log.events(),
            vec![
                BackendEvent::Draw { target: first.id(), index_count: 3, clipped: false },
                BackendEvent::Draw { target: second.id(), index_count: 6, clipped: false },
            ]
        );
    }

    #[test]
    fn test_empty_batch_is_skipped() {
        let (mut layer, log) = layer();
        layer.set_render_target(RenderTarget::shared(8, 8));
        layer.draw_geometry(Geometry::with_indices(0));
        assert!(log.is_empty());
    }

    #[test]
    #[should_panic(expected = "no render target bound")]
    fn test_draw_without_target_panics() {
        let (mut layer, _log) = layer();
        layer.draw_geometry(Geometry::with_indices(3));
    }

    #[test]
    fn test_clip_toggle() {
        let (mut layer, log) = layer();
        let rect = ClipRect::new(0, 0, 4, 4);

        layer.set_clip_rect(rect);
        assert!(layer.clip_rect_enabled());

        layer.set_clip_rect_enabled(false);
        layer.set_clip_rect_enabled(false);
        assert!(!layer.clip_rect_enabled());

        layer.set_clip_rect_enabled(true);
        assert!(layer.clip_rect_enabled());
        assert_eq!(layer.clip_rect(), Some(rect));
        assert_eq!(log.count(|e| *e == BackendEvent::ScissorEnabled(false)), 1);
        assert_eq!(log.count(|e| *e == BackendEvent::ScissorEnabled(true)), 2);
    }

    #[test]
    fn test_frame_counting() {
        let (mut layer, _log) = layer();
        layer.begin_frame();
        assert!(layer.in_frame());
        layer.end_frame();
        assert!(!layer.in_frame());
        assert_eq!(layer.frames(), 1);
    }
}
