//! The two commands a flush builds besides `Finish`.

use std::sync::Arc;

use crate::backend::{GraphicsBackend, ResourceManager};
use crate::state::{RenderState, Screen};
use crate::target::{SharedTarget, BACKGROUND_COLOR};

/// Makes the swapped-in target and the screen snapshot taken at swap time
/// the visible frame.
///
/// Takes only the render state's screens lock, never the slots lock, so it
/// is safe to run while the producer is inside the swap critical section.
#[derive(Debug)]
pub struct PublishActualTarget {
    render_state: Arc<RenderState>,
    current_screen: Screen,
    target: SharedTarget,
    targets_epoch: u64,
}

impl PublishActualTarget {
    /// Creates the command.
    ///
    /// `targets_epoch` is the render state's epoch at swap time; if the
    /// targets are reset before the command runs, it publishes nothing.
    #[must_use]
    pub fn new(
        render_state: Arc<RenderState>,
        current_screen: Screen,
        target: SharedTarget,
        targets_epoch: u64,
    ) -> Self {
        Self {
            render_state,
            current_screen,
            target,
            targets_epoch,
        }
    }

    /// Returns the snapshot this command will publish.
    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.current_screen
    }

    /// Returns the target this command will publish.
    #[must_use]
    pub fn target(&self) -> &SharedTarget {
        &self.target
    }

    pub(crate) fn perform(self) {
        self.render_state
            .publish(self.current_screen, self.target, self.targets_epoch);
    }
}

/// Prepares the new drawing target after a swap.
///
/// The drawing target is cleared to [`BACKGROUND_COLOR`] and the freshly
/// published frame is copied into it, so drawing continues on top of what
/// is on screen instead of on an empty surface.
#[derive(Debug)]
pub struct PrepareBackBuffer {
    render_state: Arc<RenderState>,
    actual_target: SharedTarget,
    back_buffer: SharedTarget,
    resource_manager: Arc<ResourceManager>,
    clip_rect_enabled: bool,
}

impl PrepareBackBuffer {
    /// Creates the command.
    ///
    /// `actual_target` is the blit source (the frame just published),
    /// `back_buffer` the target drawing continues in.
    #[must_use]
    pub fn new(
        render_state: Arc<RenderState>,
        actual_target: SharedTarget,
        back_buffer: SharedTarget,
        resource_manager: Arc<ResourceManager>,
        clip_rect_enabled: bool,
    ) -> Self {
        Self {
            render_state,
            actual_target,
            back_buffer,
            resource_manager,
            clip_rect_enabled,
        }
    }

    /// Returns the blit source.
    #[must_use]
    pub fn actual_target(&self) -> &SharedTarget {
        &self.actual_target
    }

    /// Returns the target being prepared.
    #[must_use]
    pub fn back_buffer(&self) -> &SharedTarget {
        &self.back_buffer
    }

    pub(crate) fn perform(self, backend: &mut dyn GraphicsBackend) {
        self.actual_target.assert_drawable();
        self.back_buffer.assert_drawable();
        assert!(
            !Arc::ptr_eq(&self.actual_target, &self.back_buffer),
            "back buffer {} is also the actual target",
            self.back_buffer.id()
        );

        tracing::debug!(
            "Preparing back buffer {} from actual target {}",
            self.back_buffer.id(),
            self.actual_target.id()
        );

        backend.set_scissor_enabled(false);
        backend.clear(&self.back_buffer, BACKGROUND_COLOR);

        let quad = self
            .resource_manager
            .full_surface_quad(self.actual_target.width(), self.actual_target.height());
        backend.blit(&quad, &self.actual_target, &self.back_buffer);

        if self.clip_rect_enabled {
            backend.set_scissor_enabled(true);
        }

        backend.fence();

        self.render_state.invalidate();
    }
}
