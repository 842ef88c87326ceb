//! # Base Drawing Layer
//!
//! The layer the [`RenderStateUpdater`](crate::RenderStateUpdater) extends.
//! It owns the drawing target and clip state and turns draw calls into
//! queued commands; the updater wraps it and decides when to flush.

mod queued;

pub use queued::QueuedDrawLayer;

use std::sync::Arc;

use crate::backend::ResourceManager;
use crate::command::Command;
use crate::geometry::Geometry;
use crate::target::{ClipRect, SharedTarget};

/// Drawing surface the flush policy is layered on.
pub trait DrawLayer {
    /// Draws a geometry batch into the current render target.
    fn draw_geometry(&mut self, geometry: Geometry);

    /// Starts a frame.
    fn begin_frame(&mut self);

    /// Ends a frame.
    fn end_frame(&mut self);

    /// Sets the clip rectangle and enables clipping.
    fn set_clip_rect(&mut self, rect: ClipRect);

    /// Returns true if the clip test is enabled.
    fn clip_rect_enabled(&self) -> bool;

    /// Redirects subsequent drawing into `target`.
    fn set_render_target(&mut self, target: SharedTarget);

    /// Returns the current drawing target.
    fn render_target(&self) -> Option<&SharedTarget>;

    /// Returns the resource manager handed to back-buffer preparation.
    fn resource_manager(&self) -> &Arc<ResourceManager>;

    /// Queues a command on the layer's execution stream.
    fn submit(&self, command: Command);
}
