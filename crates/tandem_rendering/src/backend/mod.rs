//! # Graphics Backend
//!
//! The consumer side of the engine. A backend is moved onto the command
//! queue's execution stream and only ever touched from there.

mod recording;
mod resources;
#[cfg(feature = "wgpu")]
pub mod wgpu;

pub use recording::{BackendEvent, EventLog, RecordingBackend};
pub use resources::{QuadVertex, RectF, ResourceManager, TexturedQuad};

use crate::geometry::Geometry;
use crate::target::{ClipRect, Color, RenderTarget};

/// Operations the synchronization engine needs from a GPU API.
///
/// Targets are identified by [`RenderTarget::id`]; a backend creates the
/// matching surface the first time it sees an id.
pub trait GraphicsBackend: Send {
    /// Draws one geometry batch into `target`, honouring the clip test.
    fn draw_geometry(&mut self, target: &RenderTarget, geometry: &Geometry);

    /// Sets the clip rectangle used while the clip test is enabled.
    fn set_scissor_rect(&mut self, rect: ClipRect);

    /// Enables or disables the clip test.
    fn set_scissor_enabled(&mut self, enabled: bool);

    /// Fills `target` with `color`, ignoring the clip test.
    fn clear(&mut self, target: &RenderTarget, color: Color);

    /// Draws `source` into `destination` as the textured `quad`.
    fn blit(&mut self, quad: &TexturedQuad, source: &RenderTarget, destination: &RenderTarget);

    /// Flushes recorded work to the GPU without waiting for it.
    fn fence(&mut self);

    /// Blocks until all work submitted so far has completed.
    fn finish(&mut self);
}
