//! Render targets and the small value types that travel with them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a render target.
///
/// Backends key their GPU surfaces by this id and create them on first use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a GPU-presentable surface.
///
/// The handle is immutable; which role a target plays (actual, back
/// buffer, drawing target) is decided by where the [`RenderState`] keeps
/// its `Arc`.
///
/// [`RenderState`]: crate::RenderState
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct RenderTarget {
    id: TargetId,
    width: u32,
    height: u32,
}

/// A render target shared between the render state and in-flight commands.
pub type SharedTarget = Arc<RenderTarget>;

impl RenderTarget {
    /// Creates a target handle with a fresh id.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: TargetId(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed)),
            width,
            height,
        }
    }

    /// Creates a target handle already wrapped for sharing.
    #[must_use]
    pub fn shared(width: u32, height: u32) -> SharedTarget {
        Arc::new(Self::new(width, height))
    }

    /// Returns the target id.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> TargetId {
        self.id
    }

    /// Returns the width in pixels.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns true if the target has no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Panics unless the target can be drawn into or sampled.
    pub(crate) fn assert_drawable(&self) {
        assert!(
            !self.is_empty(),
            "render target {} has zero size ({}x{})",
            self.id,
            self.width,
            self.height
        );
    }
}

/// Linear RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Creates a colour from components in `0.0..=1.0`.
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Colour a back buffer is cleared to before the previous frame is copied in.
pub const BACKGROUND_COLOR: Color = Color {
    r: 192.0 / 255.0,
    g: 192.0 / 255.0,
    b: 192.0 / 255.0,
    a: 1.0,
};

/// Integer pixel rectangle used for clipping and viewports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ClipRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl ClipRect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering a whole `width` x `height` surface.
    #[must_use]
    pub const fn surface(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns true if the rectangle contains no pixels.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = RenderTarget::new(4, 4);
        let b = RenderTarget::new(4, 4);
        assert_ne!(a.id(), b.id());
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_target() {
        assert!(RenderTarget::new(0, 16).is_empty());
        assert!(!RenderTarget::new(1, 1).is_empty());
    }

    #[test]
    #[should_panic(expected = "has zero size")]
    fn test_zero_sized_target_not_drawable() {
        RenderTarget::new(16, 0).assert_drawable();
    }

    #[test]
    fn test_background_is_opaque_grey() {
        let Color { r, g, b, a } = BACKGROUND_COLOR;
        for channel in [r, g, b] {
            assert!((channel - 0.752_941_2).abs() < 1e-6);
        }
        assert!((a - 1.0).abs() < f32::EPSILON);
    }
}
