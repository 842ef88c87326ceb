//! Frame transform and viewport.

use crate::target::ClipRect;

/// Transform and viewport of one frame.
///
/// The producer edits the *current* screen while drawing; a flush copies
/// it into the *actual* screen once the matching target is published.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Screen {
    /// Row-major affine transform from world to pixel coordinates.
    /// The last row is always `[0, 0, 1]`.
    pub transform: [[f64; 3]; 3],
    /// Pixel viewport.
    pub viewport: ClipRect,
}

impl Screen {
    /// Identity transform.
    pub const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

    /// Creates a screen with an identity transform.
    #[must_use]
    pub const fn new(viewport: ClipRect) -> Self {
        Self {
            transform: Self::IDENTITY,
            viewport,
        }
    }

    /// Returns this screen moved by `(dx, dy)` pixels.
    #[must_use]
    pub fn translated(mut self, dx: f64, dy: f64) -> Self {
        self.transform[0][2] += dx;
        self.transform[1][2] += dy;
        self
    }

    /// Returns this screen scaled by `factor` around the origin.
    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        for row in self.transform.iter_mut().take(2) {
            for value in row.iter_mut() {
                *value *= factor;
            }
        }
        self
    }

    /// Maps a world point to pixel coordinates.
    #[must_use]
    pub fn to_pixel(&self, point: [f64; 2]) -> [f64; 2] {
        let m = &self.transform;
        [
            m[0][0] * point[0] + m[0][1] * point[1] + m[0][2],
            m[1][0] * point[0] + m[1][1] * point[1] + m[1][2],
        ]
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(ClipRect::default())
    }
}
