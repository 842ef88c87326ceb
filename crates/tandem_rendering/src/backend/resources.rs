//! Transient drawing primitives for the back-buffer blit.

// Note: derive(Pod, Zeroable) expands to unsafe impls
#![allow(unsafe_code)]

use std::sync::atomic::{AtomicU64, Ordering};

use bytemuck::{Pod, Zeroable};

/// Axis-aligned float rectangle, `(x0, y0)` to `(x1, y1)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectF {
    /// Left.
    pub x0: f32,
    /// Top.
    pub y0: f32,
    /// Right.
    pub x1: f32,
    /// Bottom.
    pub y1: f32,
}

impl RectF {
    /// Unit rectangle, i.e. the whole texture in texture coordinates.
    pub const UNIT: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }
}

/// Vertex of a textured quad, laid out for direct GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// Pixel position.
    pub position: [f32; 2],
    /// Texture coordinate.
    pub tex_coord: [f32; 2],
}

/// Two triangles covering a rectangle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexturedQuad {
    /// Corners: top-left, top-right, bottom-right, bottom-left.
    pub vertices: [QuadVertex; 4],
    /// Triangle list indices into `vertices`.
    pub indices: [u16; 6],
}

impl TexturedQuad {
    /// Returns the vertices as raw bytes.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns the indices as raw bytes.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Hands out the transient primitives the backend needs for blits.
///
/// Shared by `Arc` between the producer (which passes it into commands)
/// and the execution stream (which uses it).
#[derive(Debug, Default)]
pub struct ResourceManager {
    quads_built: AtomicU64,
}

impl ResourceManager {
    /// Creates a resource manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a quad drawing `tex_rect` of a texture into `rect`.
    #[must_use]
    pub fn textured_rect(&self, rect: RectF, tex_rect: RectF) -> TexturedQuad {
        self.quads_built.fetch_add(1, Ordering::Relaxed);

        let corner = |x: f32, y: f32, u: f32, v: f32| QuadVertex {
            position: [x, y],
            tex_coord: [u, v],
        };

        TexturedQuad {
            vertices: [
                corner(rect.x0, rect.y0, tex_rect.x0, tex_rect.y0),
                corner(rect.x1, rect.y0, tex_rect.x1, tex_rect.y0),
                corner(rect.x1, rect.y1, tex_rect.x1, tex_rect.y1),
                corner(rect.x0, rect.y1, tex_rect.x0, tex_rect.y1),
            ],
            indices: [0, 1, 2, 0, 2, 3],
        }
    }

    /// Builds a quad copying a whole `width` x `height` texture 1:1.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn full_surface_quad(&self, width: u32, height: u32) -> TexturedQuad {
        self.textured_rect(RectF::new(0.0, 0.0, width as f32, height as f32), RectF::UNIT)
    }

    /// Returns how many quads have been built.
    #[must_use]
    pub fn quads_built(&self) -> u64 {
        self.quads_built.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_surface_quad() {
        let resources = ResourceManager::new();
        let quad = resources.full_surface_quad(640, 480);

        assert_eq!(quad.vertices[0].position, [0.0, 0.0]);
        assert_eq!(quad.vertices[2].position, [640.0, 480.0]);
        assert_eq!(quad.vertices[2].tex_coord, [1.0, 1.0]);
        assert_eq!(quad.indices, [0, 1, 2, 0, 2, 3]);
        assert_eq!(resources.quads_built(), 1);
    }

    #[test]
    fn test_quad_bytes() {
        let quad = ResourceManager::new().full_surface_quad(2, 2);
        assert_eq!(quad.vertex_bytes().len(), 4 * 16);
        assert_eq!(quad.index_bytes().len(), 12);
    }
}
