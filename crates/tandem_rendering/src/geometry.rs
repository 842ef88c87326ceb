//! Opaque geometry handles passed through the draw path.
//!
//! Building vertex and index data is someone else's job; the
//! synchronization engine only needs to know how much was drawn.

/// Handle to a texture owned by the graphics backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Handle to a vertex or index buffer owned by the graphics backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// One batch of indexed, textured triangles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    /// Texture sampled by the batch.
    pub texture: TextureId,
    /// Vertex buffer.
    pub vertices: BufferId,
    /// Index buffer.
    pub indices: BufferId,
    /// Number of indices to draw.
    pub index_count: usize,
}

impl Geometry {
    /// Creates a batch.
    #[must_use]
    pub const fn new(texture: TextureId, vertices: BufferId, indices: BufferId, index_count: usize) -> Self {
        Self {
            texture,
            vertices,
            indices,
            index_count,
        }
    }

    /// Convenience batch with placeholder handles, sized by index count.
    #[must_use]
    pub const fn with_indices(index_count: usize) -> Self {
        Self::new(TextureId(0), BufferId(0), BufferId(1), index_count)
    }
}
