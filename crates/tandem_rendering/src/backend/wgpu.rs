//! `wgpu` implementation of [`GraphicsBackend`].
//!
//! Surfaces are created lazily per [`TargetId`]. All work is recorded into
//! one pending command encoder that `fence` submits and `finish` submits
//! and waits on.
//!
//! Targets in one render state always share a size and format, so the
//! full-surface blit is done as a texture copy; the quad is not needed.

use std::collections::HashMap;
use std::sync::Arc;

use super::{GraphicsBackend, TexturedQuad};
use crate::geometry::Geometry;
use crate::target::{ClipRect, Color, RenderTarget, TargetId};

/// Records draw calls for one geometry batch.
///
/// Pipelines, bind groups and buffers belong to the application; the
/// backend only provides the encoder, the target view and the clip state.
pub trait GeometryEncoder: Send {
    /// Encodes `geometry` into `view`.
    fn encode(
        &mut self,
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        encoder: &mut ::wgpu::CommandEncoder,
        view: &::wgpu::TextureView,
        scissor: Option<ClipRect>,
        geometry: &Geometry,
    );
}

struct Surface {
    texture: ::wgpu::Texture,
    view: ::wgpu::TextureView,
}

/// GPU backend on top of a `wgpu` device.
pub struct WgpuBackend<E> {
    device: Arc<::wgpu::Device>,
    queue: Arc<::wgpu::Queue>,
    format: ::wgpu::TextureFormat,
    surfaces: HashMap<TargetId, Surface>,
    pending: Option<::wgpu::CommandEncoder>,
    geometry_encoder: E,
    scissor_rect: Option<ClipRect>,
    scissor_enabled: bool,
}

impl<E: GeometryEncoder> WgpuBackend<E> {
    /// Creates a backend rendering into textures of `format`.
    pub fn new(
        device: Arc<::wgpu::Device>,
        queue: Arc<::wgpu::Queue>,
        format: ::wgpu::TextureFormat,
        geometry_encoder: E,
    ) -> Self {
        Self {
            device,
            queue,
            format,
            surfaces: HashMap::new(),
            pending: None,
            geometry_encoder,
            scissor_rect: None,
            scissor_enabled: false,
        }
    }

    /// Returns the texture backing `target`, if it has been used yet.
    #[must_use]
    pub fn texture(&self, target: TargetId) -> Option<&::wgpu::Texture> {
        self.surfaces.get(&target).map(|surface| &surface.texture)
    }

    fn submit_pending(&mut self) {
        if let Some(encoder) = self.pending.take() {
            self.queue.submit(Some(encoder.finish()));
        }
    }
}

fn ensure_surface<'a>(
    device: &::wgpu::Device,
    surfaces: &'a mut HashMap<TargetId, Surface>,
    format: ::wgpu::TextureFormat,
    target: &RenderTarget,
) -> &'a Surface {
    target.assert_drawable();
    surfaces.entry(target.id()).or_insert_with(|| {
        let texture = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("tandem render target"),
            size: extent(target),
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT
                | ::wgpu::TextureUsages::TEXTURE_BINDING
                | ::wgpu::TextureUsages::COPY_SRC
                | ::wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
        Surface { texture, view }
    })
}

fn pending_encoder<'a>(
    device: &::wgpu::Device,
    pending: &'a mut Option<::wgpu::CommandEncoder>,
) -> &'a mut ::wgpu::CommandEncoder {
    pending.get_or_insert_with(|| {
        device.create_command_encoder(&::wgpu::CommandEncoderDescriptor {
            label: Some("tandem commands"),
        })
    })
}

fn extent(target: &RenderTarget) -> ::wgpu::Extent3d {
    ::wgpu::Extent3d {
        width: target.width(),
        height: target.height(),
        depth_or_array_layers: 1,
    }
}

impl<E: GeometryEncoder> GraphicsBackend for WgpuBackend<E> {
    fn draw_geometry(&mut self, target: &RenderTarget, geometry: &Geometry) {
        let Self {
            device,
            queue,
            format,
            surfaces,
            pending,
            geometry_encoder,
            scissor_rect,
            scissor_enabled,
        } = self;

        let surface = ensure_surface(device, surfaces, *format, target);
        let encoder = pending_encoder(device, pending);
        let scissor = if *scissor_enabled { *scissor_rect } else { None };

        geometry_encoder.encode(device, queue, encoder, &surface.view, scissor, geometry);
    }

    fn set_scissor_rect(&mut self, rect: ClipRect) {
        self.scissor_rect = Some(rect);
    }

    fn set_scissor_enabled(&mut self, enabled: bool) {
        self.scissor_enabled = enabled;
    }

    fn clear(&mut self, target: &RenderTarget, color: Color) {
        let surface = ensure_surface(&self.device, &mut self.surfaces, self.format, target);
        let encoder = pending_encoder(&self.device, &mut self.pending);

        let _pass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
            label: Some("tandem clear"),
            color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                view: &surface.view,
                resolve_target: None,
                ops: ::wgpu::Operations {
                    load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                        r: f64::from(color.r),
                        g: f64::from(color.g),
                        b: f64::from(color.b),
                        a: f64::from(color.a),
                    }),
                    store: ::wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
    }

    fn blit(&mut self, _quad: &TexturedQuad, source: &RenderTarget, destination: &RenderTarget) {
        assert_eq!(
            source.size(),
            destination.size(),
            "blit between targets of different size"
        );

        ensure_surface(&self.device, &mut self.surfaces, self.format, source);
        ensure_surface(&self.device, &mut self.surfaces, self.format, destination);

        let encoder = pending_encoder(&self.device, &mut self.pending);
        let src = &self.surfaces[&source.id()];
        let dst = &self.surfaces[&destination.id()];

        encoder.copy_texture_to_texture(
            ::wgpu::ImageCopyTexture {
                texture: &src.texture,
                mip_level: 0,
                origin: ::wgpu::Origin3d::ZERO,
                aspect: ::wgpu::TextureAspect::All,
            },
            ::wgpu::ImageCopyTexture {
                texture: &dst.texture,
                mip_level: 0,
                origin: ::wgpu::Origin3d::ZERO,
                aspect: ::wgpu::TextureAspect::All,
            },
            extent(destination),
        );
    }

    fn fence(&mut self) {
        self.submit_pending();
    }

    fn finish(&mut self) {
        self.submit_pending();
        let _ = self.device.poll(::wgpu::Maintain::Wait);
    }
}
