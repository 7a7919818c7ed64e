//! GPU-resident shell geometry
//!
//! One packed vertex buffer holds all shells, grouped by layer, so the
//! driver can either draw everything in a single call (the layer tag is
//! a per-vertex attribute) or draw layer by layer for back-to-front
//! blending with a per-draw uniform.

use std::ops::Range;

use crate::core::error::Error;
use crate::fur::shell::{expand_shells, SurfaceVertex};

/// Shell geometry uploaded to a vertex buffer.
pub struct FurGeometry {
    buffer: wgpu::Buffer,
    vertex_count: u32,
    layer_count: u32,
    vertices_per_layer: u32,
}

impl FurGeometry {
    /// Expand `base` into `layer_count` shells and upload the packed
    /// buffer. Fails before any GPU allocation if the parameters are
    /// rejected by the expander.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        base: &[SurfaceVertex],
        layer_count: u32,
        max_shell_height: f32,
    ) -> Result<Self, Error> {
        let shells = expand_shells(base, layer_count, max_shell_height)?;
        let bytes: &[u8] = bytemuck::cast_slice(&shells);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fur_shell_vertices"),
            size: bytes.len() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&buffer, 0, bytes);

        log::info!(
            "uploaded fur geometry: {} vertices, {} layers",
            shells.len(),
            layer_count
        );

        Ok(Self {
            buffer,
            vertex_count: shells.len() as u32,
            layer_count,
            vertices_per_layer: base.len() as u32,
        })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn layer_count(&self) -> u32 {
        self.layer_count
    }

    /// Vertex range of one layer within the packed buffer.
    pub fn layer_range(&self, layer: u32) -> Range<u32> {
        let start = layer * self.vertices_per_layer;
        start..start + self.vertices_per_layer
    }

    /// Layer indices from the outermost shell inward, the order needed
    /// when blending without depth writes.
    pub fn layers_outer_first(&self) -> impl Iterator<Item = u32> {
        (0..self.layer_count).rev()
    }

    /// Draw every layer in a single call. The vertex buffer is expected
    /// in slot 0.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }

    /// Draw a single layer, for per-draw-uniform style rendering.
    pub fn draw_layer(&self, pass: &mut wgpu::RenderPass<'_>, layer: u32) {
        pass.set_vertex_buffer(0, self.buffer.slice(..));
        pass.draw(self.layer_range(layer), 0..1);
    }
}
