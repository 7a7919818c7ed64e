//! GPU texture upload for fur density maps and decoded images
//!
//! Both texture kinds are immutable after creation: uploaded once at
//! setup, sampled every frame, never written again.

use crate::fur::FurDensityMap;
use crate::texture::DecodedImage;

fn upload_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    bytes: &[u8],
) -> wgpu::Texture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        bytes,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    texture
}

/// Fur density map as a GPU texture.
///
/// Point-sampled (nearest min/mag): the hard strand edges must stay
/// hard, linear filtering would blur individual-strand boundaries.
pub struct DensityTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl DensityTexture {
    /// Upload a generated density map.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, map: &FurDensityMap) -> Self {
        let texture = upload_rgba8(
            device,
            queue,
            "fur_density_texture",
            map.width(),
            map.height(),
            map.as_bytes(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("fur_density_sampler"),
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Release the GPU texture early, ahead of drop. Destroying an
    /// already-destroyed texture is a no-op.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}

/// A decoded PNG as a GPU texture with linear filtering.
pub struct ImageTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

impl ImageTexture {
    /// Upload a decoded image. 3-channel sources are expanded to RGBA
    /// with opaque alpha.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, img: &DecodedImage) -> Self {
        let texture = upload_rgba8(
            device,
            queue,
            "image_texture",
            img.width(),
            img.height(),
            &img.to_rgba_bytes(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("image_sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Release the GPU texture early, ahead of drop. Destroying an
    /// already-destroyed texture is a no-op.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
