//! Fur shell render pipeline

use bytemuck::{Pod, Zeroable};

use crate::core::error::Error;
use crate::fur::ShellVertex;
use crate::render::geometry::FurGeometry;
use crate::render::texture::{DensityTexture, ImageTexture};
use crate::shader::{ShaderProgram, ShaderStage, StageKind};

const FUR_SHADER: &str = include_str!("../../../shaders/fur.wgsl");

/// Per-frame fur uniforms (must match the shader struct exactly)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FurUniforms {
    /// Model-view matrix (64 bytes, offset 0)
    pub model_view: [[f32; 4]; 4],
    /// Projection matrix (64 bytes, offset 64)
    pub projection: [[f32; 4]; 4],
    /// Strand displacement, e.g. wind or gravity (12 bytes, offset 128)
    pub displacement: [f32; 3],
    /// Layer index for per-draw-uniform rendering (4 bytes, offset 140)
    pub current_layer: f32,
    /// Height of the outermost shell (4 bytes, offset 144)
    pub max_shell_height: f32,
    /// Padding to 160 bytes
    pub _pad: [f32; 3],
}

impl Default for FurUniforms {
    fn default() -> Self {
        Self {
            model_view: glam::Mat4::IDENTITY.to_cols_array_2d(),
            projection: glam::Mat4::IDENTITY.to_cols_array_2d(),
            displacement: [0.0; 3],
            current_layer: 0.0,
            max_shell_height: 0.0,
            _pad: [0.0; 3],
        }
    }
}

/// Render pipeline drawing the expanded shell stack.
///
/// Alpha blending with depth testing keeps inner shells from occluding
/// outer ones; drawing happens back-to-front via
/// [`FurGeometry::layers_outer_first`] when blending matters.
pub struct FurPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
}

impl FurPipeline {
    /// Build the fur pipeline for the given color and depth formats.
    ///
    /// The shader is validated and reflected through the stage/program
    /// layer first, so a broken shader fails here with a diagnostic
    /// instead of a backend panic, and the vertex attribute locations
    /// come from reflection rather than hard-coded slots.
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
    ) -> Result<Self, Error> {
        let vs = ShaderStage::compile(FUR_SHADER, StageKind::Vertex)?;
        let fs = ShaderStage::compile(FUR_SHADER, StageKind::Fragment)?;
        let mut program = ShaderProgram::link(&vs, &fs, None)?;

        let attribute = |program: &mut ShaderProgram, name: &str| {
            program
                .get_attribute(name)
                .ok_or_else(|| Error::ShaderLink(format!("fur shader has no `{name}` input")))
        };
        let vertex_attributes = [
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: attribute(&mut program, "position")?,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: attribute(&mut program, "normal")?,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 24,
                shader_location: attribute(&mut program, "uv")?,
                format: wgpu::VertexFormat::Float32x2,
            },
            wgpu::VertexAttribute {
                offset: 32,
                shader_location: attribute(&mut program, "layer")?,
                format: wgpu::VertexFormat::Float32,
            },
        ];

        let binding = |program: &mut ShaderProgram, name: &str| {
            program
                .get_uniform(name)
                .map(|u| u.binding)
                .ok_or_else(|| Error::ShaderLink(format!("fur shader has no `{name}` uniform")))
        };
        let uniforms_binding = binding(&mut program, "uniforms")?;
        let fur_texture_binding = binding(&mut program, "fur_texture")?;
        let fur_sampler_binding = binding(&mut program, "fur_sampler")?;
        let color_texture_binding = binding(&mut program, "color_texture")?;
        let color_sampler_binding = binding(&mut program, "color_sampler")?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fur_shader"),
            source: wgpu::ShaderSource::Wgsl(FUR_SHADER.into()),
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fur_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: uniforms_binding,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(fur_texture_binding),
                sampler_entry(fur_sampler_binding),
                texture_entry(color_texture_binding),
                sampler_entry(color_sampler_binding),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fur_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("fur_uniforms"),
            size: std::mem::size_of::<FurUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fur_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ShellVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &vertex_attributes,
                }],
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: depth_format,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        Ok(Self {
            pipeline,
            bind_group_layout,
            uniform_buffer,
        })
    }

    /// Create the bind group tying uniforms, density map, and base
    /// color texture together.
    pub fn create_bind_group(
        &self,
        device: &wgpu::Device,
        density: &DensityTexture,
        color: &ImageTexture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fur_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(density.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(density.sampler()),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(color.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(color.sampler()),
                },
            ],
        })
    }

    /// Write this frame's uniform values. The only per-frame mutation
    /// in the whole fur path.
    pub fn update_uniforms(&self, queue: &wgpu::Queue, uniforms: &FurUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Draw the full shell stack in one pass.
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        color_target: &wgpu::TextureView,
        depth_target: &wgpu::TextureView,
        bind_group: &wgpu::BindGroup,
        geometry: &FurGeometry,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("fur_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: depth_target,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, bind_group, &[]);
        // Outermost shells first so blending composes correctly under
        // the depth test.
        for layer in geometry.layers_outer_first() {
            geometry.draw_layer(&mut pass, layer);
        }
    }
}
