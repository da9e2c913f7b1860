//! On-demand model renderer for one surface.

use viewer_core::Model;
use wgpu::util::DeviceExt;

use crate::camera::{CameraUniform, PerspectiveCamera};
use crate::gpu_resources::{
    DEPTH_FORMAT, create_depth_texture, create_frame_bind_group, create_frame_bind_group_layout,
    create_mesh_bind_group_layout,
};
use crate::light::LightUniform;
use crate::mesh::GpuModel;
use crate::scene::Scene;
use crate::vertex::MeshVertex;

/// Owns the pipeline, frame uniforms and uploaded meshes of one surface.
pub struct Renderer {
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    clear_color: wgpu::Color,

    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    mesh_bind_group_layout: wgpu::BindGroupLayout,

    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,

    model: Option<GpuModel>,
}

impl Renderer {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Model Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/model.wgsl").into()),
        });

        let frame_layout = create_frame_bind_group_layout(device);
        let mesh_bind_group_layout = create_mesh_bind_group_layout(device);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[CameraUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[LightUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group =
            create_frame_bind_group(device, &frame_layout, &camera_buffer, &light_buffer);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Model Pipeline Layout"),
            bind_group_layouts: &[&frame_layout, &mesh_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Model Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[MeshVertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let (depth_texture, depth_view) = create_depth_texture(device, width, height);

        Self {
            format,
            width: width.max(1),
            height: height.max(1),
            clear_color: wgpu::Color::TRANSPARENT,
            pipeline,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            mesh_bind_group_layout,
            depth_texture,
            depth_view,
            model: None,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Recreate the depth buffer for a new surface size.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.depth_texture.destroy();
        let (depth_texture, depth_view) = create_depth_texture(device, width, height);
        self.depth_texture = depth_texture;
        self.depth_view = depth_view;
        self.width = width;
        self.height = height;
    }

    pub fn set_clear_color(&mut self, rgba: [f32; 4]) {
        self.clear_color = wgpu::Color {
            r: rgba[0] as f64,
            g: rgba[1] as f64,
            b: rgba[2] as f64,
            a: rgba[3] as f64,
        };
    }

    /// Make the uploaded meshes match `model`, uploading or freeing as needed.
    pub fn sync_model(&mut self, device: &wgpu::Device, model: Option<&Model>) {
        let current = self.model.as_ref().map(GpuModel::model_id);
        match model {
            Some(model) if current == Some(model.id) => {}
            Some(model) => {
                if let Some(old) = self.model.take() {
                    old.destroy();
                }
                self.model = Some(GpuModel::upload(device, &self.mesh_bind_group_layout, model));
            }
            None => {
                if let Some(old) = self.model.take() {
                    old.destroy();
                }
            }
        }
    }

    /// Record one frame into `view`.
    ///
    /// The model must already be synced with [`Renderer::sync_model`].
    pub fn render(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        queue: &wgpu::Queue,
        scene: &Scene,
        camera: &PerspectiveCamera,
        model: Option<&Model>,
    ) {
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[camera.uniform()]),
        );
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::cast_slice(&[scene.light_uniform()]),
        );

        let gpu_model = self.model.as_ref().filter(|gpu| {
            model.is_some_and(|model| model.id == gpu.model_id())
        });
        if let (Some(gpu), Some(model)) = (gpu_model, model) {
            gpu.write_uniforms(queue, model.transform());
        }

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Model Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let Some(gpu) = gpu_model else {
            return;
        };

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.frame_bind_group, &[]);
        for mesh in gpu.meshes() {
            render_pass.set_bind_group(1, &mesh.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
    }

    /// Free every GPU resource owned by this renderer.
    pub fn release(&mut self) {
        if let Some(model) = self.model.take() {
            model.destroy();
        }
        self.camera_buffer.destroy();
        self.light_buffer.destroy();
        self.depth_texture.destroy();
        tracing::debug!("Renderer resources released");
    }
}
