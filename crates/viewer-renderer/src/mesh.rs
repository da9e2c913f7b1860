//! GPU mesh resources for a loaded model.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use uuid::Uuid;
use viewer_core::{MeshPrimitive, Model};
use wgpu::util::DeviceExt;

use crate::vertex::MeshVertex;

/// Per-mesh uniform (144 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl MeshUniform {
    pub fn new(transform: Mat4, color: [f32; 4]) -> Self {
        Self {
            model: transform.to_cols_array_2d(),
            normal_matrix: transform.inverse().transpose().to_cols_array_2d(),
            color,
        }
    }
}

/// GPU mesh data for one primitive.
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
    /// Primitive transform relative to the model origin
    pub local_transform: Mat4,
    pub color: [f32; 4],
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.uniform_buffer.destroy();
    }
}

/// All GPU meshes of one uploaded model.
pub struct GpuModel {
    model_id: Uuid,
    meshes: Vec<GpuMesh>,
}

impl GpuModel {
    /// Uploads every non-empty primitive of `model`.
    pub fn upload(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, model: &Model) -> Self {
        let meshes: Vec<GpuMesh> = model
            .primitives()
            .into_iter()
            .filter(|(_, primitive)| !primitive.is_empty())
            .map(|(transform, primitive)| upload_primitive(device, layout, transform, primitive))
            .collect();

        tracing::debug!("Uploaded model {} ({} meshes)", model.id, meshes.len());

        Self {
            model_id: model.id,
            meshes,
        }
    }

    pub fn model_id(&self) -> Uuid {
        self.model_id
    }

    pub fn meshes(&self) -> &[GpuMesh] {
        &self.meshes
    }

    /// Write per-mesh uniforms for the model's current placement.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, model_transform: Mat4) {
        for mesh in &self.meshes {
            let uniform = MeshUniform::new(model_transform * mesh.local_transform, mesh.color);
            queue.write_buffer(&mesh.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    /// Release GPU buffers immediately rather than on drop.
    pub fn destroy(self) {
        for mesh in &self.meshes {
            mesh.destroy();
        }
    }
}

/// Interleave positions and normals into vertex data.
pub fn mesh_vertices(primitive: &MeshPrimitive) -> Vec<MeshVertex> {
    primitive
        .positions
        .iter()
        .zip(primitive.normals.iter())
        .map(|(position, normal)| MeshVertex {
            position: *position,
            normal: *normal,
        })
        .collect()
}

fn upload_primitive(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    transform: Mat4,
    primitive: &MeshPrimitive,
) -> GpuMesh {
    let vertices = mesh_vertices(primitive);

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Model Vertex Buffer"),
        contents: bytemuck::cast_slice(&vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Model Index Buffer"),
        contents: bytemuck::cast_slice(&primitive.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Mesh Uniform Buffer"),
        contents: bytemuck::cast_slice(&[MeshUniform::new(transform, primitive.base_color)]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Mesh Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: primitive.indices.len() as u32,
        local_transform: transform,
        color: primitive.base_color,
        uniform_buffer,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_mesh_vertices_interleave() {
        let primitive = MeshPrimitive {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
            base_color: [1.0, 0.0, 0.0, 1.0],
        };
        let vertices = mesh_vertices(&primitive);
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mesh_uniform_normal_matrix() {
        let transform = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let uniform = MeshUniform::new(transform, [1.0; 4]);
        assert_eq!(uniform.model[0][0], 2.0);
        assert_eq!(uniform.normal_matrix[0][0], 0.5);
        assert_eq!(std::mem::size_of::<MeshUniform>(), 144);
    }
}
