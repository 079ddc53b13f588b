//! Renderable geometry - bridges meshes and instances to GPU buffers
//!
//! A [`GpuMesh`] holds one uploaded mesh; an [`InstanceBatch`] pairs it
//! with a fixed-size instance buffer, which is one instanced draw call.

use std::sync::Arc;

use gearfolio_core::{InstanceRaw, Mesh};
use wgpu::util::DeviceExt;

use crate::error::RenderError;
use crate::pipeline::MeshVertex;

/// Convert a mesh into interleaved GPU vertices
pub fn mesh_vertices(mesh: &Mesh) -> Vec<MeshVertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(p, n)| MeshVertex::new(p.to_array(), n.to_array()))
        .collect()
}

/// A mesh uploaded to the GPU
pub struct GpuMesh {
    label: String,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    /// Upload vertices and indices
    pub fn upload(device: &wgpu::Device, mesh: &Mesh, label: &str) -> Result<Self, RenderError> {
        if mesh.is_empty() {
            return Err(RenderError::EmptyMesh(label.to_string()));
        }

        let vertices = mesh_vertices(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "Uploaded mesh '{}': {} vertices, {} triangles",
            label,
            vertices.len(),
            mesh.triangle_count()
        );

        Ok(Self {
            label: label.to_string(),
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// One mesh drawn `capacity` times with per-instance data
pub struct InstanceBatch {
    mesh: Arc<GpuMesh>,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl InstanceBatch {
    /// Allocate an instance buffer for `capacity` instances of `mesh`
    ///
    /// Nothing is drawn until the first [`write_instances`](Self::write_instances).
    pub fn new(device: &wgpu::Device, mesh: Arc<GpuMesh>, capacity: usize) -> Self {
        let size = (capacity.max(1) * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(mesh.label()),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            mesh,
            instance_buffer,
            capacity,
            count: 0,
        }
    }

    /// Upload mesh and instance storage in one go
    pub fn from_mesh(
        device: &wgpu::Device,
        mesh: &Mesh,
        label: &str,
        capacity: usize,
    ) -> Result<Self, RenderError> {
        let gpu_mesh = Arc::new(GpuMesh::upload(device, mesh, label)?);
        Ok(Self::new(device, gpu_mesh, capacity))
    }

    /// Replace the instance data
    pub fn write_instances(&mut self, queue: &wgpu::Queue, instances: &[InstanceRaw]) -> Result<(), RenderError> {
        check_capacity(self.mesh.label(), self.capacity, instances.len())?;
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
        }
        self.count = instances.len() as u32;
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of instances drawn
    pub fn instance_count(&self) -> u32 {
        self.count
    }

    pub fn mesh(&self) -> &Arc<GpuMesh> {
        &self.mesh
    }

    /// Record the draw call (pipeline and bind group must be set)
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.count == 0 {
            return;
        }
        pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.mesh.index_count, 0, 0..self.count);
    }
}

fn check_capacity(batch: &str, capacity: usize, requested: usize) -> Result<(), RenderError> {
    if requested > capacity {
        return Err(RenderError::CapacityExceeded {
            batch: batch.to_string(),
            capacity,
            requested,
        });
    }
    Ok(())
}
