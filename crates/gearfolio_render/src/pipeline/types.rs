//! GPU-compatible data types for the mesh pipeline
//!
//! These types are designed to match the shader layouts exactly.
//! All types derive Pod and Zeroable for safe GPU buffer operations.
//! The per-instance layout is [`gearfolio_core::InstanceRaw`].

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// A mesh vertex: position and normal
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in model space
    pub position: [f32; 3],
    /// Surface normal for lighting
    pub normal: [f32; 3],
}

impl MeshVertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Per-frame uniforms shared by every draw
/// Layout: 112 bytes total (must match mesh.wgsl SceneUniforms)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    /// Projection * view (64 bytes)
    pub view_proj: [[f32; 4]; 4],
    /// Eye position + ambient strength (16 bytes)
    pub camera_pos: [f32; 3],
    pub ambient_strength: f32,
    /// Direction towards the light (normalized) + diffuse strength (16 bytes)
    pub light_dir: [f32; 3],
    pub diffuse_strength: f32,
    /// Fog color + fog density (16 bytes)
    pub fog_color: [f32; 3],
    pub fog_density: f32,
}

impl Default for SceneUniforms {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0, 0.0, 5.0],
            ambient_strength: 0.35,
            light_dir: [0.4, 0.8, 0.45],
            diffuse_strength: 0.9,
            fog_color: [0.04, 0.05, 0.08],
            fog_density: 0.0,
        }
    }
}

impl SceneUniforms {
    /// Set the camera part of the uniforms
    pub fn with_camera(mut self, view_proj: Mat4, eye: Vec3) -> Self {
        self.view_proj = view_proj.to_cols_array_2d();
        self.camera_pos = eye.to_array();
        self
    }

    /// Set the light direction (normalized here)
    pub fn with_light_dir(mut self, dir: [f32; 3]) -> Self {
        self.light_dir = Vec3::from_array(dir).normalize_or(Vec3::Y).to_array();
        self
    }
}
