//! Rendering for Gearfolio
//!
//! This crate provides the wgpu-based instanced mesh renderer used for
//! the backdrop and the model viewer.
//!
//! ## Key Components
//!
//! - [`context::RenderContext`] - WGPU device, queue, and surface management
//! - [`camera::OrbitCamera`] - Camera orbiting a target point
//! - [`pipeline::MeshPipeline`] - Instanced, lit mesh rendering
//! - [`renderable::GpuMesh`] / [`renderable::InstanceBatch`] - GPU buffers for one mesh
//!   and its instances

pub mod camera;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod renderable;

pub use camera::OrbitCamera;
pub use context::{ContextError, RenderContext};
pub use error::RenderError;
pub use pipeline::{MeshPipeline, MeshVertex, SceneUniforms, UniformBinding};
pub use renderable::{mesh_vertices, GpuMesh, InstanceBatch};

// Re-export core types for convenience
pub use gearfolio_core::{InstanceRaw, Material, Mesh};
