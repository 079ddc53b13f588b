//! Rendering pipeline components
//!
//! A single render pipeline draws every mesh with per-instance model
//! matrices and materials.

pub mod mesh_pipeline;
pub mod types;

pub use mesh_pipeline::{MeshPipeline, UniformBinding};
pub use types::{MeshVertex, SceneUniforms};
