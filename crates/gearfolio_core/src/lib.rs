//! Core types for Gearfolio
//!
//! This crate turns procedural geometry into an animated backdrop and a
//! model viewer, independent of any GPU API:
//!
//! - [`Transform3D`] - Position, Euler rotation and uniform scale
//! - [`Material`] - Base color, metalness and roughness
//! - [`InstanceDescriptor`] / [`InstanceRaw`] - Static instance data and its GPU layout
//! - [`scatter`] - Seeded placement of instances
//! - [`AnimationPreset`] - Per-frame motion of an instance
//! - [`InstanceBuffer`] - Fixed-capacity instance storage with a dirty flag
//! - [`InstancedAnimator`] - Animates instances partitioned by geometry class
//! - [`GearTrain`], [`ParticleField`], [`DroneRig`] - The backdrop's [`InstanceSource`]s
//! - [`BackdropScene`] / [`Backdrop`] - RON scene description and its runtime form
//! - [`AssetCache`], [`AssetLoader`], [`ModelAsset`], [`ModelSlot`] - glTF models
//!   loaded in the background

mod animator;
mod asset_cache;
mod asset_error;
mod asset_loader;
mod backdrop;
mod drone;
mod gear_train;
mod instance;
mod instance_buffer;
mod material;
mod model;
mod model_slot;
mod particles;
mod preset;
mod scatter;
mod scene;
mod shapes;
mod source;
mod transform;

pub use animator::{AnimatorError, FrameStats, InstancedAnimator};
pub use asset_cache::{Asset, AssetCache, AssetHandle, AssetId};
pub use asset_error::AssetError;
pub use asset_loader::{AssetLoader, LoadResult, LoadTicket};
pub use backdrop::Backdrop;
pub use drone::{DroneConfig, DronePart, DroneRig};
pub use gear_train::{GearInstance, GearTrain};
pub use instance::{FrameTransform, InstanceDescriptor, InstanceRaw};
pub use instance_buffer::{InstanceBuffer, InstanceBufferError};
pub use material::{Material, ShadowFlags};
pub use model::{MaterialOverride, ModelAsset, ModelMesh};
pub use model_slot::{ModelSlot, ModelState, LOADING_TEXT, UNAVAILABLE_TEXT};
pub use particles::{ParticleClass, ParticleField};
pub use preset::{wrap_depth, AnimationPreset};
pub use scatter::{scatter, ScatterConfig, ScatterError};
pub use scene::{
    BackdropScene, BevelTemplate, GearTemplate, ParticleClassTemplate, ParticleTemplate,
    SceneBuildError, SceneLoadError, SceneSaveError,
};
pub use shapes::ShapeTemplate;
pub use source::InstanceSource;
pub use transform::Transform3D;

// Re-export the geometry types users need alongside the core types
pub use gearfolio_geometry::{Aabb, GearMeshCache, GearSpec, GearSpecError, Mesh, ShapeError};
