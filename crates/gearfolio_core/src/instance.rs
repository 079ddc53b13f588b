//! Per-instance data
//!
//! [`InstanceDescriptor`]s are sampled once at setup and never change.
//! Every frame they are turned into [`FrameTransform`]s, which are packed
//! into [`InstanceRaw`] records for the GPU.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::material::Material;
use crate::transform::Transform3D;

/// Static description of one animated instance
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    /// Rest position the animation oscillates around
    pub base_position: Vec3,
    /// Which geometry class (mesh) this instance is drawn with
    pub class_index: usize,
    /// Phase offset in radians, desynchronizes neighbours
    pub phase_offset: f32,
    /// Uniform scale
    pub scale: f32,
    /// Drift speed used by sliding presets (units per second)
    pub speed: f32,
}

impl InstanceDescriptor {
    /// Create a descriptor with unit scale and no phase offset or drift
    pub fn new(base_position: Vec3, class_index: usize) -> Self {
        Self {
            base_position,
            class_index,
            phase_offset: 0.0,
            scale: 1.0,
            speed: 0.0,
        }
    }
}

/// Transform of one instance for one frame, recomputed every frame
pub type FrameTransform = Transform3D;

/// GPU layout of one instance: model matrix, base color, surface parameters
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    /// Column-major model matrix
    pub model: [[f32; 4]; 4],
    /// Base color (RGBA)
    pub color: [f32; 4],
    /// Metalness, roughness, unused, unused
    pub surface: [f32; 4],
}

impl InstanceRaw {
    /// Pack a model matrix and material
    pub fn new(model: Mat4, material: &Material) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: material.base_color,
            surface: material.surface(),
        }
    }

    /// An instance with a zero matrix, which collapses to nothing on screen
    pub fn hidden() -> Self {
        Self::zeroed()
    }

    /// The model matrix
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.model)
    }

    /// Translation part of the model matrix
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.model[3][0], self.model[3][1], self.model[3][2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_raw_layout() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 96);
        let raw = InstanceRaw::hidden();
        assert!(bytemuck::bytes_of(&raw).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_instance_raw_packs_matrix_and_material() {
        let t = FrameTransform::from_position(Vec3::new(1.0, 2.0, 3.0)).with_scale(2.0);
        let material = Material::from_rgb(0.1, 0.2, 0.3).with_surface(0.7, 0.4);
        let raw = InstanceRaw::new(t.to_matrix(), &material);
        assert_eq!(raw.translation(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(raw.model_matrix(), t.to_matrix());
        assert_eq!(raw.color, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(raw.surface, [0.7, 0.4, 0.0, 0.0]);
    }
}
