//! 3D transform (position, rotation, scale)
//!
//! Rotation is stored as XYZ Euler angles, the same representation the
//! animator produces every frame.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A 3D transform with position, Euler rotation, and uniform scale
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    /// Position in world space
    pub position: Vec3,
    /// Rotation as XYZ Euler angles in radians
    pub rotation: Vec3,
    /// Uniform scale factor
    pub scale: f32,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform3D {
    /// Create an identity transform
    pub const fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
        }
    }

    /// Create a transform with just a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    /// Set the uniform scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Rotation as a quaternion
    #[inline]
    pub fn rotation_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Model matrix: scale, then rotate, then translate
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            self.rotation_quat(),
            self.position,
        )
    }

    /// Transform a point from local space to world space
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation_quat() * (p * self.scale) + self.position
    }

    /// Transform a direction from local space to world space (no translation)
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation_quat() * (d * self.scale)
    }

    /// True when every component is a finite number
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite() && self.scale.is_finite()
    }

    /// Translate the transform by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_identity_transform() {
        let t = Transform3D::identity();
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(t.transform_point(p), p));
        assert_eq!(t.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translation() {
        let t = Transform3D::from_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(vec_approx_eq(t.transform_point(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_transform_order() {
        // Scale, then rotate 90 degrees about Z, then translate
        let t = Transform3D::from_position_rotation(
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, FRAC_PI_2),
        )
        .with_scale(2.0);
        let transformed = t.transform_point(Vec3::X);
        assert!(
            vec_approx_eq(transformed, Vec3::new(10.0, 2.0, 0.0)),
            "Expected (10, 2, 0), got {:?}",
            transformed
        );
    }

    #[test]
    fn test_matrix_matches_transform_point() {
        let t = Transform3D::from_position_rotation(Vec3::new(1.0, -2.0, 0.5), Vec3::new(0.3, 1.1, -0.7))
            .with_scale(0.4);
        let p = Vec3::new(0.2, 0.9, -1.3);
        assert!(vec_approx_eq(t.to_matrix().transform_point3(p), t.transform_point(p)));
    }

    #[test]
    fn test_transform_direction_ignores_position() {
        let t = Transform3D::from_position(Vec3::splat(100.0));
        assert!(vec_approx_eq(t.transform_direction(Vec3::X), Vec3::X));
    }

    #[test]
    fn test_is_finite() {
        let mut t = Transform3D::default();
        assert!(t.is_finite());
        t.rotation.y = f32::NAN;
        assert!(!t.is_finite());
    }
}
