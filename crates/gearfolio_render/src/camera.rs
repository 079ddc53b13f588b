//! Camera orbiting a target point
//!
//! Yaw turns around the world Y axis, pitch tilts towards the poles. At
//! yaw = pitch = 0 the camera sits on +Z looking down -Z, which is where
//! the backdrop's content is laid out.

use glam::{Mat4, Vec3};
use gearfolio_input::OrbitControl;

/// Keep the eye off the poles so the up vector stays usable
const MAX_PITCH: f32 = 1.5;

/// Perspective camera orbiting `target`
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitCamera {
    /// Point the camera looks at
    pub target: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    distance: f32,
    yaw: f32,
    pitch: f32,
    min_distance: f32,
    max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 12.0)
    }
}

impl OrbitCamera {
    /// Camera on +Z at `distance` from `target`
    pub fn new(target: Vec3, distance: f32) -> Self {
        Self {
            target,
            fov_y: 45f32.to_radians(),
            near: 0.1,
            far: 100.0,
            distance: distance.max(f32::EPSILON),
            yaw: 0.0,
            pitch: 0.0,
            min_distance: 0.5,
            max_distance: 50.0,
        }
    }

    /// Camera at `eye` looking at `target`
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let distance = offset.length();
        let mut camera = Self::new(target, distance);
        if distance > f32::EPSILON {
            camera.yaw = offset.x.atan2(offset.z);
            camera.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin().clamp(-MAX_PITCH, MAX_PITCH);
        }
        camera.max_distance = camera.max_distance.max(distance);
        camera
    }

    /// Builder: set the vertical field of view (degrees) and clip planes
    pub fn with_projection(mut self, fov_degrees: f32, near: f32, far: f32) -> Self {
        self.fov_y = fov_degrees.to_radians();
        self.near = near;
        self.far = far;
        self
    }

    /// Builder: set the zoom limits, clamping the current distance
    pub fn with_distance_limits(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min.max(f32::EPSILON);
        self.max_distance = max.max(self.min_distance);
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        self
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Eye position in world space
    pub fn eye(&self) -> Vec3 {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vec3::new(sy * cp, sp, cy * cp) * self.distance
    }

    /// World-to-view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// View-to-clip matrix (wgpu depth range 0..1)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(f32::EPSILON), self.near, self.far)
    }

    /// Projection * view
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

impl OrbitControl for OrbitCamera {
    fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = (self.yaw + delta_yaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + delta_pitch).clamp(-MAX_PITCH, MAX_PITCH);
    }

    fn zoom(&mut self, factor: f32) {
        if factor.is_finite() && factor > 0.0 {
            self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
        }
    }

    fn position(&self) -> Vec3 {
        self.eye()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_eye_on_positive_z() {
        let camera = OrbitCamera::default();
        assert!((camera.eye() - Vec3::new(0.0, 0.0, 12.0)).length() < 1e-5);
    }

    #[test]
    fn test_looking_at_recovers_eye() {
        let eye = Vec3::new(3.0, 2.0, 5.0);
        let camera = OrbitCamera::looking_at(eye, Vec3::new(0.0, 0.0, -1.0));
        assert!((camera.eye() - eye).length() < 1e-4);
    }

    #[test]
    fn test_target_projects_to_center() {
        let camera = OrbitCamera::looking_at(Vec3::new(2.0, 1.0, 8.0), Vec3::new(0.5, 0.0, -3.0));
        let clip = camera.view_projection(16.0 / 9.0) * camera.target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = OrbitCamera::new(Vec3::new(1.0, 0.0, 0.0), 5.0);
        camera.orbit(1.0, 0.4);
        assert!(((camera.eye() - camera.target).length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_pitch_clamped() {
        let mut camera = OrbitCamera::default();
        camera.orbit(0.0, 10.0);
        assert_eq!(camera.pitch(), MAX_PITCH);
        camera.orbit(0.0, -20.0);
        assert_eq!(camera.pitch(), -MAX_PITCH);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = OrbitCamera::new(Vec3::ZERO, 10.0).with_distance_limits(2.0, 20.0);
        camera.zoom(0.5);
        assert_eq!(camera.distance(), 5.0);
        camera.zoom(0.01);
        assert_eq!(camera.distance(), 2.0);
        camera.zoom(100.0);
        assert_eq!(camera.distance(), 20.0);
        camera.zoom(f32::NAN);
        assert_eq!(camera.distance(), 20.0);
    }
}
