//! Orbit controller for the backdrop camera
//!
//! Controls:
//! - Left-click + drag: orbit around the target
//! - Mouse wheel: zoom in/out
//! - Arrow keys: orbit in fixed steps per second
//! - No input for a while: slow automatic rotation

use glam::Vec3;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Pixels per wheel "line" for touchpads that report pixel deltas
const PIXELS_PER_LINE: f32 = 40.0;

/// Orbit controller for handling pointer input
pub struct OrbitController {
    // Key state
    left: bool,
    right: bool,
    up: bool,
    down: bool,

    // Pointer state
    dragging: bool,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_zoom: f32,

    // Exponential smoothing state
    smooth_yaw: f32,
    smooth_pitch: f32,

    idle_time: f32,

    // Configuration
    pub rotate_sensitivity: f32,
    pub key_rotate_speed: f32,
    pub zoom_sensitivity: f32,
    pub auto_rotate_speed: f32,
    pub auto_rotate_delay: f32,
    pub smoothing_half_life: f32,
    pub smoothing_enabled: bool,
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbitController {
    pub fn new() -> Self {
        Self {
            left: false,
            right: false,
            up: false,
            down: false,

            dragging: false,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_zoom: 0.0,

            smooth_yaw: 0.0,
            smooth_pitch: 0.0,

            idle_time: 0.0,

            rotate_sensitivity: 0.005,
            key_rotate_speed: 1.2,
            zoom_sensitivity: 0.1,
            auto_rotate_speed: 0.05,
            auto_rotate_delay: 3.0,
            smoothing_half_life: 0.08,
            smoothing_enabled: true,
        }
    }

    /// Process keyboard input, returns true if the key was consumed
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;

        match key {
            KeyCode::ArrowLeft => { self.left = pressed; true }
            KeyCode::ArrowRight => { self.right = pressed; true }
            KeyCode::ArrowUp => { self.up = pressed; true }
            KeyCode::ArrowDown => { self.down = pressed; true }
            _ => false,
        }
    }

    /// Process mouse button input
    pub fn process_mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Left {
            self.dragging = state == ElementState::Pressed;
            self.idle_time = 0.0;
        }
    }

    /// Process raw mouse movement (only counts while dragging)
    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        if self.dragging {
            self.pending_yaw += delta_x as f32;
            self.pending_pitch += delta_y as f32;
        }
    }

    /// Process mouse wheel input
    pub fn process_scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
        };
        self.pending_zoom += lines;
        self.idle_time = 0.0;
    }

    /// True while the orbit button is held
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Seconds since the last pointer or key input
    pub fn idle_time(&self) -> f32 {
        self.idle_time
    }

    /// True once the camera has been left alone long enough to spin on its own
    pub fn is_auto_rotating(&self) -> bool {
        self.auto_rotate_speed != 0.0 && self.idle_time >= self.auto_rotate_delay
    }

    /// Apply the accumulated input to the camera
    ///
    /// Returns the camera position for debug display.
    pub fn update<C: OrbitControl>(&mut self, camera: &mut C, dt: f32) -> Vec3 {
        let key_yaw = (self.right as i32 - self.left as i32) as f32;
        let key_pitch = (self.up as i32 - self.down as i32) as f32;
        let has_input = self.dragging
            || key_yaw != 0.0
            || key_pitch != 0.0
            || self.pending_yaw != 0.0
            || self.pending_pitch != 0.0
            || self.pending_zoom != 0.0;

        if has_input {
            self.idle_time = 0.0;
        } else {
            self.idle_time += dt;
        }

        // factor = 2^(-dt / half_life), smaller half-life responds faster
        let (yaw_input, pitch_input) = if self.smoothing_enabled && dt > 0.0 {
            let factor = 2.0f32.powf(-dt / self.smoothing_half_life);
            self.smooth_yaw = self.smooth_yaw * factor + self.pending_yaw * (1.0 - factor);
            self.smooth_pitch = self.smooth_pitch * factor + self.pending_pitch * (1.0 - factor);
            (self.smooth_yaw, self.smooth_pitch)
        } else {
            (self.pending_yaw, self.pending_pitch)
        };

        // Dragging right swings the camera left around the target
        let mut delta_yaw = -yaw_input * self.rotate_sensitivity + key_yaw * self.key_rotate_speed * dt;
        let delta_pitch = pitch_input * self.rotate_sensitivity + key_pitch * self.key_rotate_speed * dt;

        if self.is_auto_rotating() {
            delta_yaw += self.auto_rotate_speed * dt;
        }

        if delta_yaw != 0.0 || delta_pitch != 0.0 {
            camera.orbit(delta_yaw, delta_pitch);
        }

        if self.pending_zoom != 0.0 {
            // Wheel up moves closer
            camera.zoom((1.0 - self.zoom_sensitivity).powf(self.pending_zoom));
        }

        self.pending_yaw = 0.0;
        self.pending_pitch = 0.0;
        self.pending_zoom = 0.0;

        camera.position()
    }

    /// Builder: set drag sensitivity (radians per pixel)
    pub fn with_rotate_sensitivity(mut self, sensitivity: f32) -> Self {
        self.rotate_sensitivity = sensitivity;
        self
    }

    /// Builder: set zoom step per wheel line (fraction of the distance)
    pub fn with_zoom_sensitivity(mut self, sensitivity: f32) -> Self {
        self.zoom_sensitivity = sensitivity;
        self
    }

    /// Builder: set idle auto-rotation speed (radians per second) and delay (seconds)
    pub fn with_auto_rotate(mut self, speed: f32, delay: f32) -> Self {
        self.auto_rotate_speed = speed;
        self.auto_rotate_delay = delay;
        self
    }

    /// Builder: enable or disable smoothing
    pub fn with_smoothing(mut self, enabled: bool) -> Self {
        self.smoothing_enabled = enabled;
        self
    }
}

/// Trait for camera control
/// Allows the controller to drive different camera implementations
pub trait OrbitControl {
    /// Rotate around the target (radians)
    fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32);
    /// Multiply the distance to the target by `factor`
    fn zoom(&mut self, factor: f32);
    /// Current eye position
    fn position(&self) -> Vec3;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockCamera {
        yaw: f32,
        pitch: f32,
        distance: f32,
    }

    impl OrbitControl for MockCamera {
        fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
            self.yaw += delta_yaw;
            self.pitch += delta_pitch;
        }

        fn zoom(&mut self, factor: f32) {
            self.distance *= factor;
        }

        fn position(&self) -> Vec3 {
            Vec3::new(self.yaw, self.pitch, self.distance)
        }
    }

    fn camera() -> MockCamera {
        MockCamera { distance: 10.0, ..Default::default() }
    }

    #[test]
    fn test_motion_ignored_without_drag() {
        let mut controller = OrbitController::new().with_smoothing(false).with_auto_rotate(0.0, 0.0);
        let mut cam = camera();
        controller.process_mouse_motion(100.0, 50.0);
        controller.update(&mut cam, 0.016);
        assert_eq!(cam.yaw, 0.0);
        assert_eq!(cam.pitch, 0.0);
    }

    #[test]
    fn test_drag_orbits() {
        let mut controller = OrbitController::new().with_smoothing(false).with_rotate_sensitivity(0.01);
        let mut cam = camera();
        controller.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        controller.process_mouse_motion(100.0, 50.0);
        controller.update(&mut cam, 0.016);
        assert!((cam.yaw + 1.0).abs() < 1e-6);
        assert!((cam.pitch - 0.5).abs() < 1e-6);

        // Pending motion is consumed
        controller.update(&mut cam, 0.016);
        assert!((cam.yaw + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_smoothing_eases_in() {
        let mut controller = OrbitController::new().with_rotate_sensitivity(0.01);
        let mut cam = camera();
        controller.process_mouse_button(MouseButton::Left, ElementState::Pressed);
        controller.process_mouse_motion(100.0, 0.0);
        controller.update(&mut cam, 0.016);
        assert!(cam.yaw < 0.0);
        assert!(cam.yaw > -1.0);
    }

    #[test]
    fn test_scroll_zooms_in() {
        let mut controller = OrbitController::new().with_zoom_sensitivity(0.1);
        let mut cam = camera();
        controller.process_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        controller.update(&mut cam, 0.016);
        assert!((cam.distance - 9.0).abs() < 1e-5);

        controller.process_scroll(MouseScrollDelta::LineDelta(0.0, -1.0));
        controller.update(&mut cam, 0.016);
        assert!(cam.distance > 9.0);
    }

    #[test]
    fn test_arrow_keys_orbit() {
        let mut controller = OrbitController::new().with_auto_rotate(0.0, 0.0);
        let mut cam = camera();
        assert!(controller.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed));
        assert!(!controller.process_keyboard(KeyCode::KeyV, ElementState::Pressed));
        controller.update(&mut cam, 0.5);
        assert!((cam.yaw - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_auto_rotate_after_idle() {
        let mut controller = OrbitController::new().with_auto_rotate(0.5, 1.0);
        let mut cam = camera();
        controller.update(&mut cam, 0.5);
        assert_eq!(cam.yaw, 0.0);
        assert!(!controller.is_auto_rotating());

        controller.update(&mut cam, 0.5);
        assert!(controller.is_auto_rotating());
        assert!((cam.yaw - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_input_resets_idle() {
        let mut controller = OrbitController::new().with_auto_rotate(0.5, 1.0);
        let mut cam = camera();
        controller.update(&mut cam, 2.0);
        assert!(controller.is_auto_rotating());
        controller.process_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        assert_eq!(controller.idle_time(), 0.0);
        assert!(!controller.is_auto_rotating());
    }
}
