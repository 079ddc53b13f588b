//! Animation presets
//!
//! A preset maps a descriptor and the elapsed time to that instance's
//! transform for the frame. Presets are interchangeable: the animator only
//! ever calls [`AnimationPreset::frame_transform`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::instance::{FrameTransform, InstanceDescriptor};

/// Default wobble amplitude in world units
pub const DEFAULT_AMPLITUDE: f32 = 0.5;
/// Default frequency of the positional wobble
pub const DEFAULT_POSITION_FREQUENCY: f32 = 0.5;
/// Default frequencies of the X and Y tumbling
pub const DEFAULT_ROTATION_FREQUENCY: [f32; 2] = [0.3, 0.4];

/// Per-frame motion applied to every instance of an animator
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnimationPreset {
    /// Circle around the base position in the XY plane while tumbling
    Wobble {
        /// Radius of the positional circle
        amplitude: f32,
        /// Angular frequency of the positional circle
        position_frequency: f32,
        /// Angular frequencies of the X and Y rotation
        rotation_frequency: [f32; 2],
    },
    /// Wobble in XY and drift along Z, wrapping inside a fixed depth range
    Slide {
        /// Radius of the positional circle
        amplitude: f32,
        /// Angular frequency of the positional circle
        position_frequency: f32,
        /// Angular frequencies of the X and Y rotation
        rotation_frequency: [f32; 2],
        /// Near end of the depth range
        z_min: f32,
        /// Length of the depth range
        range_length: f32,
    },
}

impl Default for AnimationPreset {
    fn default() -> Self {
        Self::wobble(DEFAULT_AMPLITUDE)
    }
}

impl AnimationPreset {
    /// Wobble with the default frequencies
    pub fn wobble(amplitude: f32) -> Self {
        AnimationPreset::Wobble {
            amplitude,
            position_frequency: DEFAULT_POSITION_FREQUENCY,
            rotation_frequency: DEFAULT_ROTATION_FREQUENCY,
        }
    }

    /// Slide through `[z_min, z_min + range_length)` with the default frequencies
    pub fn slide(amplitude: f32, z_min: f32, range_length: f32) -> Self {
        AnimationPreset::Slide {
            amplitude,
            position_frequency: DEFAULT_POSITION_FREQUENCY,
            rotation_frequency: DEFAULT_ROTATION_FREQUENCY,
            z_min,
            range_length,
        }
    }

    /// Compute an instance's transform at elapsed time `t` (seconds)
    pub fn frame_transform(&self, d: &InstanceDescriptor, t: f32) -> FrameTransform {
        let (amplitude, position_frequency, rotation_frequency) = match *self {
            AnimationPreset::Wobble { amplitude, position_frequency, rotation_frequency }
            | AnimationPreset::Slide { amplitude, position_frequency, rotation_frequency, .. } => {
                (amplitude, position_frequency, rotation_frequency)
            }
        };

        let phase = d.phase_offset;
        let wobble = angle(t, position_frequency, phase);
        let base = d.base_position;

        let z = match *self {
            AnimationPreset::Wobble { .. } => base.z,
            AnimationPreset::Slide { z_min, range_length, .. } => {
                wrap_depth(base.z + drift(t, d.speed, range_length), z_min, range_length)
            }
        };

        FrameTransform {
            position: Vec3::new(
                base.x + wobble.sin() * amplitude,
                base.y + wobble.cos() * amplitude,
                z,
            ),
            rotation: Vec3::new(
                angle(t, rotation_frequency[0], phase).sin(),
                angle(t, rotation_frequency[1], phase).cos(),
                0.0,
            ),
            scale: d.scale,
        }
    }
}

/// `t * frequency + phase` reduced to one turn
///
/// Computed in f64 so large finite `t` cannot overflow into inf.
fn angle(t: f32, frequency: f32, phase: f32) -> f32 {
    ((t as f64 * frequency as f64 + phase as f64) % std::f64::consts::TAU) as f32
}

/// Depth travelled after `t` seconds, reduced modulo `range_length`
fn drift(t: f32, speed: f32, range_length: f32) -> f32 {
    let travelled = t as f64 * speed as f64;
    if range_length > 0.0 && range_length.is_finite() {
        travelled.rem_euclid(range_length as f64) as f32
    } else {
        travelled as f32
    }
}

/// Wrap `z` into `[z_min, z_min + range_length)`
///
/// A non-positive range leaves `z` unchanged; a non-finite `z` maps to `z_min`.
pub fn wrap_depth(z: f32, z_min: f32, range_length: f32) -> f32 {
    if range_length <= 0.0 || !range_length.is_finite() {
        return z;
    }
    if !z.is_finite() {
        return z_min;
    }
    let wrapped = z_min + (z - z_min).rem_euclid(range_length);
    // rem_euclid can round up to exactly range_length
    if wrapped >= z_min + range_length {
        z_min
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn descriptor() -> InstanceDescriptor {
        InstanceDescriptor {
            base_position: Vec3::new(1.0, 2.0, -3.0),
            class_index: 0,
            phase_offset: 0.7,
            scale: 0.25,
            speed: 1.5,
        }
    }

    #[test]
    fn test_wobble_matches_formula() {
        let d = descriptor();
        let t = 3.2;
        let f = AnimationPreset::wobble(0.5).frame_transform(&d, t);
        assert!((f.position.x - (1.0 + (t * 0.5 + 0.7).sin() * 0.5)).abs() < 1e-6);
        assert!((f.position.y - (2.0 + (t * 0.5 + 0.7).cos() * 0.5)).abs() < 1e-6);
        assert_eq!(f.position.z, -3.0);
        assert!((f.rotation.x - (t * 0.3 + 0.7).sin()).abs() < 1e-6);
        assert!((f.rotation.y - (t * 0.4 + 0.7).cos()).abs() < 1e-6);
        assert_eq!(f.scale, 0.25);
    }

    #[test]
    fn test_wobble_position_is_periodic() {
        let d = descriptor();
        let preset = AnimationPreset::wobble(0.5);
        let period = TAU / DEFAULT_POSITION_FREQUENCY;
        for t in [0.0, 1.3, 7.9] {
            let a = preset.frame_transform(&d, t).position;
            let b = preset.frame_transform(&d, t + period).position;
            assert!((a - b).length() < 1e-4, "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_wobble_stays_within_amplitude() {
        let d = descriptor();
        let preset = AnimationPreset::wobble(0.5);
        for i in 0..100 {
            let p = preset.frame_transform(&d, i as f32 * 0.37).position;
            assert!((p - d.base_position).length() <= 0.5 + 1e-5);
        }
    }

    #[test]
    fn test_slide_wraps_depth() {
        let d = descriptor();
        let preset = AnimationPreset::slide(0.5, -10.0, 12.0);
        for i in 0..200 {
            let z = preset.frame_transform(&d, i as f32 * 0.5).position.z;
            assert!((-10.0..2.0).contains(&z), "z = {}", z);
        }
    }

    #[test]
    fn test_wrap_depth() {
        assert_eq!(wrap_depth(3.0, 0.0, 2.0), 1.0);
        assert_eq!(wrap_depth(-0.5, 0.0, 2.0), 1.5);
        assert_eq!(wrap_depth(2.0, 0.0, 2.0), 0.0);
        assert_eq!(wrap_depth(5.0, 0.0, 0.0), 5.0);
        assert_eq!(wrap_depth(f32::INFINITY, -4.0, 2.0), -4.0);
        assert_eq!(wrap_depth(f32::NAN, -4.0, 2.0), -4.0);
    }

    #[test]
    fn test_slide_stays_finite_for_huge_time() {
        let d = InstanceDescriptor {
            base_position: Vec3::new(0.0, 0.0, -3.0),
            speed: 4.0,
            ..descriptor()
        };
        let preset = AnimationPreset::slide(0.5, -14.0, 16.0);
        for t in [f32::MAX / 2.0, f32::MAX, 1.0e30] {
            let f = preset.frame_transform(&d, t);
            assert!(f.position.is_finite(), "position {:?} at t = {}", f.position, t);
            assert!(f.rotation.is_finite(), "rotation {:?} at t = {}", f.rotation, t);
            assert!((-14.0..2.0).contains(&f.position.z), "z = {}", f.position.z);
        }
    }

    #[test]
    fn test_preset_ron_roundtrip() {
        let preset = AnimationPreset::slide(0.3, -12.0, 20.0);
        let text = ron::to_string(&preset).unwrap();
        let back: AnimationPreset = ron::from_str(&text).unwrap();
        assert_eq!(preset, back);
    }
}
