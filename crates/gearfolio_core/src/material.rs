//! Surface materials
//!
//! A metalness/roughness material with a base color. Backdrop instances
//! carry one per geometry class (or per gear); imported models carry one
//! per mesh primitive.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Shadow participation of a model mesh
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ShadowFlags: u8 {
        /// No shadow interaction
        const NONE = 0;
        /// The mesh casts shadows
        const CAST = 1 << 0;
        /// The mesh receives shadows
        const RECEIVE = 1 << 1;
        /// Casts and receives
        const ALL = Self::CAST.bits() | Self::RECEIVE.bits();
    }
}

/// Base color plus metalness and roughness
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Base color as RGBA (each component 0.0-1.0)
    pub base_color: [f32; 4],
    /// 0.0 = dielectric, 1.0 = metal
    pub metalness: f32,
    /// 0.0 = mirror, 1.0 = fully rough
    pub roughness: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Material {
    /// Create a material from an RGBA color with default surface values
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            base_color: [r, g, b, a],
            metalness: 0.0,
            roughness: 0.5,
        }
    }

    /// Create an opaque material with the given RGB color
    pub const fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create an opaque material from a `0xRRGGBB` color
    pub fn from_hex(rgb: u32) -> Self {
        let channel = |shift: u32| ((rgb >> shift) & 0xff) as f32 / 255.0;
        Self::from_rgb(channel(16), channel(8), channel(0))
    }

    /// Set metalness and roughness, clamped to 0..1
    pub fn with_surface(mut self, metalness: f32, roughness: f32) -> Self {
        self.metalness = metalness.clamp(0.0, 1.0);
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Surface parameters as laid out for the GPU: (metalness, roughness, 0, 0)
    #[inline]
    pub fn surface(&self) -> [f32; 4] {
        [self.metalness, self.roughness, 0.0, 0.0]
    }

    /// White material
    pub const WHITE: Self = Self::from_rgb(1.0, 1.0, 1.0);

    /// Gray material
    pub const GRAY: Self = Self::from_rgb(0.5, 0.5, 0.5);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        let m = Material::from_hex(0xff8000);
        assert_eq!(m.base_color[0], 1.0);
        assert!((m.base_color[1] - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(m.base_color[2], 0.0);
        assert_eq!(m.base_color[3], 1.0);
    }

    #[test]
    fn test_with_surface_clamps() {
        let m = Material::GRAY.with_surface(1.5, -0.2);
        assert_eq!(m.metalness, 1.0);
        assert_eq!(m.roughness, 0.0);
        assert_eq!(m.surface(), [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let m: Material = ron::from_str("(metalness: 0.8)").unwrap();
        assert_eq!(m.metalness, 0.8);
        assert_eq!(m.base_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(m.roughness, 0.5);
    }

    #[test]
    fn test_shadow_flags() {
        let flags = ShadowFlags::CAST | ShadowFlags::RECEIVE;
        assert_eq!(flags, ShadowFlags::ALL);
        assert!(ShadowFlags::default().is_empty());
    }
}
