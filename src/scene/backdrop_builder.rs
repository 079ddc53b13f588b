//! BackdropBuilder - Declarative backdrop construction
//!
//! Provides a fluent API for building backdrop scenes, including gears
//! placed so that they mesh with an earlier gear.

use glam::{EulerRot, Quat, Vec3};
use gearfolio_core::{BackdropScene, DroneConfig, GearTemplate, ParticleTemplate};

/// Radius at which two flat-toothed gears touch: halfway up the teeth
pub fn pitch_radius(gear: &GearTemplate) -> f32 {
    (gear.outer_radius + gear.inner_radius) * 0.5 * gear.scale
}

/// Builder for constructing backdrop scenes
///
/// # Example
/// ```ignore
/// let scene = BackdropBuilder::new("Workshop")
///     .add_gear(GearTemplate::new(2.0, 1.7, 0.6, 16, 0.4).with_name("main").placed([0.0; 3], [0.0; 3], 0.3))
///     .add_meshing_gear(GearTemplate::new(1.2, 1.0, 0.35, 10, 0.4), "main", 0.0)
///     .with_drone(DroneConfig::default())
///     .build();
/// ```
pub struct BackdropBuilder {
    scene: BackdropScene,
}

impl BackdropBuilder {
    /// Create a builder for an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            scene: BackdropScene::new(name),
        }
    }

    /// Continue building from an existing scene
    pub fn from_scene(scene: BackdropScene) -> Self {
        Self { scene }
    }

    /// Set the initial camera position
    pub fn with_camera(mut self, position: [f32; 3]) -> Self {
        self.scene.camera_position = Some(position);
        self
    }

    /// Add a gear as configured
    pub fn add_gear(mut self, gear: GearTemplate) -> Self {
        self.scene.add_gear(gear);
        self
    }

    /// Add a gear meshing with the earlier gear named `driver`
    ///
    /// The new gear is placed in the driver's plane, in direction `angle`
    /// (radians, measured in the driver's local XY plane) at the sum of
    /// both pitch radii, and takes the driver's tilt. Spin and phase are
    /// derived when the scene is built. An unknown driver leaves the gear
    /// where it is; building the scene then reports the missing driver.
    pub fn add_meshing_gear(mut self, mut gear: GearTemplate, driver: &str, angle: f32) -> Self {
        match self.scene.gears.iter().find(|g| g.name.as_deref() == Some(driver)) {
            Some(parent) => {
                let tilt = Quat::from_euler(EulerRot::XYZ, parent.tilt[0], parent.tilt[1], parent.tilt[2]);
                let distance = pitch_radius(parent) + pitch_radius(&gear);
                let offset = tilt * Vec3::new(angle.cos(), angle.sin(), 0.0) * distance;
                gear.position = (Vec3::from(parent.position) + offset).to_array();
                gear.tilt = parent.tilt;
            }
            None => log::warn!("Gear driver '{}' not found, gear left unplaced", driver),
        }
        self.scene.add_gear(gear.driven_by(driver));
        self
    }

    /// Set the particle field
    pub fn with_particles(mut self, particles: ParticleTemplate) -> Self {
        self.scene.particles = Some(particles);
        self
    }

    /// Override the number of scattered particles (no-op without a particle field)
    pub fn with_particle_count(mut self, count: usize) -> Self {
        if let Some(particles) = &mut self.scene.particles {
            particles.scatter.count = count;
        }
        self
    }

    /// Override the scatter seed (no-op without a particle field)
    pub fn with_seed(mut self, seed: u64) -> Self {
        if let Some(particles) = &mut self.scene.particles {
            particles.scatter.seed = seed;
        }
        self
    }

    /// Add the hovering drone
    pub fn with_drone(mut self, drone: DroneConfig) -> Self {
        self.scene.drone = Some(drone);
        self
    }

    /// Remove the drone
    pub fn without_drone(mut self) -> Self {
        self.scene.drone = None;
        self
    }

    /// Finish and return the scene
    pub fn build(self) -> BackdropScene {
        self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearfolio_core::{Backdrop, SceneBuildError};

    fn main_gear() -> GearTemplate {
        GearTemplate::new(2.0, 1.7, 0.6, 16, 0.4)
            .with_name("main")
            .placed([-5.0, 2.0, -4.0], [0.0; 3], 0.3)
    }

    #[test]
    fn test_meshing_gear_distance() {
        let scene = BackdropBuilder::new("test")
            .add_gear(main_gear())
            .add_meshing_gear(GearTemplate::new(1.2, 1.0, 0.35, 10, 0.4), "main", -std::f32::consts::FRAC_PI_6)
            .build();

        let (a, b) = (Vec3::from(scene.gears[0].position), Vec3::from(scene.gears[1].position));
        assert!(((a - b).length() - 2.95).abs() < 1e-4);
        assert_eq!(scene.gears[1].driven_by.as_deref(), Some("main"));
    }

    #[test]
    fn test_meshing_gear_spins_opposite() {
        let scene = BackdropBuilder::new("test")
            .add_gear(main_gear())
            .add_meshing_gear(GearTemplate::new(1.2, 1.0, 0.35, 10, 0.4), "main", 0.0)
            .build();
        let gears = scene.gear_instances().unwrap();
        assert!((gears[1].spin_speed + 0.3 * 16.0 / 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_meshing_gear_follows_tilt() {
        let tilted = main_gear().placed([0.0; 3], [0.0, std::f32::consts::FRAC_PI_2, 0.0], 0.3);
        let scene = BackdropBuilder::new("test")
            .add_gear(tilted)
            .add_meshing_gear(GearTemplate::new(1.2, 1.0, 0.35, 10, 0.4), "main", 0.0)
            .build();
        // Local +X turned a quarter around Y points along -Z
        let p = Vec3::from(scene.gears[1].position);
        assert!(p.x.abs() < 1e-5);
        assert!((p.z + 2.95).abs() < 1e-4);
    }

    #[test]
    fn test_unknown_driver_fails_build() {
        let scene = BackdropBuilder::new("test")
            .add_meshing_gear(GearTemplate::new(1.2, 1.0, 0.35, 10, 0.4), "missing", 0.0)
            .build();
        assert!(matches!(
            Backdrop::from_scene(&scene),
            Err(SceneBuildError::UnknownDriver { .. })
        ));
    }

    #[test]
    fn test_particle_overrides() {
        let scene = BackdropBuilder::from_scene(BackdropScene::showcase())
            .with_particle_count(50)
            .with_seed(7)
            .without_drone()
            .build();
        let particles = scene.particles.as_ref().unwrap();
        assert_eq!(particles.scatter.count, 50);
        assert_eq!(particles.scatter.seed, 7);
        assert!(scene.drone.is_none());
    }

    #[test]
    fn test_overrides_without_particles_are_noops() {
        let scene = BackdropBuilder::new("empty").with_particle_count(10).with_seed(1).build();
        assert!(scene.particles.is_none());
        assert!(scene.gears.is_empty());
    }
}
