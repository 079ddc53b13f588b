//! Backdrop scene description
//!
//! A [`BackdropScene`] is the serializable (RON) description of the whole
//! animated backdrop: individually placed gears, a scattered particle field
//! and an optional drone. [`Backdrop`](crate::Backdrop) turns it into
//! animated instance sources.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use glam::Vec3;
use gearfolio_geometry::{GearSpec, GearSpecError, ShapeError, DEFAULT_BEVEL_SEGMENTS};
use serde::{Deserialize, Serialize};

use crate::animator::AnimatorError;
use crate::drone::DroneConfig;
use crate::gear_train::GearInstance;
use crate::material::Material;
use crate::preset::AnimationPreset;
use crate::scatter::{ScatterConfig, ScatterError};
use crate::shapes::ShapeTemplate;

fn default_scale() -> f32 {
    1.0
}

fn default_bevel_segments() -> u32 {
    DEFAULT_BEVEL_SEGMENTS
}

/// Bevel parameters of a gear template
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BevelTemplate {
    /// Depth of the bevel along the gear axis
    pub thickness: f32,
    /// Outward offset of the outline
    pub size: f32,
    /// Quarter-circle steps
    #[serde(default = "default_bevel_segments")]
    pub segments: u32,
}

/// A single gear in the scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearTemplate {
    /// Name, used by `driven_by` and in error messages
    #[serde(default)]
    pub name: Option<String>,
    /// Tooth tip radius
    pub outer_radius: f32,
    /// Tooth root radius
    pub inner_radius: f32,
    /// Center hole radius
    pub hole_radius: f32,
    /// Number of teeth
    pub tooth_count: u32,
    /// Thickness of the gear body
    pub depth: f32,
    /// Optional rounded edges
    #[serde(default)]
    pub bevel: Option<BevelTemplate>,
    /// Surface material
    #[serde(default)]
    pub material: Material,
    /// Center of rotation
    pub position: [f32; 3],
    /// Fixed XYZ Euler tilt
    #[serde(default)]
    pub tilt: [f32; 3],
    /// Radians per second about the gear axis
    #[serde(default)]
    pub spin_speed: f32,
    /// Spin angle at t = 0
    #[serde(default)]
    pub phase: f32,
    /// Uniform scale
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Name of an earlier gear this one meshes with; overrides spin and phase
    #[serde(default)]
    pub driven_by: Option<String>,
}

impl GearTemplate {
    /// An untilted, still gear without bevel
    pub fn new(outer_radius: f32, inner_radius: f32, hole_radius: f32, tooth_count: u32, depth: f32) -> Self {
        Self {
            name: None,
            outer_radius,
            inner_radius,
            hole_radius,
            tooth_count,
            depth,
            bevel: None,
            material: Material::default(),
            position: [0.0; 3],
            tilt: [0.0; 3],
            spin_speed: 0.0,
            phase: 0.0,
            scale: 1.0,
            driven_by: None,
        }
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the bevel
    pub fn with_bevel(mut self, thickness: f32, size: f32) -> Self {
        self.bevel = Some(BevelTemplate { thickness, size, segments: DEFAULT_BEVEL_SEGMENTS });
        self
    }

    /// Set the material
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Set position, tilt and spin
    pub fn placed(mut self, position: [f32; 3], tilt: [f32; 3], spin_speed: f32) -> Self {
        self.position = position;
        self.tilt = tilt;
        self.spin_speed = spin_speed;
        self
    }

    /// Mesh with an earlier gear
    pub fn driven_by(mut self, driver: impl Into<String>) -> Self {
        self.driven_by = Some(driver.into());
        self
    }

    /// Validated gear spec
    pub fn spec(&self) -> Result<GearSpec, GearSpecError> {
        let spec = GearSpec::new(
            self.outer_radius,
            self.inner_radius,
            self.hole_radius,
            self.tooth_count,
            self.depth,
        )?;
        match self.bevel {
            Some(b) => spec.with_bevel(b.thickness, b.size, b.segments),
            None => Ok(spec),
        }
    }

    fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{}", index))
    }
}

/// Shape and material of one particle class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleClassTemplate {
    /// Mesh of the class
    pub shape: ShapeTemplate,
    /// Material of the class
    #[serde(default)]
    pub material: Material,
}

/// Scattered particle field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleTemplate {
    /// Placement parameters (`class_count` is taken from `classes`)
    #[serde(default)]
    pub scatter: ScatterConfig,
    /// Per-frame motion
    #[serde(default)]
    pub preset: AnimationPreset,
    /// One entry per geometry class
    pub classes: Vec<ParticleClassTemplate>,
}

impl ParticleTemplate {
    /// Scatter config with the class count matching `classes`
    pub fn scatter_config(&self) -> ScatterConfig {
        ScatterConfig {
            class_count: self.classes.len(),
            ..self.scatter.clone()
        }
    }
}

/// Serializable description of the animated backdrop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackdropScene {
    /// Scene name (for display/debugging)
    pub name: String,
    /// Individually placed gears
    #[serde(default)]
    pub gears: Vec<GearTemplate>,
    /// Scattered particle field
    #[serde(default)]
    pub particles: Option<ParticleTemplate>,
    /// Hovering drone
    #[serde(default)]
    pub drone: Option<DroneConfig>,
    /// Initial camera position, overriding the configured one
    #[serde(default)]
    pub camera_position: Option<[f32; 3]>,
}

impl BackdropScene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gears: Vec::new(),
            particles: None,
            drone: None,
            camera_position: None,
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save the scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new().enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Add a gear
    pub fn add_gear(&mut self, gear: GearTemplate) {
        self.gears.push(gear);
    }

    /// Gear instances with validated specs and resolved `driven_by` links
    ///
    /// A driver must appear before the gears it drives.
    pub fn gear_instances(&self) -> Result<Vec<GearInstance>, SceneBuildError> {
        let mut gears: Vec<GearInstance> = Vec::with_capacity(self.gears.len());
        for (index, template) in self.gears.iter().enumerate() {
            let spec = template.spec().map_err(|source| SceneBuildError::Gear {
                gear: template.label(index),
                source,
            })?;

            let mut gear = GearInstance::new(spec, Vec3::from(template.position));
            gear.material = template.material;
            gear.tilt = Vec3::from(template.tilt);
            gear.spin_speed = template.spin_speed;
            gear.phase = template.phase;
            gear.scale = template.scale;

            if let Some(driver_name) = &template.driven_by {
                let driver = self.gears[..index]
                    .iter()
                    .position(|g| g.name.as_deref() == Some(driver_name.as_str()))
                    .ok_or_else(|| SceneBuildError::UnknownDriver {
                        gear: template.label(index),
                        driver: driver_name.clone(),
                    })?;
                let driver = gears[driver].clone();
                gear.driven_by(&driver);
            }
            gears.push(gear);
        }
        Ok(gears)
    }

    /// The built-in backdrop, used when no scene file can be loaded
    pub fn showcase() -> Self {
        let gear_metal = |hex| Material::from_hex(hex).with_surface(0.8, 0.3);
        let mut scene = BackdropScene::new("Showcase");

        scene.add_gear(
            GearTemplate::new(2.0, 1.7, 0.6, 16, 0.4)
                .with_name("main")
                .with_bevel(0.05, 0.04)
                .with_material(gear_metal(0x3b82f6))
                .placed([-5.0, 2.0, -4.0], [0.0; 3], 0.3),
        );
        scene.add_gear(
            GearTemplate::new(1.2, 1.0, 0.35, 10, 0.4)
                .with_name("follower")
                .with_bevel(0.05, 0.04)
                .with_material(gear_metal(0xf59e0b))
                .placed([-2.445, 0.525, -4.0], [0.0; 3], 0.0)
                .driven_by("main"),
        );
        scene.add_gear(
            GearTemplate::new(0.9, 0.75, 0.3, 8, 0.3)
                .with_name("small")
                .with_material(gear_metal(0x10b981))
                .placed([5.5, -2.5, -3.0], [0.4, -0.3, 0.0], -0.6),
        );
        scene.add_gear(
            GearTemplate::new(2.0, 1.7, 0.6, 16, 0.4)
                .with_name("distant")
                .with_bevel(0.05, 0.04)
                .with_material(gear_metal(0x8b5cf6))
                .placed([6.0, 3.5, -8.0], [0.2, 0.5, 0.0], 0.2),
        );

        let particle = |shape, hex| ParticleClassTemplate {
            shape,
            material: Material::from_hex(hex).with_surface(0.3, 0.5),
        };
        scene.particles = Some(ParticleTemplate {
            scatter: ScatterConfig::default(),
            preset: AnimationPreset::default(),
            classes: vec![
                particle(ShapeTemplate::Box { width: 0.5, height: 0.5, depth: 0.5 }, 0x6366f1),
                particle(
                    ShapeTemplate::Cylinder { radius_top: 0.25, radius_bottom: 0.25, height: 0.5, segments: 12 },
                    0x22d3ee,
                ),
                particle(ShapeTemplate::Cone { radius: 0.3, height: 0.6, segments: 12 }, 0xf472b6),
                particle(ShapeTemplate::Dodecahedron { radius: 0.3 }, 0xa3e635),
                particle(
                    ShapeTemplate::Torus { radius: 0.25, tube: 0.08, radial_segments: 8, tubular_segments: 16 },
                    0xfbbf24,
                ),
            ],
        });
        scene.drone = Some(DroneConfig::default());
        scene.camera_position = Some([0.0, 0.0, 12.0]);
        scene
    }
}

/// Error loading a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Error saving a scene
#[derive(Debug)]
pub enum SceneSaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

/// Error turning a scene description into animated sources
#[derive(Debug)]
pub enum SceneBuildError {
    /// A gear has invalid parameters
    Gear {
        /// Gear name or index
        gear: String,
        /// What is wrong with it
        source: GearSpecError,
    },
    /// A particle class shape has invalid parameters
    Shape {
        /// Class index
        class: usize,
        /// What is wrong with it
        source: ShapeError,
    },
    /// `driven_by` names no earlier gear
    UnknownDriver {
        /// Gear name or index
        gear: String,
        /// The missing driver name
        driver: String,
    },
    /// Invalid particle placement
    Scatter(ScatterError),
    /// Particle partitioning failed
    Animator(AnimatorError),
    /// The drone meshes could not be built
    Drone(ShapeError),
}

impl fmt::Display for SceneBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneBuildError::Gear { gear, source } => write!(f, "Gear {}: {}", gear, source),
            SceneBuildError::Shape { class, source } => {
                write!(f, "Particle class {}: {}", class, source)
            }
            SceneBuildError::UnknownDriver { gear, driver } => {
                write!(f, "Gear {} is driven by unknown gear '{}'", gear, driver)
            }
            SceneBuildError::Scatter(e) => write!(f, "Scatter error: {}", e),
            SceneBuildError::Animator(e) => write!(f, "Animator error: {}", e),
            SceneBuildError::Drone(e) => write!(f, "Drone error: {}", e),
        }
    }
}

impl std::error::Error for SceneBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneBuildError::Gear { source, .. } => Some(source),
            SceneBuildError::Shape { source, .. } => Some(source),
            SceneBuildError::Scatter(e) => Some(e),
            SceneBuildError::Animator(e) => Some(e),
            SceneBuildError::Drone(e) => Some(e),
            SceneBuildError::UnknownDriver { .. } => None,
        }
    }
}

impl From<ScatterError> for SceneBuildError {
    fn from(e: ScatterError) -> Self {
        SceneBuildError::Scatter(e)
    }
}

impl From<AnimatorError> for SceneBuildError {
    fn from(e: AnimatorError) -> Self {
        SceneBuildError::Animator(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_new() {
        let scene = BackdropScene::new("Empty");
        assert_eq!(scene.name, "Empty");
        assert!(scene.gears.is_empty());
        assert!(scene.particles.is_none());
        assert!(scene.gear_instances().unwrap().is_empty());
    }

    #[test]
    fn test_showcase_is_valid() {
        let scene = BackdropScene::showcase();
        let gears = scene.gear_instances().unwrap();
        assert_eq!(gears.len(), 4);
        // The follower counter-rotates at the tooth ratio
        assert!((gears[1].spin_speed + 0.3 * 16.0 / 10.0).abs() < 1e-6);
        let particles = scene.particles.as_ref().unwrap();
        assert_eq!(particles.scatter_config().class_count, 5);
        for class in &particles.classes {
            assert!(class.shape.create_mesh().is_ok());
        }
    }

    #[test]
    fn test_invalid_gear_is_reported_by_name() {
        let mut scene = BackdropScene::new("Bad");
        scene.add_gear(GearTemplate::new(1.0, 2.0, 0.5, 12, 0.2).with_name("inverted"));
        let err = scene.gear_instances().unwrap_err();
        assert!(matches!(
            &err,
            SceneBuildError::Gear { source: GearSpecError::InnerNotBelowOuter { .. }, .. }
        ));
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn test_driver_must_come_first() {
        let mut scene = BackdropScene::new("Order");
        scene.add_gear(GearTemplate::new(1.0, 0.8, 0.3, 12, 0.2).driven_by("later"));
        scene.add_gear(GearTemplate::new(1.0, 0.8, 0.3, 12, 0.2).with_name("later"));
        assert!(matches!(
            scene.gear_instances(),
            Err(SceneBuildError::UnknownDriver { .. })
        ));
    }

    #[test]
    fn test_ron_roundtrip() {
        let scene = BackdropScene::showcase();
        let text = ron::ser::to_string_pretty(&scene, ron::ser::PrettyConfig::new()).unwrap();
        let back: BackdropScene = ron::from_str(&text).unwrap();
        assert_eq!(back, scene);
    }

    #[test]
    fn test_minimal_ron_uses_defaults() {
        let text = r#"(
            name: "Minimal",
            gears: [
                (outer_radius: 2.0, inner_radius: 1.7, hole_radius: 0.5, tooth_count: 12,
                 depth: 0.4, position: (0.0, 0.0, -3.0),
                 bevel: Some((thickness: 0.05, size: 0.04))),
            ],
        )"#;
        let scene: BackdropScene = ron::from_str(text).unwrap();
        let gear = &scene.gears[0];
        assert_eq!(gear.scale, 1.0);
        assert_eq!(gear.bevel.map(|b| b.segments), Some(DEFAULT_BEVEL_SEGMENTS));
        assert!(gear.spec().is_ok());
        assert!(scene.drone.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join("gearfolio_scene_test.ron");
        let scene = BackdropScene::showcase();
        scene.save(&path).unwrap();
        let loaded = BackdropScene::load(&path).unwrap();
        assert_eq!(loaded, scene);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            BackdropScene::load("/nonexistent/backdrop.ron"),
            Err(SceneLoadError::Io(_))
        ));
    }
}
