//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`GF_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use gearfolio_core::MaterialOverride;
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Window configuration
    #[serde(default)]
    pub window: WindowConfig,
    /// Camera configuration
    #[serde(default)]
    pub camera: CameraConfig,
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,
    /// Backdrop configuration
    #[serde(default)]
    pub backdrop: BackdropConfig,
    /// Project viewer configuration
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Rendering configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`GF_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // GF_WINDOW__TITLE=Test -> window.title = "Test"
        figment = figment.merge(Env::prefixed("GF_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Start in fullscreen mode
    pub fullscreen: bool,
    /// Enable VSync
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Gearfolio".to_string(),
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Starting eye position [x, y, z] (a scene may override it)
    pub start_position: [f32; 3],
    /// Point the camera orbits around
    pub target: [f32; 3],
    /// Field of view in degrees
    pub fov: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Closest zoom distance
    pub min_distance: f32,
    /// Farthest zoom distance
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [0.0, 0.0, 12.0],
            target: [0.0, 0.0, -4.0],
            fov: 45.0,
            near: 0.1,
            far: 100.0,
            min_distance: 4.0,
            max_distance: 40.0,
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Orbit speed while dragging (radians per pixel)
    pub rotate_sensitivity: f32,
    /// Zoom step per wheel line (fraction of the distance)
    pub zoom_sensitivity: f32,
    /// Idle auto-rotation speed (radians per second, 0 disables)
    pub auto_rotate_speed: f32,
    /// Seconds without input before auto-rotation starts
    pub auto_rotate_delay: f32,
    /// Input smoothing half-life in seconds (lower = more responsive)
    pub smoothing_half_life: f32,
    /// Enable input smoothing
    pub smoothing_enabled: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.005,
            zoom_sensitivity: 0.1,
            auto_rotate_speed: 0.05,
            auto_rotate_delay: 3.0,
            smoothing_half_life: 0.08,
            smoothing_enabled: true,
        }
    }
}

/// Backdrop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// RON scene file; the built-in scene is used if it cannot be loaded
    pub scene_path: PathBuf,
    /// Multiplier on the animation clock
    pub time_scale: f32,
    /// Start with the animation clock stopped
    pub start_paused: bool,
    /// Override the scene's particle count
    pub particle_count: Option<usize>,
    /// Override the scene's scatter seed
    pub seed: Option<u64>,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::from("scenes/backdrop.ron"),
            time_scale: 1.0,
            start_paused: false,
            particle_count: None,
            seed: None,
        }
    }
}

/// Project viewer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Binary glTF model shown in the viewer
    pub model_path: PathBuf,
    /// Open the viewer at startup
    pub open_on_start: bool,
    /// Size of the model's largest side after fitting
    pub fit_size: f32,
    /// Turntable speed (radians per second)
    pub spin_speed: f32,
    /// Viewer camera distance
    pub camera_distance: f32,
    /// Material forced onto every mesh of the model
    #[serde(rename = "override")]
    pub material_override: MaterialOverride,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("assets/models/project.glb"),
            open_on_start: false,
            fit_size: 3.0,
            spin_speed: 0.4,
            camera_distance: 6.0,
            material_override: MaterialOverride {
                base_color: None,
                metalness: Some(0.6),
                roughness: Some(0.35),
                cast_shadow: Some(true),
                receive_shadow: Some(true),
            },
        }
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderingConfig {
    /// Background color [r, g, b, a]
    pub background_color: [f32; 4],
    /// Light direction [x, y, z]
    pub light_dir: [f32; 3],
    /// Ambient light strength
    pub ambient_strength: f32,
    /// Diffuse light strength
    pub diffuse_strength: f32,
    /// Distance fog density (0 disables)
    pub fog_density: f32,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            background_color: [0.04, 0.05, 0.08, 1.0],
            light_dir: [0.4, 0.8, 0.45],
            ambient_strength: 0.35,
            diffuse_strength: 0.9,
            fog_density: 0.03,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Show frame time and instance count in the window title
    pub show_stats: bool,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            show_stats: false,
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
