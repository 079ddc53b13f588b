//! Backdrop scene construction
//!
//! Scenes come from a RON file when one is available, otherwise from the
//! built-in showcase. Configured overrides are applied on top.

mod backdrop_builder;

use std::path::Path;

use gearfolio_core::BackdropScene;

use crate::config::BackdropConfig;

pub use backdrop_builder::{pitch_radius, BackdropBuilder};

/// Load the backdrop scene at `path`, falling back to the built-in showcase
pub fn load_backdrop_scene(path: &Path) -> BackdropScene {
    match BackdropScene::load(path) {
        Ok(scene) => {
            log::info!("Loaded backdrop scene '{}' from {}", scene.name, path.display());
            scene
        }
        Err(e) => {
            log::warn!("Failed to load backdrop scene {}: {}. Using built-in scene.", path.display(), e);
            BackdropScene::showcase()
        }
    }
}

/// Load the configured scene and apply the configured overrides
pub fn configured_scene(config: &BackdropConfig) -> BackdropScene {
    let mut builder = BackdropBuilder::from_scene(load_backdrop_scene(&config.scene_path));
    if let Some(count) = config.particle_count {
        builder = builder.with_particle_count(count);
    }
    if let Some(seed) = config.seed {
        builder = builder.with_seed(seed);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_falls_back_to_showcase() {
        let scene = load_backdrop_scene(Path::new("does/not/exist.ron"));
        assert_eq!(scene, BackdropScene::showcase());
    }

    #[test]
    fn test_garbage_file_falls_back_to_showcase() {
        let path = std::env::temp_dir().join(format!("gearfolio_garbage_{}.ron", std::process::id()));
        std::fs::write(&path, "this is not ron (").unwrap();
        let scene = load_backdrop_scene(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(scene.name, "Showcase");
    }

    #[test]
    fn test_configured_overrides() {
        let config = BackdropConfig {
            scene_path: PathBuf::from("does/not/exist.ron"),
            particle_count: Some(25),
            seed: Some(99),
            ..BackdropConfig::default()
        };
        let scene = configured_scene(&config);
        let particles = scene.particles.unwrap();
        assert_eq!(particles.scatter.count, 25);
        assert_eq!(particles.scatter.seed, 99);
    }
}
