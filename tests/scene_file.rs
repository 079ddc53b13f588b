//! The shipped backdrop scene loads and animates

use std::path::Path;

use gearfolio::config::BackdropConfig;
use gearfolio::scene::{configured_scene, pitch_radius};
use gearfolio::systems::BackdropSystem;
use gearfolio_core::{Backdrop, BackdropScene};
use glam::Vec3;

const SCENE_PATH: &str = "scenes/backdrop.ron";

#[test]
fn test_shipped_scene_parses() {
    let scene = BackdropScene::load(SCENE_PATH).unwrap();
    assert_eq!(scene.name, "Portfolio");
    assert_eq!(scene.gears.len(), 4);
    assert_eq!(scene.particles.as_ref().map(|p| p.classes.len()), Some(5));
    assert!(scene.drone.is_some());
    assert_eq!(scene.camera_position, Some([0.0, 0.0, 12.0]));
}

#[test]
fn test_shipped_scene_matches_builtin_layout() {
    let scene = BackdropScene::load(SCENE_PATH).unwrap();
    let backdrop = Backdrop::from_scene(&scene).unwrap();
    let showcase = Backdrop::from_scene(&BackdropScene::showcase()).unwrap();
    assert_eq!(backdrop.instance_count(), showcase.instance_count());
    assert_eq!(backdrop.group_count(), showcase.group_count());
}

#[test]
fn test_shipped_gear_pair_meshes() {
    let scene = BackdropScene::load(SCENE_PATH).unwrap();
    let main = &scene.gears[0];
    let follower = &scene.gears[1];
    assert_eq!(follower.driven_by.as_deref(), Some("main"));

    let distance = Vec3::from(main.position).distance(Vec3::from(follower.position));
    let expected = pitch_radius(main) + pitch_radius(follower);
    assert!((distance - expected).abs() < 1e-3, "{} vs {}", distance, expected);
}

#[test]
fn test_configured_scene_applies_overrides() {
    let config = BackdropConfig {
        particle_count: Some(10),
        ..BackdropConfig::default()
    };
    assert!(Path::new(&config.scene_path).exists());

    let scene = configured_scene(&config);
    assert_eq!(scene.name, "Portfolio");
    assert_eq!(scene.particles.as_ref().map(|p| p.scatter.count), Some(10));

    let mut system = BackdropSystem::new(&scene, &config).unwrap();
    system.attach();
    system.step(0.5);
    let mut written = 0;
    system.backdrop_mut().drain_dirty(|_, _, instances| written += instances.len());
    assert_eq!(written, system.backdrop().instance_count());
}
