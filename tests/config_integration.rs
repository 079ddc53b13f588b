//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use gearfolio::config::AppConfig;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("GF_WINDOW__TITLE", "Test From Env");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.window.title, "Test From Env");
    std::env::remove_var("GF_WINDOW__TITLE");
}

#[test]
#[serial]
fn test_nested_env_override() {
    std::env::set_var("GF_VIEWER__OVERRIDE__ROUGHNESS", "0.9");
    std::env::set_var("GF_BACKDROP__PARTICLE_COUNT", "42");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.viewer.material_override.roughness, Some(0.9));
    assert_eq!(config.backdrop.particle_count, Some(42));
    std::env::remove_var("GF_VIEWER__OVERRIDE__ROUGHNESS");
    std::env::remove_var("GF_BACKDROP__PARTICLE_COUNT");
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("GF_WINDOW__TITLE");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = AppConfig::load().unwrap();
    assert_eq!(config.backdrop.scene_path.to_str(), Some("scenes/backdrop.ron"));
    assert_eq!(config.viewer.material_override.metalness, Some(0.6));
    assert!(config.viewer.material_override.base_color.is_none());
}

#[test]
#[serial]
fn test_missing_config_dir_uses_defaults() {
    let config = AppConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.window.width, 1280);
    assert_eq!(config.camera.fov, 45.0);
}
