//! Project viewer system
//!
//! Handles the viewer's open/close state, background model loading, the
//! placeholder shown while the model is not ready, and the model's
//! turntable spin.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use gearfolio_core::{AssetCache, AssetLoader, InstanceRaw, ModelAsset, ModelSlot, ModelState};
use gearfolio_render::OrbitCamera;

use crate::config::ViewerConfig;

/// Manages the project viewer
pub struct ViewerSystem {
    config: ViewerConfig,
    loader: AssetLoader<ModelAsset>,
    cache: AssetCache,
    slot: Option<ModelSlot>,
    camera: OrbitCamera,
    spin: f32,
    model_changed: bool,
}

impl ViewerSystem {
    /// Create a closed viewer
    pub fn new(config: ViewerConfig) -> Self {
        let camera = OrbitCamera::new(Vec3::ZERO, config.camera_distance)
            .with_distance_limits(config.fit_size * 0.5, config.camera_distance * 4.0);
        Self {
            config,
            loader: AssetLoader::new(),
            cache: AssetCache::new(),
            slot: None,
            camera,
            spin: 0.0,
            model_changed: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.slot.is_some()
    }

    /// Open the viewer and request the configured model
    pub fn open(&mut self) {
        if self.is_open() {
            return;
        }
        let slot = ModelSlot::request(
            self.config.model_path.clone(),
            self.config.material_override.clone(),
            &mut self.loader,
            &mut self.cache,
        );
        log::info!("Viewer opened: {}", self.config.model_path.display());
        self.slot = Some(slot);
        self.spin = 0.0;
        self.model_changed = true;
    }

    /// Close the viewer, dropping its claim on the model
    pub fn close(&mut self) {
        if let Some(slot) = self.slot.take() {
            slot.release(&mut self.cache);
            let removed = self.cache.gc();
            log::info!("Viewer closed ({} cached models released)", removed);
            self.model_changed = true;
        }
    }

    /// Open when closed, close when open; returns the new open state
    pub fn toggle(&mut self) -> bool {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
        self.is_open()
    }

    /// Collect finished loads; returns true when the shown model changed
    ///
    /// Results for a slot that has been closed are discarded.
    pub fn poll(&mut self) -> bool {
        for result in self.loader.poll_all() {
            let accepted = match &mut self.slot {
                Some(slot) => slot.accept(result, &mut self.cache),
                None => false,
            };
            if accepted {
                self.model_changed = true;
            } else {
                log::debug!("Discarding model load for a closed viewer");
            }
        }
        std::mem::take(&mut self.model_changed)
    }

    /// Advance the turntable
    pub fn update(&mut self, dt: f32) {
        if self.model().is_some() {
            self.spin = (self.spin + self.config.spin_speed * dt).rem_euclid(std::f32::consts::TAU);
        }
    }

    /// Load state of the open viewer
    pub fn state(&self) -> Option<&ModelState> {
        self.slot.as_ref().map(|slot| slot.state())
    }

    /// Placeholder text while the open viewer has no model to show
    pub fn placeholder(&self) -> Option<&'static str> {
        self.state().and_then(|state| state.placeholder())
    }

    /// The ready model, if any
    pub fn model(&self) -> Option<&Arc<ModelAsset>> {
        self.state().and_then(|state| state.model())
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut OrbitCamera {
        &mut self.camera
    }

    /// Model matrix of the whole model: turntable spin after fitting
    pub fn model_transform(&self, model: &ModelAsset) -> Mat4 {
        Mat4::from_rotation_y(self.spin) * model.fit_transform(self.config.fit_size)
    }

    /// One instance per model mesh, in mesh order
    pub fn instances(&self) -> Vec<InstanceRaw> {
        let Some(model) = self.model() else {
            return Vec::new();
        };
        let root = self.model_transform(model);
        model
            .meshes
            .iter()
            .map(|mesh| InstanceRaw::new(root * mesh.transform, &mesh.material))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    fn wait_for_load(viewer: &mut ViewerSystem) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            viewer.poll();
            if !viewer.state().is_some_and(|s| s.is_pending()) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        false
    }

    fn missing_model_viewer() -> ViewerSystem {
        ViewerSystem::new(ViewerConfig {
            model_path: PathBuf::from("does/not/exist.glb"),
            ..ViewerConfig::default()
        })
    }

    #[test]
    fn test_closed_viewer_has_no_placeholder() {
        let viewer = missing_model_viewer();
        assert!(!viewer.is_open());
        assert!(viewer.placeholder().is_none());
        assert!(viewer.instances().is_empty());
    }

    #[test]
    fn test_missing_model_shows_unavailable() {
        let mut viewer = missing_model_viewer();
        viewer.open();
        assert_eq!(viewer.placeholder(), Some(gearfolio_core::LOADING_TEXT));

        assert!(wait_for_load(&mut viewer));
        assert_eq!(viewer.placeholder(), Some(gearfolio_core::UNAVAILABLE_TEXT));
        assert!(viewer.instances().is_empty());
    }

    #[test]
    fn test_toggle() {
        let mut viewer = missing_model_viewer();
        assert!(viewer.toggle());
        assert!(!viewer.toggle());
        assert!(viewer.state().is_none());
    }

    #[test]
    fn test_result_for_closed_viewer_is_discarded() {
        let mut viewer = missing_model_viewer();
        viewer.open();
        viewer.close();
        viewer.poll();
        std::thread::sleep(Duration::from_millis(200));
        assert!(!viewer.poll());
        assert!(viewer.state().is_none());
    }
}
