//! Backdrop animation system
//!
//! Manages the animated backdrop including:
//! - Delta time calculation
//! - The pausable, scalable animation clock
//! - Per-frame instance updates

use std::time::Instant;

use gearfolio_core::{Backdrop, BackdropScene, SceneBuildError};

use crate::config::BackdropConfig;

/// Longest frame step; longer gaps (first frame, window drag) are clamped
const MAX_FRAME_DT: f32 = 0.25;

/// Elapsed animation time, independent of wall-clock time
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationClock {
    elapsed: f32,
    time_scale: f32,
    paused: bool,
}

impl AnimationClock {
    /// A clock at t = 0
    pub fn new(time_scale: f32, paused: bool) -> Self {
        Self {
            elapsed: 0.0,
            time_scale,
            paused,
        }
    }

    /// Advance by `dt` wall-clock seconds, returning the new elapsed time
    pub fn advance(&mut self, dt: f32) -> f32 {
        if !self.paused && dt.is_finite() && dt > 0.0 {
            self.elapsed += dt * self.time_scale;
        }
        self.elapsed
    }

    /// Elapsed animation time in seconds
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop or resume, returning the new paused state
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }
}

/// Owns the backdrop and drives it every frame
pub struct BackdropSystem {
    backdrop: Backdrop,
    clock: AnimationClock,
    last_frame: Instant,
    scene_name: String,
}

impl BackdropSystem {
    /// Build the backdrop from `scene`
    pub fn new(scene: &BackdropScene, config: &BackdropConfig) -> Result<Self, SceneBuildError> {
        let backdrop = Backdrop::from_scene(scene)?;
        log::info!(
            "Backdrop '{}': {} instances in {} groups",
            scene.name,
            backdrop.instance_count(),
            backdrop.group_count()
        );
        Ok(Self {
            backdrop,
            clock: AnimationClock::new(config.time_scale, config.start_paused),
            last_frame: Instant::now(),
            scene_name: scene.name.clone(),
        })
    }

    /// Build from `scene`, falling back to the built-in scene if it is invalid
    pub fn new_or_showcase(scene: &BackdropScene, config: &BackdropConfig) -> Result<Self, SceneBuildError> {
        Self::new(scene, config).or_else(|e| {
            log::warn!("Backdrop scene '{}' is invalid: {}. Using built-in scene.", scene.name, e);
            Self::new(&BackdropScene::showcase(), config)
        })
    }

    /// Run one frame: measure dt, advance the clock and recompute instances
    ///
    /// Returns the (clamped) wall-clock delta time.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(MAX_FRAME_DT);
        self.last_frame = now;
        self.step(dt);
        dt
    }

    /// Advance by a fixed `dt` and recompute instances
    pub fn step(&mut self, dt: f32) {
        let t = self.clock.advance(dt);
        self.backdrop.update(t);
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn backdrop_mut(&mut self) -> &mut Backdrop {
        &mut self.backdrop
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    /// Stop or resume the animation
    pub fn toggle_pause(&mut self) -> bool {
        let paused = self.clock.toggle_pause();
        log::info!("Animation {}", if paused { "paused" } else { "resumed" });
        paused
    }

    pub fn scene_name(&self) -> &str {
        &self.scene_name
    }

    /// Create the instance buffers; updates write nothing before this
    pub fn attach(&mut self) {
        self.backdrop.attach_buffers();
    }

    /// Drop the instance buffers; later updates are no-ops
    pub fn detach(&mut self) {
        self.backdrop.detach_buffers();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances_scaled() {
        let mut clock = AnimationClock::new(2.0, false);
        assert_eq!(clock.advance(0.5), 1.0);
        assert_eq!(clock.advance(0.25), 1.5);
    }

    #[test]
    fn test_paused_clock_holds() {
        let mut clock = AnimationClock::new(1.0, true);
        assert_eq!(clock.advance(1.0), 0.0);
        assert!(!clock.toggle_pause());
        assert_eq!(clock.advance(1.0), 1.0);
    }

    #[test]
    fn test_clock_ignores_bad_dt() {
        let mut clock = AnimationClock::new(1.0, false);
        clock.advance(f32::NAN);
        clock.advance(-1.0);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_step_writes_after_attach() {
        let mut system = BackdropSystem::new(&BackdropScene::showcase(), &BackdropConfig::default()).unwrap();
        system.step(0.1);
        let mut dirty = 0;
        system.backdrop_mut().drain_dirty(|_, _, _| dirty += 1);
        assert_eq!(dirty, 0);

        system.attach();
        system.step(0.1);
        system.backdrop_mut().drain_dirty(|_, _, _| dirty += 1);
        assert_eq!(dirty, system.backdrop().group_count());
    }

    #[test]
    fn test_invalid_scene_falls_back() {
        let mut scene = BackdropScene::showcase();
        scene.gears[0].tooth_count = 2;
        assert!(BackdropSystem::new(&scene, &BackdropConfig::default()).is_err());

        let system = BackdropSystem::new_or_showcase(&scene, &BackdropConfig::default()).unwrap();
        assert_eq!(system.scene_name(), "Showcase");
        assert_eq!(system.backdrop().instance_count(), 513);
    }

    #[test]
    fn test_update_clamps_dt() {
        let mut system = BackdropSystem::new(&BackdropScene::new("Empty"), &BackdropConfig::default()).unwrap();
        let dt = system.update();
        assert!(dt <= MAX_FRAME_DT);
    }
}
