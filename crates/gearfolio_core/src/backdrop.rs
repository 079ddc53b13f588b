//! The animated backdrop
//!
//! Built from a [`BackdropScene`]: a gear train, a particle field and a
//! drone, each an [`InstanceSource`]. The backdrop only knows about CPU
//! instance data; pairing groups with GPU batches is the renderer's job.

use std::sync::Arc;

use gearfolio_geometry::GearMeshCache;

use crate::drone::DroneRig;
use crate::gear_train::GearTrain;
use crate::particles::{ParticleClass, ParticleField};
use crate::scatter::scatter;
use crate::scene::{BackdropScene, SceneBuildError};
use crate::source::InstanceSource;

/// Every animated source of the backdrop
pub struct Backdrop {
    sources: Vec<Box<dyn InstanceSource>>,
    gear_cache: GearMeshCache,
}

impl Backdrop {
    /// Build every source described by `scene`
    pub fn from_scene(scene: &BackdropScene) -> Result<Self, SceneBuildError> {
        let mut gear_cache = GearMeshCache::new();
        let mut sources: Vec<Box<dyn InstanceSource>> = Vec::new();

        let gears = scene.gear_instances()?;
        if !gears.is_empty() {
            sources.push(Box::new(GearTrain::new(gears, &mut gear_cache)));
        }

        if let Some(particles) = &scene.particles {
            let classes = particles
                .classes
                .iter()
                .enumerate()
                .map(|(class, template)| {
                    let mesh = template
                        .shape
                        .create_mesh()
                        .map_err(|source| SceneBuildError::Shape { class, source })?;
                    Ok(ParticleClass { mesh: Arc::new(mesh), material: template.material })
                })
                .collect::<Result<Vec<_>, SceneBuildError>>()?;
            let descriptors = scatter(&particles.scatter_config())?;
            sources.push(Box::new(ParticleField::new(descriptors, particles.preset, classes)?));
        }

        if let Some(drone) = &scene.drone {
            let rig = DroneRig::new(drone.clone()).map_err(SceneBuildError::Drone)?;
            sources.push(Box::new(rig));
        }

        let backdrop = Self { sources, gear_cache };
        log::info!(
            "Built backdrop '{}': {} sources, {} instances, {} gear meshes",
            scene.name,
            backdrop.sources.len(),
            backdrop.instance_count(),
            backdrop.gear_cache.len()
        );
        Ok(backdrop)
    }

    /// The sources in build order (gears, particles, drone)
    pub fn sources(&self) -> &[Box<dyn InstanceSource>] {
        &self.sources
    }

    /// Mutable access to the sources
    pub fn sources_mut(&mut self) -> &mut [Box<dyn InstanceSource>] {
        &mut self.sources
    }

    /// Total instances over all sources
    pub fn instance_count(&self) -> usize {
        self.sources.iter().map(|s| s.instance_count()).sum()
    }

    /// Total mesh groups over all sources
    pub fn group_count(&self) -> usize {
        self.sources.iter().map(|s| s.group_count()).sum()
    }

    /// Create every CPU-side buffer
    pub fn attach_buffers(&mut self) {
        for source in &mut self.sources {
            source.attach_buffers();
        }
    }

    /// Drop every CPU-side buffer
    pub fn detach_buffers(&mut self) {
        for source in &mut self.sources {
            source.detach_buffers();
        }
    }

    /// Advance every source to elapsed time `t`
    pub fn update(&mut self, t: f32) {
        for source in &mut self.sources {
            source.update(t);
        }
    }

    /// Drain dirty groups as `(source, group, instances)`
    pub fn drain_dirty(&mut self, mut sink: impl FnMut(usize, usize, &[crate::InstanceRaw])) {
        for (index, source) in self.sources.iter_mut().enumerate() {
            source.drain_dirty(&mut |group, data| sink(index, group, data));
        }
    }
}
