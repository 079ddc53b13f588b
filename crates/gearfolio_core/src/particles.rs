//! Instanced particle field: one mesh per geometry class, animated by an
//! [`InstancedAnimator`]

use std::sync::Arc;

use gearfolio_geometry::Mesh;

use crate::animator::{AnimatorError, InstancedAnimator};
use crate::instance::{InstanceDescriptor, InstanceRaw};
use crate::material::Material;
use crate::preset::AnimationPreset;
use crate::source::InstanceSource;

/// Mesh and material of one geometry class
#[derive(Clone, Debug)]
pub struct ParticleClass {
    /// Shared mesh
    pub mesh: Arc<Mesh>,
    /// Material of every instance in the class
    pub material: Material,
}

/// Field of small shapes floating around their base positions
pub struct ParticleField {
    animator: InstancedAnimator,
    classes: Vec<ParticleClass>,
}

impl ParticleField {
    /// Create a field; every descriptor's class must index into `classes`
    pub fn new(
        descriptors: Vec<InstanceDescriptor>,
        preset: AnimationPreset,
        classes: Vec<ParticleClass>,
    ) -> Result<Self, AnimatorError> {
        let animator = InstancedAnimator::new(descriptors, classes.len(), preset)?;
        Ok(Self { animator, classes })
    }

    /// The underlying animator
    pub fn animator(&self) -> &InstancedAnimator {
        &self.animator
    }

    /// Switch animation preset
    pub fn set_preset(&mut self, preset: AnimationPreset) {
        self.animator.set_preset(preset);
    }
}

impl InstanceSource for ParticleField {
    fn label(&self) -> &str {
        "particles"
    }

    fn group_count(&self) -> usize {
        self.classes.len()
    }

    fn group_mesh(&self, group: usize) -> Option<Arc<Mesh>> {
        self.classes.get(group).map(|c| Arc::clone(&c.mesh))
    }

    fn group_capacity(&self, group: usize) -> usize {
        self.animator.class_len(group)
    }

    fn attach_buffers(&mut self) {
        let materials: Vec<Material> = self.classes.iter().map(|c| c.material).collect();
        self.animator.attach_all(&materials);
    }

    fn detach_buffers(&mut self) {
        self.animator.detach_all();
    }

    fn update(&mut self, t: f32) {
        let stats = self.animator.update(t);
        if stats.classes_skipped > 0 {
            log::trace!("Particle update skipped {} classes", stats.classes_skipped);
        }
    }

    fn drain_dirty(&mut self, sink: &mut dyn FnMut(usize, &[InstanceRaw])) {
        for (class, data) in self.animator.take_dirty() {
            sink(class, data);
        }
    }
}
