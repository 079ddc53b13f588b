//! Common interface of everything that feeds instanced draws
//!
//! The backdrop is a set of sources (particle field, gear train, drone).
//! Each source owns a few mesh groups with one [`InstanceBuffer`](crate::InstanceBuffer)
//! per group; the render side creates one GPU batch per group and uploads
//! whatever the source reports as dirty.

use std::sync::Arc;

use gearfolio_geometry::Mesh;

use crate::instance::InstanceRaw;

/// A set of mesh groups whose instances are recomputed every frame
pub trait InstanceSource {
    /// Short name for logging
    fn label(&self) -> &str;

    /// Number of mesh groups
    fn group_count(&self) -> usize;

    /// Mesh drawn by `group`
    fn group_mesh(&self, group: usize) -> Option<Arc<Mesh>>;

    /// Number of instances in `group`
    fn group_capacity(&self, group: usize) -> usize;

    /// Create the CPU-side buffers for every group
    fn attach_buffers(&mut self);

    /// Drop all buffers; later updates become no-ops
    fn detach_buffers(&mut self);

    /// Recompute instances at elapsed time `t` (seconds)
    fn update(&mut self, t: f32);

    /// Hand every dirty group to `sink` and clear its dirty flag
    fn drain_dirty(&mut self, sink: &mut dyn FnMut(usize, &[InstanceRaw]));

    /// Total instances over all groups
    fn instance_count(&self) -> usize {
        (0..self.group_count()).map(|g| self.group_capacity(g)).sum()
    }
}
