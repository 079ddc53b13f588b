//! Memoized gear meshes
//!
//! Building a gear mesh is far more expensive than drawing it, so meshes
//! are built once per distinct [`GearSpec`] and shared through `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::gear::GearSpec;
use crate::mesh::Mesh;

/// Hit/miss counters for a [`GearMeshCache`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that built a new mesh
    pub misses: u64,
}

/// Cache of built gear meshes keyed by spec
///
/// Two specs are the same key only if every field is bitwise equal.
#[derive(Default)]
pub struct GearMeshCache {
    meshes: HashMap<GearSpec, Arc<Mesh>>,
    stats: CacheStats,
}

impl GearMeshCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the mesh for `spec`, building it on first use
    pub fn get_or_build(&mut self, spec: &GearSpec) -> Arc<Mesh> {
        if let Some(mesh) = self.meshes.get(spec) {
            self.stats.hits += 1;
            return Arc::clone(mesh);
        }

        self.stats.misses += 1;
        let mesh = Arc::new(spec.build_mesh());
        log::debug!(
            "Built gear mesh: {} teeth, r={}, {} triangles",
            spec.tooth_count(),
            spec.outer_radius(),
            mesh.triangle_count()
        );
        self.meshes.insert(*spec, Arc::clone(&mesh));
        mesh
    }

    /// Get an already built mesh without building
    pub fn get(&self, spec: &GearSpec) -> Option<Arc<Mesh>> {
        self.meshes.get(spec).cloned()
    }

    /// Check whether a mesh for `spec` is cached
    pub fn contains(&self, spec: &GearSpec) -> bool {
        self.meshes.contains_key(spec)
    }

    /// Number of cached meshes
    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Hit/miss counters
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Drop meshes no one else holds a reference to
    ///
    /// Returns the number of meshes removed.
    pub fn purge_unused(&mut self) -> usize {
        let before = self.meshes.len();
        self.meshes.retain(|_, mesh| Arc::strong_count(mesh) > 1);
        before - self.meshes.len()
    }

    /// Remove every cached mesh
    pub fn clear(&mut self) {
        self.meshes.clear();
    }
}
