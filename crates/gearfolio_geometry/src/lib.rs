//! Procedural geometry for Gearfolio
//!
//! This crate builds the meshes drawn by the animated backdrop:
//!
//! - [`Mesh`] - Indexed, flat-shaded triangle mesh with closure checks
//! - [`GearSpec`] - Validated gear parameters and their 2D [`GearProfile`]
//! - [`extrude`] - Ring extrusion with optional [`Bevel`]
//! - [`primitives`] - Box, cylinder, cone, octahedron, dodecahedron, torus
//! - [`GearMeshCache`] - Builds each distinct gear once and shares it
//!
//! Meshes carry no color or material; those are per instance.

pub mod cache;
pub mod extrude;
pub mod gear;
pub mod mesh;
pub mod primitives;

pub use cache::{CacheStats, GearMeshCache};
pub use extrude::{extrude_ring, Bevel, Extrusion};
pub use gear::{GearProfile, GearSpec, GearSpecError, DEFAULT_BEVEL_SEGMENTS, MIN_TEETH};
pub use mesh::{Aabb, Mesh};
pub use primitives::ShapeError;
