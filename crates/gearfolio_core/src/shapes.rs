//! Serializable shape templates
//!
//! Each variant stores the construction parameters of one primitive from
//! `gearfolio_geometry::primitives`. Shapes are created in local space,
//! centered at the origin.

use glam::Vec3;
use gearfolio_geometry::{primitives, Mesh, ShapeError};
use serde::{Deserialize, Serialize};

/// Serializable primitive shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeTemplate {
    /// Axis-aligned box
    Box {
        /// Full size along X
        width: f32,
        /// Full size along Y
        height: f32,
        /// Full size along Z
        depth: f32,
    },
    /// Cylinder or truncated cone along Y
    Cylinder {
        /// Radius at +Y (0 for a cone)
        radius_top: f32,
        /// Radius at -Y
        radius_bottom: f32,
        /// Full height
        height: f32,
        /// Segments around the axis
        segments: u32,
    },
    /// Cone along Y, apex up
    Cone {
        /// Base radius
        radius: f32,
        /// Full height
        height: f32,
        /// Segments around the axis
        segments: u32,
    },
    /// Regular octahedron
    Octahedron {
        /// Circumradius
        radius: f32,
    },
    /// Regular dodecahedron
    Dodecahedron {
        /// Circumradius
        radius: f32,
    },
    /// Torus around Y
    Torus {
        /// Distance from the center to the tube center
        radius: f32,
        /// Tube radius
        tube: f32,
        /// Segments around the tube
        radial_segments: u32,
        /// Segments around the ring
        tubular_segments: u32,
    },
}

impl ShapeTemplate {
    /// Build the mesh for this template
    pub fn create_mesh(&self) -> Result<Mesh, ShapeError> {
        match *self {
            ShapeTemplate::Box { width, height, depth } => {
                primitives::cuboid(Vec3::new(width, height, depth))
            }
            ShapeTemplate::Cylinder { radius_top, radius_bottom, height, segments } => {
                primitives::cylinder(radius_top, radius_bottom, height, segments)
            }
            ShapeTemplate::Cone { radius, height, segments } => {
                primitives::cone(radius, height, segments)
            }
            ShapeTemplate::Octahedron { radius } => primitives::octahedron(radius),
            ShapeTemplate::Dodecahedron { radius } => primitives::dodecahedron(radius),
            ShapeTemplate::Torus { radius, tube, radial_segments, tubular_segments } => {
                primitives::torus(radius, tube, radial_segments, tubular_segments)
            }
        }
    }

    /// Name of the shape kind
    pub fn kind(&self) -> &'static str {
        match self {
            ShapeTemplate::Box { .. } => "box",
            ShapeTemplate::Cylinder { .. } => "cylinder",
            ShapeTemplate::Cone { .. } => "cone",
            ShapeTemplate::Octahedron { .. } => "octahedron",
            ShapeTemplate::Dodecahedron { .. } => "dodecahedron",
            ShapeTemplate::Torus { .. } => "torus",
        }
    }

    /// Unit cube
    pub fn unit_box() -> Self {
        ShapeTemplate::Box { width: 1.0, height: 1.0, depth: 1.0 }
    }
}
