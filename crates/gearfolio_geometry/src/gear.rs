//! Spur gear profiles
//!
//! A gear is a closed polygon alternating between an outer and inner radius
//! (flat-faced teeth), with a circular hole at the center. The profile is
//! extruded along Z to produce a solid; see [`crate::extrude`].

use std::f32::consts::PI;
use std::fmt;
use std::hash::{Hash, Hasher};

use glam::Vec2;

use crate::extrude::{extrude_ring, Bevel, Extrusion};
use crate::mesh::Mesh;

/// Minimum number of teeth for a valid gear
pub const MIN_TEETH: u32 = 3;

/// Default number of bevel steps (quarter-circle subdivisions)
pub const DEFAULT_BEVEL_SEGMENTS: u32 = 3;

/// Parameters describing a gear
///
/// Construct with [`GearSpec::new`]; every constructor validates, so a
/// `GearSpec` value is always buildable. Equality and hashing are bitwise on
/// the float fields, which makes the spec usable as a cache key.
#[derive(Clone, Copy, Debug)]
pub struct GearSpec {
    outer_radius: f32,
    inner_radius: f32,
    hole_radius: f32,
    tooth_count: u32,
    extrude_depth: f32,
    bevel_thickness: f32,
    bevel_size: f32,
    bevel_segments: u32,
}

/// Invalid gear parameters
#[derive(Clone, Debug, PartialEq)]
pub enum GearSpecError {
    /// Fewer than [`MIN_TEETH`] teeth
    TooFewTeeth(u32),
    /// A radius or the depth is zero, negative or not finite
    NonPositive(&'static str, f32),
    /// A bevel parameter is negative or not finite
    NegativeBevel(&'static str, f32),
    /// `inner_radius` is not smaller than `outer_radius`
    InnerNotBelowOuter { inner: f32, outer: f32 },
    /// `hole_radius` is not smaller than `inner_radius`
    HoleNotBelowInner { hole: f32, inner: f32 },
    /// The hole crosses the tooth flanks
    HoleCutsProfile { hole: f32, clearance: f32 },
    /// The bevel would close the hole
    BevelClosesHole { bevel_size: f32, hole: f32 },
    /// Bevel needs at least one segment
    NoBevelSegments,
}

impl fmt::Display for GearSpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GearSpecError::TooFewTeeth(n) => {
                write!(f, "Gear needs at least {} teeth, got {}", MIN_TEETH, n)
            }
            GearSpecError::NonPositive(name, v) => write!(f, "{} must be positive, got {}", name, v),
            GearSpecError::NegativeBevel(name, v) => {
                write!(f, "{} must be zero or positive, got {}", name, v)
            }
            GearSpecError::InnerNotBelowOuter { inner, outer } => write!(
                f,
                "inner_radius ({}) must be smaller than outer_radius ({})",
                inner, outer
            ),
            GearSpecError::HoleNotBelowInner { hole, inner } => write!(
                f,
                "hole_radius ({}) must be smaller than inner_radius ({})",
                hole, inner
            ),
            GearSpecError::HoleCutsProfile { hole, clearance } => write!(
                f,
                "hole_radius ({}) reaches past the tooth flanks (clearance {})",
                hole, clearance
            ),
            GearSpecError::BevelClosesHole { bevel_size, hole } => write!(
                f,
                "bevel_size ({}) must be smaller than hole_radius ({})",
                bevel_size, hole
            ),
            GearSpecError::NoBevelSegments => write!(f, "bevel_segments must be at least 1"),
        }
    }
}

impl std::error::Error for GearSpecError {}

fn positive(name: &'static str, v: f32) -> Result<(), GearSpecError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(GearSpecError::NonPositive(name, v))
    }
}

fn non_negative(name: &'static str, v: f32) -> Result<(), GearSpecError> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(GearSpecError::NegativeBevel(name, v))
    }
}

/// Distance from the center to the closest point of a tooth flank
///
/// Every flank runs from `(outer, θ)` to `(inner, θ + step)`, so all flanks
/// share this distance.
fn flank_clearance(outer: f32, inner: f32, tooth_count: u32) -> f32 {
    let step = PI / tooth_count as f32;
    let a = Vec2::new(outer, 0.0);
    let b = Vec2::from_angle(step) * inner;
    let edge = b - a;
    // Closest point of the segment, clamped to its ends
    let t = (-a.dot(edge) / edge.length_squared()).clamp(0.0, 1.0);
    (a + edge * t).length()
}

impl GearSpec {
    /// Create a gear spec without bevel
    ///
    /// # Errors
    ///
    /// Returns a [`GearSpecError`] if any radius or the depth is not
    /// positive, the radii are not strictly decreasing
    /// (`outer > inner > hole`), the hole would cut the tooth flanks, or
    /// there are fewer than three teeth.
    pub fn new(
        outer_radius: f32,
        inner_radius: f32,
        hole_radius: f32,
        tooth_count: u32,
        extrude_depth: f32,
    ) -> Result<Self, GearSpecError> {
        let spec = Self {
            outer_radius,
            inner_radius,
            hole_radius,
            tooth_count,
            extrude_depth,
            bevel_thickness: 0.0,
            bevel_size: 0.0,
            bevel_segments: DEFAULT_BEVEL_SEGMENTS,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Return a copy with a bevel applied to the extrusion edges
    ///
    /// # Errors
    ///
    /// Returns a [`GearSpecError`] if either bevel value is negative,
    /// `segments` is zero, or the bevel would close the hole.
    pub fn with_bevel(mut self, thickness: f32, size: f32, segments: u32) -> Result<Self, GearSpecError> {
        self.bevel_thickness = thickness;
        self.bevel_size = size;
        self.bevel_segments = segments;
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), GearSpecError> {
        if self.tooth_count < MIN_TEETH {
            return Err(GearSpecError::TooFewTeeth(self.tooth_count));
        }
        positive("outer_radius", self.outer_radius)?;
        positive("inner_radius", self.inner_radius)?;
        positive("hole_radius", self.hole_radius)?;
        positive("extrude_depth", self.extrude_depth)?;
        non_negative("bevel_thickness", self.bevel_thickness)?;
        non_negative("bevel_size", self.bevel_size)?;

        if self.inner_radius >= self.outer_radius {
            return Err(GearSpecError::InnerNotBelowOuter {
                inner: self.inner_radius,
                outer: self.outer_radius,
            });
        }
        if self.hole_radius >= self.inner_radius {
            return Err(GearSpecError::HoleNotBelowInner {
                hole: self.hole_radius,
                inner: self.inner_radius,
            });
        }
        let clearance = flank_clearance(self.outer_radius, self.inner_radius, self.tooth_count);
        if self.hole_radius >= clearance {
            return Err(GearSpecError::HoleCutsProfile {
                hole: self.hole_radius,
                clearance,
            });
        }
        if self.bevel_size >= self.hole_radius {
            return Err(GearSpecError::BevelClosesHole {
                bevel_size: self.bevel_size,
                hole: self.hole_radius,
            });
        }
        if self.bevel_segments == 0 {
            return Err(GearSpecError::NoBevelSegments);
        }
        Ok(())
    }

    /// Tip radius of the teeth
    pub fn outer_radius(&self) -> f32 {
        self.outer_radius
    }

    /// Root radius between the teeth
    pub fn inner_radius(&self) -> f32 {
        self.inner_radius
    }

    /// Radius of the center hole
    pub fn hole_radius(&self) -> f32 {
        self.hole_radius
    }

    /// Number of teeth
    pub fn tooth_count(&self) -> u32 {
        self.tooth_count
    }

    /// Extrusion depth along Z (excluding bevel)
    pub fn extrude_depth(&self) -> f32 {
        self.extrude_depth
    }

    /// Bevel depth along Z on each face
    pub fn bevel_thickness(&self) -> f32 {
        self.bevel_thickness
    }

    /// Bevel outward offset of the outline
    pub fn bevel_size(&self) -> f32 {
        self.bevel_size
    }

    /// Bevel subdivisions
    pub fn bevel_segments(&self) -> u32 {
        self.bevel_segments
    }

    /// Compute the 2D profile
    pub fn profile(&self) -> GearProfile {
        let vertex_count = 2 * self.tooth_count;
        let angle_step = 2.0 * PI / vertex_count as f32;
        let outline = (0..vertex_count)
            .map(|i| {
                let radius = if i % 2 == 0 { self.outer_radius } else { self.inner_radius };
                Vec2::from_angle(i as f32 * angle_step) * radius
            })
            .collect();

        GearProfile {
            outline,
            hole_radius: self.hole_radius,
        }
    }

    /// Extrusion settings derived from this spec
    pub fn extrusion(&self) -> Extrusion {
        let bevel = (self.bevel_thickness > 0.0 || self.bevel_size > 0.0).then_some(Bevel {
            thickness: self.bevel_thickness,
            size: self.bevel_size,
            segments: self.bevel_segments,
        });
        Extrusion {
            depth: self.extrude_depth,
            bevel,
        }
    }

    /// Build the solid gear mesh
    ///
    /// The mesh is centered on the origin with the gear axis along Z, so
    /// rotating about Z spins it in place. This is comparatively expensive;
    /// use [`crate::GearMeshCache`] to share results between callers.
    pub fn build_mesh(&self) -> Mesh {
        let profile = self.profile();
        extrude_ring(&profile.outline, profile.hole_radius, &self.extrusion())
    }

    fn key(&self) -> [u32; 8] {
        // `+ 0.0` folds -0.0 into 0.0 so equal values hash equally
        [
            (self.outer_radius + 0.0).to_bits(),
            (self.inner_radius + 0.0).to_bits(),
            (self.hole_radius + 0.0).to_bits(),
            self.tooth_count,
            (self.extrude_depth + 0.0).to_bits(),
            (self.bevel_thickness + 0.0).to_bits(),
            (self.bevel_size + 0.0).to_bits(),
            self.bevel_segments,
        ]
    }
}

impl PartialEq for GearSpec {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for GearSpec {}

impl Hash for GearSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// The flat outline of a gear before extrusion
#[derive(Clone, Debug, PartialEq)]
pub struct GearProfile {
    /// Counter-clockwise outline, alternating outer/inner radius
    pub outline: Vec<Vec2>,
    /// Radius of the circular hole subtracted at the origin
    pub hole_radius: f32,
}

impl GearProfile {
    /// Number of vertices on the outer boundary
    #[inline]
    pub fn outline_vertex_count(&self) -> usize {
        self.outline.len()
    }
}
