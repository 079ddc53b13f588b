//! Extrusion of a ring-shaped profile into a closed solid
//!
//! The profile is a counter-clockwise outline with a circular hole at the
//! origin. Each outline sample is paired with a hole sample at the same
//! polar angle, so every cap cell between the two rings is a convex quad.
//! The extrusion is a stack of rings ("layers") joined by quad strips; a
//! bevel adds quarter-circle layers at each face.

use std::f32::consts::FRAC_PI_2;

use glam::{Vec2, Vec3};

use crate::mesh::Mesh;

/// Minimum number of samples around the hole
pub const MIN_HOLE_SEGMENTS: usize = 48;

/// Upper bound for miter lengths at sharp outline corners (in bevel sizes)
const MAX_MITER: f32 = 4.0;

/// Rounded edge added where the side wall meets a cap
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bevel {
    /// Depth of the bevel along the extrusion axis
    pub thickness: f32,
    /// How far the bevel pushes the outline outward (and the hole inward)
    pub size: f32,
    /// Number of steps along the quarter circle
    pub segments: u32,
}

/// How far and how to extrude a profile
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Extrusion {
    /// Depth of the straight side wall
    pub depth: f32,
    /// Optional bevel on both faces
    pub bevel: Option<Bevel>,
}

/// One ring of the extrusion stack
#[derive(Clone, Copy, Debug, PartialEq)]
struct Layer {
    z: f32,
    offset: f32,
}

fn layers(extrusion: &Extrusion) -> Vec<Layer> {
    let depth = extrusion.depth;
    match extrusion.bevel {
        None => vec![Layer { z: 0.0, offset: 0.0 }, Layer { z: depth, offset: 0.0 }],
        Some(bevel) => {
            let segments = bevel.segments.max(1);
            let step = |s: u32| FRAC_PI_2 * s as f32 / segments as f32;
            let front = (0..=segments).map(|s| Layer {
                z: -bevel.thickness * step(s).cos(),
                offset: bevel.size * step(s).sin(),
            });
            let back = (0..=segments).rev().map(|s| Layer {
                z: depth + bevel.thickness * step(s).cos(),
                offset: bevel.size * step(s).sin(),
            });
            front.chain(back).collect()
        }
    }
}

/// Insert collinear points so the ring has at least `MIN_HOLE_SEGMENTS` samples
fn subdivide(outline: &[Vec2]) -> Vec<Vec2> {
    let n = outline.len();
    let per_edge = MIN_HOLE_SEGMENTS.div_ceil(n).max(1);
    let mut samples = Vec::with_capacity(n * per_edge);
    for i in 0..n {
        let a = outline[i];
        let b = outline[(i + 1) % n];
        for k in 0..per_edge {
            samples.push(a.lerp(b, k as f32 / per_edge as f32));
        }
    }
    samples
}

/// Outward offset direction per sample, scaled so that edges move by one unit
fn miter_directions(ring: &[Vec2]) -> Vec<Vec2> {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let prev = ring[(i + n - 1) % n];
            let cur = ring[i];
            let next = ring[(i + 1) % n];
            // Right-hand normals point outward on a counter-clockwise outline
            let n1 = (cur - prev).perp().normalize_or_zero() * -1.0;
            let n2 = (next - cur).perp().normalize_or_zero() * -1.0;
            let miter = (n1 + n2).normalize_or_zero();
            let cos = miter.dot(n1);
            if cos <= f32::EPSILON {
                n1
            } else {
                miter * (1.0 / cos).min(MAX_MITER)
            }
        })
        .collect()
}

/// Extrude a counter-clockwise outline with a circular hole at the origin
///
/// Produces a closed, outward-facing, flat-shaded mesh centered on the
/// origin along Z. `hole_radius` must be smaller than the outline's
/// distance from the center everywhere (see [`crate::GearSpec`]).
pub fn extrude_ring(outline: &[Vec2], hole_radius: f32, extrusion: &Extrusion) -> Mesh {
    if outline.len() < 3 {
        return Mesh::new();
    }

    let outer = subdivide(outline);
    let directions = miter_directions(&outer);
    let hole_dirs: Vec<Vec2> = outer.iter().map(|p| p.normalize_or_zero()).collect();
    let stack = layers(extrusion);

    let z_center = extrusion.depth * 0.5;
    let outer_ring = |layer: &Layer| -> Vec<Vec3> {
        outer
            .iter()
            .zip(&directions)
            .map(|(p, d)| (*p + *d * layer.offset).extend(layer.z - z_center))
            .collect()
    };
    let hole_ring = |layer: &Layer| -> Vec<Vec3> {
        let radius = hole_radius - layer.offset;
        hole_dirs
            .iter()
            .map(|d| (*d * radius).extend(layer.z - z_center))
            .collect()
    };

    let outer_rings: Vec<Vec<Vec3>> = stack.iter().map(outer_ring).collect();
    let hole_rings: Vec<Vec<Vec3>> = stack.iter().map(hole_ring).collect();

    let m = outer.len();
    let quads_per_ring = m * 2 * (stack.len() - 1) + m * 2;
    let mut mesh = Mesh::with_capacity(quads_per_ring * 4, quads_per_ring * 2);

    // Side walls, layer by layer
    for l in 0..stack.len() - 1 {
        let (o0, o1) = (&outer_rings[l], &outer_rings[l + 1]);
        let (h0, h1) = (&hole_rings[l], &hole_rings[l + 1]);
        for j in 0..m {
            let k = (j + 1) % m;
            mesh.push_face(&[o0[j], o0[k], o1[k], o1[j]]);
            // The hole wall faces the axis, so it winds the other way
            mesh.push_face(&[h0[j], h1[j], h1[k], h0[k]]);
        }
    }

    // Caps between the outline and the hole
    let (front_o, front_h) = (&outer_rings[0], &hole_rings[0]);
    let last = stack.len() - 1;
    let (back_o, back_h) = (&outer_rings[last], &hole_rings[last]);
    for j in 0..m {
        let k = (j + 1) % m;
        mesh.push_face(&[front_o[j], front_h[j], front_h[k], front_o[k]]);
        mesh.push_face(&[back_o[j], back_o[k], back_h[k], back_h[j]]);
    }

    log::trace!(
        "Extruded ring: {} samples, {} layers, {} triangles",
        m,
        stack.len(),
        mesh.triangle_count()
    );

    mesh
}
