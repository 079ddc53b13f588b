//! Indexed triangle mesh
//!
//! Meshes are pure geometry: positions, normals and triangle indices.
//! Colors and materials live with the instance data in `gearfolio_core`.

use std::collections::HashMap;

use glam::Vec3;

/// Grid used to weld positions when checking topology (1e-4 units)
const WELD_SCALE: f32 = 1.0e4;

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Size along each axis
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Grow the box to contain a point
    #[inline]
    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }
}

/// An indexed triangle mesh with per-vertex normals
///
/// Triangles are wound counter-clockwise when seen from outside, so the
/// geometric normal `(b - a) x (c - a)` points away from the solid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    pub positions: Vec<Vec3>,
    /// Vertex normals (same length as `positions`)
    pub normals: Vec<Vec3>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<u32>,
}

type WeldKey = (i64, i64, i64);

fn weld_key(p: Vec3) -> WeldKey {
    (
        (p.x * WELD_SCALE).round() as i64,
        (p.y * WELD_SCALE).round() as i64,
        (p.z * WELD_SCALE).round() as i64,
    )
}

/// Newell's method: robust normal for a planar (or nearly planar) polygon
fn polygon_normal(points: &[Vec3]) -> Vec3 {
    let mut n = Vec3::ZERO;
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n.normalize_or_zero()
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for the given vertex and triangle counts
    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(triangles * 3),
        }
    }

    /// Number of vertices
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when the mesh has no triangles
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a vertex, returning its index
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position);
        self.normals.push(normal);
        index
    }

    /// Append a triangle by vertex indices
    #[inline]
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append a flat-shaded convex polygon
    ///
    /// `points` must be in counter-clockwise order seen from the side the
    /// face should point to. The polygon gets its own vertices so that its
    /// normal does not bleed into neighbouring faces.
    pub fn push_face(&mut self, points: &[Vec3]) {
        if points.len() < 3 {
            return;
        }
        let normal = polygon_normal(points);
        let first = self.vertex_count() as u32;
        for &p in points {
            self.push_vertex(p, normal);
        }
        for i in 1..(points.len() as u32 - 1) {
            self.push_triangle(first, first + i, first + i + 1);
        }
    }

    /// Append a flat-shaded convex polygon whose normal should point along `outward`
    ///
    /// The winding is flipped if needed, so callers only have to supply the
    /// polygon outline in either order.
    pub fn push_face_facing(&mut self, points: &[Vec3], outward: Vec3) {
        if polygon_normal(points).dot(outward) < 0.0 {
            let reversed: Vec<Vec3> = points.iter().rev().copied().collect();
            self.push_face(&reversed);
        } else {
            self.push_face(points);
        }
    }

    /// Append another mesh, offsetting its indices
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Translate every vertex
    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Replace the normals with smooth, area-weighted vertex normals
    ///
    /// Used for imported meshes that carry no normals of their own.
    pub fn recompute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| self.positions[i as usize]);
            let face = (b - a).cross(c - a);
            for &i in tri {
                normals[i as usize] += face;
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Get the corner positions of a triangle
    pub fn triangle(&self, index: usize) -> [Vec3; 3] {
        let base = index * 3;
        [
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        ]
    }

    /// Bounding box of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Aabb> {
        let first = *self.positions.first()?;
        let mut aabb = Aabb { min: first, max: first };
        for &p in &self.positions[1..] {
            aabb.include(p);
        }
        Some(aabb)
    }

    /// Signed volume enclosed by the mesh
    ///
    /// Positive when the mesh is closed and its triangles face outward.
    pub fn signed_volume(&self) -> f32 {
        (0..self.triangle_count())
            .map(|t| {
                let [a, b, c] = self.triangle(t);
                a.dot(b.cross(c)) / 6.0
            })
            .sum()
    }

    /// Count undirected edges (after welding coincident positions) that are
    /// not shared by exactly two triangles
    ///
    /// Zero means the surface is closed. Degenerate edges collapsed by the
    /// weld are ignored.
    pub fn open_edge_count(&self) -> usize {
        let mut edges: HashMap<(WeldKey, WeldKey), u32> = HashMap::new();
        for t in 0..self.triangle_count() {
            let tri = self.triangle(t).map(weld_key);
            for i in 0..3 {
                let (a, b) = (tri[i], tri[(i + 1) % 3]);
                if a == b {
                    continue;
                }
                let key = if a < b { (a, b) } else { (b, a) };
                *edges.entry(key).or_insert(0) += 1;
            }
        }
        edges.values().filter(|&&count| count != 2).count()
    }

    /// True when every edge is shared by exactly two triangles
    pub fn is_closed(&self) -> bool {
        !self.is_empty() && self.open_edge_count() == 0
    }

    /// True when every directed edge is matched by exactly one opposite edge,
    /// i.e. neighbouring triangles agree on winding
    pub fn is_consistently_oriented(&self) -> bool {
        let mut directed: HashMap<(WeldKey, WeldKey), u32> = HashMap::new();
        for t in 0..self.triangle_count() {
            let tri = self.triangle(t).map(weld_key);
            for i in 0..3 {
                let (a, b) = (tri[i], tri[(i + 1) % 3]);
                if a != b {
                    *directed.entry((a, b)).or_insert(0) += 1;
                }
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }
}
