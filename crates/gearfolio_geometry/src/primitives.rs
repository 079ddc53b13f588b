//! Primitive solids used by the particle field and the drone
//!
//! All primitives are centered on the origin, flat shaded and closed.
//! Cylinders, cones and tori use Y as their axis.

use std::f32::consts::TAU;
use std::fmt;

use glam::Vec3;

use crate::mesh::Mesh;

/// Invalid primitive dimensions
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeError {
    /// A size is zero, negative or not finite
    NonPositive(&'static str, f32),
    /// Too few segments around a curved surface
    TooFewSegments(&'static str, u32),
    /// Tube radius must be smaller than the ring radius
    TubeTooThick { radius: f32, tube: f32 },
}

impl fmt::Display for ShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeError::NonPositive(name, v) => write!(f, "{} must be positive, got {}", name, v),
            ShapeError::TooFewSegments(name, n) => {
                write!(f, "{} needs at least 3 segments, got {}", name, n)
            }
            ShapeError::TubeTooThick { radius, tube } => write!(
                f,
                "tube radius ({}) must be smaller than ring radius ({})",
                tube, radius
            ),
        }
    }
}

impl std::error::Error for ShapeError {}

fn positive(name: &'static str, v: f32) -> Result<(), ShapeError> {
    if v.is_finite() && v > 0.0 {
        Ok(())
    } else {
        Err(ShapeError::NonPositive(name, v))
    }
}

fn segments(name: &'static str, n: u32) -> Result<(), ShapeError> {
    if n >= 3 {
        Ok(())
    } else {
        Err(ShapeError::TooFewSegments(name, n))
    }
}

/// Axis-aligned box with the given full size
pub fn cuboid(size: Vec3) -> Result<Mesh, ShapeError> {
    positive("width", size.x)?;
    positive("height", size.y)?;
    positive("depth", size.z)?;

    let h = size * 0.5;
    let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z) * h;
    let faces = [
        (Vec3::X, [c(1., -1., -1.), c(1., 1., -1.), c(1., 1., 1.), c(1., -1., 1.)]),
        (-Vec3::X, [c(-1., -1., -1.), c(-1., -1., 1.), c(-1., 1., 1.), c(-1., 1., -1.)]),
        (Vec3::Y, [c(-1., 1., -1.), c(-1., 1., 1.), c(1., 1., 1.), c(1., 1., -1.)]),
        (-Vec3::Y, [c(-1., -1., -1.), c(1., -1., -1.), c(1., -1., 1.), c(-1., -1., 1.)]),
        (Vec3::Z, [c(-1., -1., 1.), c(1., -1., 1.), c(1., 1., 1.), c(-1., 1., 1.)]),
        (-Vec3::Z, [c(-1., -1., -1.), c(-1., 1., -1.), c(1., 1., -1.), c(1., -1., -1.)]),
    ];
    let mut mesh = Mesh::with_capacity(24, 12);
    for (normal, points) in faces {
        mesh.push_face_facing(&points, normal);
    }
    Ok(mesh)
}

/// Cylinder (or truncated cone) along Y
///
/// A `radius_top` of zero produces a cone with its apex at `+height / 2`.
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
) -> Result<Mesh, ShapeError> {
    if !(radius_top.is_finite() && radius_top >= 0.0) {
        return Err(ShapeError::NonPositive("radius_top", radius_top));
    }
    positive("radius_bottom", radius_bottom)?;
    positive("height", height)?;
    segments("radial_segments", radial_segments)?;

    let n = radial_segments as usize;
    let half = height * 0.5;
    let ring = |radius: f32, y: f32| -> Vec<Vec3> {
        (0..n)
            .map(|i| {
                let a = TAU * i as f32 / n as f32;
                Vec3::new(radius * a.sin(), y, radius * a.cos())
            })
            .collect()
    };
    let bottom = ring(radius_bottom, -half);
    let apex = Vec3::new(0.0, half, 0.0);
    let top = if radius_top > 0.0 { ring(radius_top, half) } else { vec![apex; n] };

    let mut mesh = Mesh::with_capacity(n * 6, n * 4);
    for i in 0..n {
        let j = (i + 1) % n;
        let mid = TAU * (i as f32 + 0.5) / n as f32;
        let outward = Vec3::new(mid.sin(), 0.0, mid.cos());
        if radius_top > 0.0 {
            mesh.push_face_facing(&[bottom[i], bottom[j], top[j], top[i]], outward);
        } else {
            mesh.push_face_facing(&[bottom[i], bottom[j], apex], outward);
        }
    }
    mesh.push_face_facing(&bottom, -Vec3::Y);
    if radius_top > 0.0 {
        mesh.push_face_facing(&top, Vec3::Y);
    }
    Ok(mesh)
}

/// Cone along Y with its apex at the top
pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Result<Mesh, ShapeError> {
    cylinder(0.0, radius, height, radial_segments)
}

/// Regular octahedron with vertices on the axes
pub fn octahedron(radius: f32) -> Result<Mesh, ShapeError> {
    positive("radius", radius)?;
    let mut mesh = Mesh::with_capacity(24, 8);
    for sx in [1.0f32, -1.0] {
        for sy in [1.0f32, -1.0] {
            for sz in [1.0f32, -1.0] {
                let face = [
                    Vec3::X * sx * radius,
                    Vec3::Y * sy * radius,
                    Vec3::Z * sz * radius,
                ];
                mesh.push_face_facing(&face, Vec3::new(sx, sy, sz));
            }
        }
    }
    Ok(mesh)
}

/// Regular dodecahedron with the given circumradius
///
/// Faces are found from the twelve face normals (cyclic permutations of
/// `(0, ±φ, ±1)`): each face is the set of five vertices furthest along
/// its normal.
pub fn dodecahedron(radius: f32) -> Result<Mesh, ShapeError> {
    positive("radius", radius)?;

    let phi = (1.0 + 5.0f32.sqrt()) * 0.5;
    let inv = 1.0 / phi;
    let mut vertices = Vec::with_capacity(20);
    for sx in [1.0f32, -1.0] {
        for sy in [1.0f32, -1.0] {
            for sz in [1.0f32, -1.0] {
                vertices.push(Vec3::new(sx, sy, sz));
            }
        }
    }
    for a in [1.0f32, -1.0] {
        for b in [1.0f32, -1.0] {
            vertices.push(Vec3::new(0.0, a * inv, b * phi));
            vertices.push(Vec3::new(a * inv, b * phi, 0.0));
            vertices.push(Vec3::new(a * phi, 0.0, b * inv));
        }
    }
    let scale = radius / 3.0f32.sqrt();

    let mut normals = Vec::with_capacity(12);
    for a in [1.0f32, -1.0] {
        for b in [1.0f32, -1.0] {
            normals.push(Vec3::new(0.0, a * phi, b));
            normals.push(Vec3::new(b, 0.0, a * phi));
            normals.push(Vec3::new(a * phi, b, 0.0));
        }
    }

    let mut mesh = Mesh::with_capacity(60, 36);
    for n in normals {
        let best = vertices.iter().map(|v| v.dot(n)).fold(f32::MIN, f32::max);
        let mut face: Vec<Vec3> = vertices
            .iter()
            .copied()
            .filter(|v| v.dot(n) > best - 1.0e-3)
            .collect();
        let center = face.iter().copied().sum::<Vec3>() / face.len() as f32;
        let u = (face[0] - center).normalize();
        let w = n.normalize().cross(u);
        face.sort_by(|p, q| {
            let angle = |v: &Vec3| (*v - center).dot(w).atan2((*v - center).dot(u));
            angle(p).total_cmp(&angle(q))
        });
        let scaled: Vec<Vec3> = face.iter().map(|v| *v * scale).collect();
        mesh.push_face_facing(&scaled, n);
    }
    Ok(mesh)
}

/// Torus around the Y axis
pub fn torus(
    radius: f32,
    tube: f32,
    radial_segments: u32,
    tubular_segments: u32,
) -> Result<Mesh, ShapeError> {
    positive("radius", radius)?;
    positive("tube", tube)?;
    segments("radial_segments", radial_segments)?;
    segments("tubular_segments", tubular_segments)?;
    if tube >= radius {
        return Err(ShapeError::TubeTooThick { radius, tube });
    }

    let (nr, nt) = (radial_segments as usize, tubular_segments as usize);
    // grid[i][j]: i around the ring, j around the tube
    let grid: Vec<Vec<Vec3>> = (0..nt)
        .map(|i| {
            let u = TAU * i as f32 / nt as f32;
            let center = Vec3::new(u.cos(), 0.0, u.sin()) * radius;
            let out = center.normalize();
            (0..nr)
                .map(|j| {
                    let v = TAU * j as f32 / nr as f32;
                    center + (out * v.cos() + Vec3::Y * v.sin()) * tube
                })
                .collect()
        })
        .collect();

    let mut mesh = Mesh::with_capacity(nr * nt * 4, nr * nt * 2);
    for i in 0..nt {
        let i2 = (i + 1) % nt;
        for j in 0..nr {
            let j2 = (j + 1) % nr;
            let quad = [grid[i][j], grid[i2][j], grid[i2][j2], grid[i][j2]];
            let mid = quad.iter().copied().sum::<Vec3>() / 4.0;
            let ring_center = Vec3::new(mid.x, 0.0, mid.z).normalize() * radius;
            mesh.push_face_facing(&quad, mid - ring_center);
        }
    }
    Ok(mesh)
}
