//! Geometry factory.
//!
//! Every builder here is a pure function of fixed parameters that returns
//! CPU-side vertex and index data. GPU upload happens later, lazily, in the
//! renderer, so the scene graph can be assembled and tested without a device.
//!
//! Layouts follow the usual conventions of web 3D libraries: spheres are
//! generated pole to pole with an equirectangular UV map, tubes are swept
//! along a curve with parallel-transported frames, and index order runs
//! along the sweep so a prefix draw range grows the tube from its start.

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};

use crate::geo::CubicBezier;
use crate::gpu::GpuContext;
use crate::mesh::{Mesh, Vertex3d};

/// Triangle geometry before GPU upload.
#[derive(Clone, Debug, PartialEq)]
pub struct Geometry {
    /// Vertex positions, normals, and UVs.
    pub vertices: Vec<Vertex3d>,
    /// Triangle indices.
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Creates geometry from vertices and indices.
    pub fn new(vertices: Vec<Vertex3d>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of indices, i.e. the full draw range.
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Uploads this geometry to the GPU as a [`Mesh`].
    pub fn upload(&self, gpu: &GpuContext, label: &str) -> Mesh {
        Mesh::new(gpu, label, &self.vertices, &self.indices)
    }
}

/// A cloud of unconnected points, rendered as camera-facing sprites.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
}

impl PointCloud {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A flat rectangle in the XY plane facing +Z.
pub fn plane(width: f32, height: f32) -> Geometry {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let normal = [0.0, 0.0, 1.0];

    let vertices = vec![
        Vertex3d::new([-hw, hh, 0.0], normal, [0.0, 0.0]),
        Vertex3d::new([hw, hh, 0.0], normal, [1.0, 0.0]),
        Vertex3d::new([-hw, -hh, 0.0], normal, [0.0, 1.0]),
        Vertex3d::new([hw, -hh, 0.0], normal, [1.0, 1.0]),
    ];
    let indices = vec![0, 2, 1, 2, 3, 1];

    Geometry::new(vertices, indices)
}

/// A UV sphere centered at the origin.
///
/// Vertices: `(width_segments + 1) * (height_segments + 1)`. The polar rows
/// emit one triangle per quad, so the index count is
/// `6 * width_segments * (height_segments - 1)`.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);

    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
    let mut indices = Vec::new();

    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;

        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * TAU;

            let position = Vec3::new(
                -radius * phi.cos() * theta.sin(),
                radius * theta.cos(),
                radius * phi.sin() * theta.sin(),
            );
            let normal = position.normalize_or(Vec3::Y);

            vertices.push(Vertex3d::new(position.into(), normal.into(), [u, v]));
        }
    }

    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Geometry::new(vertices, indices)
}

/// A torus in the XY plane, used for surface markers.
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Geometry {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for j in 0..=radial_segments {
        let v = j as f32 / radial_segments as f32 * TAU;
        for i in 0..=tubular_segments {
            let u = i as f32 / tubular_segments as f32 * TAU;

            let position = Vec3::new(
                (radius + tube * v.cos()) * u.cos(),
                (radius + tube * v.cos()) * u.sin(),
                tube * v.sin(),
            );
            let center = Vec3::new(radius * u.cos(), radius * u.sin(), 0.0);
            let normal = (position - center).normalize_or(Vec3::Z);
            let uv = [
                i as f32 / tubular_segments as f32,
                j as f32 / radial_segments as f32,
            ];

            vertices.push(Vertex3d::new(position.into(), normal.into(), uv));
        }
    }

    let row = tubular_segments + 1;
    for j in 1..=radial_segments {
        for i in 1..=tubular_segments {
            let a = row * j + i - 1;
            let b = row * (j - 1) + i - 1;
            let c = row * (j - 1) + i;
            let d = row * j + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry::new(vertices, indices)
}

/// A tube swept along `curve`.
///
/// Index count is `tubular_segments * radial_segments * 6`; with the default
/// flight tube (20 × 8) that is 960.
pub fn tube(curve: &CubicBezier, tubular_segments: u32, radius: f32, radial_segments: u32) -> Geometry {
    let frames = FrenetFrames::compute(curve, tubular_segments);
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for i in 0..=tubular_segments {
        let t = i as f32 / tubular_segments as f32;
        let center = curve.point_at(t);
        let n = frames.normals[i as usize];
        let b = frames.binormals[i as usize];

        for j in 0..=radial_segments {
            let v = j as f32 / radial_segments as f32 * TAU;
            let normal = (n * -v.cos() + b * v.sin()).normalize_or(n);
            let position = center + normal * radius;
            let uv = [t, j as f32 / radial_segments as f32];

            vertices.push(Vertex3d::new(position.into(), normal.into(), uv));
        }
    }

    let row = radial_segments + 1;
    for j in 1..=tubular_segments {
        for i in 1..=radial_segments {
            let a = row * (j - 1) + (i - 1);
            let b = row * j + (i - 1);
            let c = row * j + i;
            let d = row * (j - 1) + i;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Geometry::new(vertices, indices)
}

/// Scatter `count` points uniformly inside a cube of edge `spread`.
///
/// Positions come from an integer hash of the index and `seed`, so the same
/// arguments always give the same field.
pub fn star_field(count: u32, spread: f32, seed: u32) -> PointCloud {
    let positions = (0..count)
        .map(|i| {
            let x = unit(hash(i, 0, seed));
            let y = unit(hash(i, 1, seed));
            let z = unit(hash(i, 2, seed));
            (Vec3::new(x, y, z) - Vec3::splat(0.5)) * spread
        })
        .collect();

    PointCloud { positions }
}

/// Integer hash for deterministic procedural placement.
fn hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_add(x.wrapping_mul(374761393));
    h = h.wrapping_add(y.wrapping_mul(668265263));
    h ^= h >> 13;
    h = h.wrapping_mul(1274126177);
    h ^= h >> 16;
    h
}

fn unit(h: u32) -> f32 {
    (h & 0x00ff_ffff) as f32 / 0x00ff_ffff as f32
}

/// Parallel-transported tangent frames along a curve.
struct FrenetFrames {
    normals: Vec<Vec3>,
    binormals: Vec<Vec3>,
}

impl FrenetFrames {
    fn compute(curve: &CubicBezier, segments: u32) -> Self {
        let tangents: Vec<Vec3> = (0..=segments)
            .map(|i| curve.tangent_at(i as f32 / segments as f32))
            .collect();

        // Seed the first normal from the axis least aligned with the tangent.
        let t0 = tangents[0];
        let abs = t0.abs();
        let axis = if abs.x <= abs.y && abs.x <= abs.z {
            Vec3::X
        } else if abs.y <= abs.z {
            Vec3::Y
        } else {
            Vec3::Z
        };
        let side = t0.cross(axis).normalize_or(Vec3::Z);

        let mut normals = Vec::with_capacity(tangents.len());
        let mut binormals = Vec::with_capacity(tangents.len());
        normals.push(t0.cross(side));
        binormals.push(t0.cross(normals[0]));

        for i in 1..tangents.len() {
            let mut normal = normals[i - 1];
            let rotation_axis = tangents[i - 1].cross(tangents[i]);
            if rotation_axis.length() > f32::EPSILON {
                let angle = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
                normal = Quat::from_axis_angle(rotation_axis.normalize(), angle) * normal;
            }
            binormals.push(tangents[i].cross(normal));
            normals.push(normal);
        }

        Self { normals, binormals }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::flight_curve;

    #[test]
    fn plane_is_two_triangles_facing_forward() {
        let geom = plane(1.0, 1.0);
        assert_eq!(geom.vertices.len(), 4);
        assert_eq!(geom.index_count(), 6);
        assert!(geom.vertices.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));

        let corners: Vec<_> = geom.vertices.iter().map(|v| v.position).collect();
        assert!(corners.contains(&[-0.5, -0.5, 0.0]));
        assert!(corners.contains(&[0.5, 0.5, 0.0]));
    }

    #[test]
    fn sphere_counts() {
        let geom = sphere(1.3, 30, 30);
        assert_eq!(geom.vertices.len(), 31 * 31);
        assert_eq!(geom.index_count(), 6 * 30 * 29);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let geom = sphere(2.0, 16, 8);
        for v in &geom.vertices {
            assert!((Vec3::from(v.position).length() - 2.0).abs() < 1e-4);
        }
    }

    #[test]
    fn torus_counts() {
        let geom = torus(0.02, 0.002, 20, 20);
        assert_eq!(geom.vertices.len(), 21 * 21);
        assert_eq!(geom.index_count(), 20 * 20 * 6);
    }

    #[test]
    fn default_flight_tube_has_960_indices() {
        let curve = flight_curve(Vec3::X, Vec3::Z, 1.0);
        let geom = tube(&curve, 20, 0.003, 8);
        assert_eq!(geom.index_count(), 960);
        assert_eq!(geom.vertices.len(), 21 * 9);
    }

    #[test]
    fn tube_stays_near_curve() {
        let curve = flight_curve(Vec3::X, Vec3::Y, 1.0);
        let geom = tube(&curve, 20, 0.01, 8);
        let start = curve.point_at(0.0);
        for v in &geom.vertices[..9] {
            let d = (Vec3::from(v.position) - start).length();
            assert!((d - 0.01).abs() < 1e-4);
        }
    }

    #[test]
    fn star_field_is_deterministic_and_bounded() {
        let a = star_field(500, 5.0, 7);
        let b = star_field(500, 5.0, 7);
        assert_eq!(a, b);
        assert_eq!(a.len(), 500);
        assert!(a.positions.iter().all(|p| p.abs().max_element() <= 2.5));

        let c = star_field(500, 5.0, 8);
        assert_ne!(a, c);
    }
}
