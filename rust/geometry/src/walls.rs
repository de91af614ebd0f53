// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall extrusion - quad strips between a boundary and a height profile

use crate::mesh::Mesh;
use nalgebra::{Point2, Point3, Vector3};

/// Height of a wall edge: one value for the whole boundary, or one per vertex
#[derive(Debug, Clone, PartialEq)]
pub enum HeightProfile {
    Uniform(f64),
    PerVertex(Vec<f64>),
}

impl HeightProfile {
    /// Height at a boundary vertex. Missing per-vertex entries repeat the last one.
    #[inline]
    pub fn at(&self, index: usize) -> f64 {
        match self {
            Self::Uniform(h) => *h,
            Self::PerVertex(heights) => heights
                .get(index)
                .or_else(|| heights.last())
                .copied()
                .unwrap_or(0.0),
        }
    }
}

impl From<f64> for HeightProfile {
    fn from(h: f64) -> Self {
        Self::Uniform(h)
    }
}

/// Wall extrusion input
#[derive(Debug, Clone)]
pub struct WallParams<'a> {
    /// Boundary vertices, wound so that the material lies to the left
    pub vertices: &'a [Point2<f64>],
    /// Connect the last vertex back to the first
    pub closed: bool,
    /// Lower edge
    pub min_height: HeightProfile,
    /// Upper edge
    pub height: HeightProfile,
    /// Number of floors, used for the vertical texture repeat
    pub levels: u32,
    /// Target width of one window column
    pub window_width: f64,
}

/// Build a wall strip.
///
/// Every edge is split into window columns of roughly `window_width`; every
/// column becomes one quad facing away from the material. Zero-length edges are
/// skipped.
pub fn build_walls(params: &WallParams<'_>) -> Mesh {
    let vertices = params.vertices;
    let n = vertices.len();
    if n < 2 {
        return Mesh::new();
    }

    let edge_count = if params.closed { n } else { n - 1 };
    let levels = params.levels.max(1) as f64;
    let mut mesh = Mesh::with_capacity(edge_count * 6);
    let mut u_offset = 0.0;

    for i in 0..edge_count {
        let j = (i + 1) % n;
        let p0 = vertices[i];
        let p1 = vertices[j];

        let edge = p1 - p0;
        let normal = match Vector3::new(edge.y, -edge.x, 0.0).try_normalize(1e-10) {
            Some(n) => n,
            None => continue,
        };

        let segments = window_segments(edge.norm(), params.window_width);
        let (low0, low1) = (params.min_height.at(i), params.min_height.at(j));
        let (high0, high1) = (params.height.at(i), params.height.at(j));

        for s in 0..segments {
            let t0 = s as f64 / segments as f64;
            let t1 = (s + 1) as f64 / segments as f64;

            let a = p0 + edge * t0;
            let b = p0 + edge * t1;
            let a_low = lerp(low0, low1, t0);
            let b_low = lerp(low0, low1, t1);
            let a_high = lerp(high0, high1, t0);
            let b_high = lerp(high0, high1, t1);

            let u0 = u_offset + s as f64;
            let u1 = u0 + 1.0;

            push_wall_quad(
                &mut mesh,
                [
                    Point3::new(a.x, a.y, a_low),
                    Point3::new(b.x, b.y, b_low),
                    Point3::new(b.x, b.y, b_high),
                    Point3::new(a.x, a.y, a_high),
                ],
                normal,
                [
                    Point2::new(u0, 0.0),
                    Point2::new(u1, 0.0),
                    Point2::new(u1, levels),
                    Point2::new(u0, levels),
                ],
            );
        }

        u_offset += segments as f64;
    }

    mesh
}

/// Walls are flat vertical quads, so the edge normal is exact and survives
/// zero-height (gable tip) triangles that a face normal would not.
#[inline]
fn push_wall_quad(mesh: &mut Mesh, points: [Point3<f64>; 4], normal: Vector3<f64>, uvs: [Point2<f64>; 4]) {
    for index in [0, 1, 2, 0, 2, 3] {
        mesh.add_vertex(points[index], normal, uvs[index]);
    }
}

/// Number of window columns along an edge
#[inline]
fn window_segments(length: f64, window_width: f64) -> usize {
    if window_width <= 0.0 || !window_width.is_finite() {
        return 1;
    }
    ((length / window_width).round() as usize).max(1)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_closed_square_walls() {
        let vertices = unit_square();
        let mesh = build_walls(&WallParams {
            vertices: &vertices,
            closed: true,
            min_height: 0.0.into(),
            height: 3.0.into(),
            levels: 1,
            window_width: 1.0,
        });

        assert_eq!(mesh.vertex_count(), 4 * 6);
        let bounds = mesh.bounds();
        assert_relative_eq!(bounds.min.z, 0.0);
        assert_relative_eq!(bounds.max.z, 3.0);
    }

    #[test]
    fn test_normals_point_outward() {
        let vertices = unit_square();
        let mesh = build_walls(&WallParams {
            vertices: &vertices,
            closed: true,
            min_height: 0.0.into(),
            height: 1.0.into(),
            levels: 1,
            window_width: 0.0,
        });

        // First edge runs along +X at y = 0, outside is -Y
        assert_relative_eq!(mesh.normal[1], -1.0);
        for (p, n) in mesh.points().zip(mesh.normal.chunks_exact(3)) {
            let to_center = Vector3::new(0.5 - p.x, 0.5 - p.y, 0.0);
            assert!(to_center.dot(&Vector3::new(n[0], n[1], n[2])) <= 0.0);
        }
    }

    #[test]
    fn test_window_segments_split_edges() {
        let vertices = vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)];
        let mesh = build_walls(&WallParams {
            vertices: &vertices,
            closed: false,
            min_height: 0.0.into(),
            height: 6.0.into(),
            levels: 2,
            window_width: 2.5,
        });

        assert_eq!(mesh.vertex_count(), 4 * 6);
        let max_u = mesh.uv.chunks_exact(2).map(|uv| uv[0]).fold(0.0, f64::max);
        let max_v = mesh.uv.chunks_exact(2).map(|uv| uv[1]).fold(0.0, f64::max);
        assert_relative_eq!(max_u, 4.0);
        assert_relative_eq!(max_v, 2.0);
    }

    #[test]
    fn test_per_vertex_heights() {
        let vertices = vec![Point2::new(0.0, 0.0), Point2::new(2.0, 0.0), Point2::new(4.0, 0.0)];
        let mesh = build_walls(&WallParams {
            vertices: &vertices,
            closed: false,
            min_height: 3.0.into(),
            height: HeightProfile::PerVertex(vec![3.0, 5.0, 3.0]),
            levels: 1,
            window_width: 0.0,
        });

        assert_eq!(mesh.vertex_count(), 2 * 6);
        assert_relative_eq!(mesh.bounds().max.z, 5.0);
        assert_relative_eq!(mesh.bounds().min.z, 3.0);
    }

    #[test]
    fn test_degenerate_edges_are_skipped() {
        let vertices = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
        ];
        let mesh = build_walls(&WallParams {
            vertices: &vertices,
            closed: false,
            min_height: 0.0.into(),
            height: 1.0.into(),
            levels: 1,
            window_width: 1.0,
        });
        assert_eq!(mesh.vertex_count(), 6);
    }

    #[test]
    fn test_height_profile_lookup() {
        let profile = HeightProfile::PerVertex(vec![1.0, 2.0]);
        assert_eq!(profile.at(0), 1.0);
        assert_eq!(profile.at(5), 2.0);
        assert_eq!(HeightProfile::PerVertex(vec![]).at(0), 0.0);
        assert_eq!(HeightProfile::Uniform(4.0).at(9), 4.0);
    }
}
