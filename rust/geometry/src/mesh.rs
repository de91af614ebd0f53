// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures

use crate::aabb::BoundingBox;
use nalgebra::{Point2, Point3, Vector3};

/// Non-indexed triangle list.
///
/// Every three consecutive vertices form one triangle, counter-clockwise when
/// seen from the side the normal points to. Attributes stay in `f64` until the
/// builder packs them into render buffers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (x, y, z)
    pub position: Vec<f64>,
    /// Vertex normals (nx, ny, nz)
    pub normal: Vec<f64>,
    /// Texture coordinates (u, v)
    pub uv: Vec<f64>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize) -> Self {
        Self {
            position: Vec::with_capacity(vertex_count * 3),
            normal: Vec::with_capacity(vertex_count * 3),
            uv: Vec::with_capacity(vertex_count * 2),
        }
    }

    /// Add a vertex with normal and uv
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>, normal: Vector3<f64>, uv: Point2<f64>) {
        self.position.extend_from_slice(&[position.x, position.y, position.z]);
        self.normal.extend_from_slice(&[normal.x, normal.y, normal.z]);
        self.uv.extend_from_slice(&[uv.x, uv.y]);
    }

    /// Add a flat-shaded triangle; the normal follows the winding
    #[inline]
    pub fn add_triangle(&mut self, points: [Point3<f64>; 3], uvs: [Point2<f64>; 3]) {
        let normal = face_normal(&points);
        for (p, uv) in points.into_iter().zip(uvs) {
            self.add_vertex(p, normal, uv);
        }
    }

    /// Add a quad as two triangles (a, b, c) and (a, c, d)
    #[inline]
    pub fn add_quad(&mut self, points: [Point3<f64>; 4], uvs: [Point2<f64>; 4]) {
        let [a, b, c, d] = points;
        let [ua, ub, uc, ud] = uvs;
        self.add_triangle([a, b, c], [ua, ub, uc]);
        self.add_triangle([a, c, d], [ua, uc, ud]);
    }

    /// Reverse every triangle and negate normals, e.g. for an underside cap
    pub fn flip(&mut self) {
        for tri in self.position.chunks_exact_mut(9) {
            let (first, rest) = tri.split_at_mut(6);
            first[3..6].swap_with_slice(&mut rest[0..3]);
        }
        for tri in self.uv.chunks_exact_mut(6) {
            let (first, rest) = tri.split_at_mut(4);
            first[2..4].swap_with_slice(&mut rest[0..2]);
        }
        for tri in self.normal.chunks_exact_mut(9) {
            let (first, rest) = tri.split_at_mut(6);
            first[3..6].swap_with_slice(&mut rest[0..3]);
        }
        self.normal.iter_mut().for_each(|n| *n = -*n);
    }

    /// Merge another mesh into this one
    #[inline]
    pub fn merge(&mut self, other: &Mesh) {
        self.position.extend_from_slice(&other.position);
        self.normal.extend_from_slice(&other.normal);
        self.uv.extend_from_slice(&other.uv);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }

    /// Get triangle count
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.position.len() / 9
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Point3<f64>> + '_ {
        self.position
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.position.chunks_exact(9).map(|c| {
            [
                Point3::new(c[0], c[1], c[2]),
                Point3::new(c[3], c[4], c[5]),
                Point3::new(c[6], c[7], c[8]),
            ]
        })
    }

    pub fn bounds(&self) -> BoundingBox {
        let mut bounds = BoundingBox::new();
        bounds.include_mesh(self);
        bounds
    }
}

/// Unit normal of a triangle, +Z for degenerate input
#[inline]
pub fn face_normal(points: &[Point3<f64>; 3]) -> Vector3<f64> {
    let v1 = points[1] - points[0];
    let v2 = points[2] - points[0];
    v1.cross(&v2)
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> [Point3<f64>; 3] {
        [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.triangle_count(), 0);
    }

    #[test]
    fn test_add_triangle_computes_normal() {
        let mut mesh = Mesh::new();
        mesh.add_triangle(unit_triangle(), [Point2::origin(); 3]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(&mesh.normal[0..3], &[0.0, 0.0, 1.0]);
        assert_eq!(mesh.uv.len(), 6);
    }

    #[test]
    fn test_add_quad() {
        let mut mesh = Mesh::new();
        mesh.add_quad(
            [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 1.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            [Point2::origin(); 4],
        );
        assert_eq!(mesh.vertex_count(), 6);
        // Facing -Y
        assert_relative_eq!(mesh.normal[1], -1.0);
    }

    #[test]
    fn test_flip() {
        let mut mesh = Mesh::new();
        mesh.add_triangle(
            unit_triangle(),
            [Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)],
        );
        mesh.flip();

        assert_eq!(&mesh.position[3..6], &[0.0, 1.0, 0.0]);
        assert_eq!(&mesh.position[6..9], &[1.0, 0.0, 0.0]);
        assert_eq!(&mesh.uv[2..4], &[0.0, 1.0]);
        assert_eq!(&mesh.normal[0..3], &[-0.0, -0.0, -1.0]);

        let [a, b, c] = mesh.triangles().next().unwrap();
        assert_relative_eq!(face_normal(&[a, b, c]).z, -1.0);
    }

    #[test]
    fn test_merge() {
        let mut mesh1 = Mesh::new();
        mesh1.add_triangle(unit_triangle(), [Point2::origin(); 3]);
        let mut mesh2 = Mesh::new();
        mesh2.add_triangle(unit_triangle(), [Point2::origin(); 3]);

        mesh1.merge(&mesh2);
        assert_eq!(mesh1.vertex_count(), 6);
        assert_eq!(mesh1.triangle_count(), 2);
    }

    #[test]
    fn test_degenerate_normal_falls_back_to_up() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(face_normal(&[p, p, p]), Vector3::z());
    }
}
