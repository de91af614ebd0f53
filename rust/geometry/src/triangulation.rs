// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint triangulation
//!
//! Wrapper around earcutr for multipolygons with holes. Every triangle handed
//! out by [`triangulate_multipolygon`] is counter-clockwise in plan view, so
//! callers can lift it straight into an upward-facing roof.

use crate::ring::{Multipolygon, Ring};
use crate::{Error, Point2, Result};

/// Triangulated footprint: all polygon nodes plus triangle indices into them
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    pub points: Vec<Point2<f64>>,
    pub indices: Vec<usize>,
}

impl Triangulation {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles as point triples
    pub fn triangles(&self) -> impl Iterator<Item = [Point2<f64>; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|t| [self.points[t[0]], self.points[t[1]], self.points[t[2]]])
    }
}

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
pub(crate) fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Triangulate one outer ring with its holes.
/// Returns triangle indices into the concatenated node list (outer, then holes).
pub fn triangulate_polygon_with_holes(outer: &Ring, holes: &[&Ring]) -> Result<Vec<usize>> {
    if !outer.is_valid() {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }

    let valid_holes: Vec<&Ring> = holes.iter().copied().filter(|h| h.is_valid()).collect();

    // FAST PATH: convex ring without holes
    if valid_holes.is_empty() && is_convex(outer.nodes()) {
        return Ok(fan_triangulate(outer.len()));
    }

    let total_points = outer.len() + valid_holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total_points * 2);
    for p in outer.nodes() {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut hole_indices = Vec::with_capacity(valid_holes.len());
    for hole in &valid_holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole.nodes() {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Triangulate every polygon of a multipolygon into one index space.
///
/// Rings that cannot bound anything are skipped; an empty result is not an
/// error.
pub fn triangulate_multipolygon(multipolygon: &Multipolygon) -> Result<Triangulation> {
    let mut result = Triangulation::default();

    for polygon in multipolygon.polygons() {
        let indices = triangulate_polygon_with_holes(polygon.outer, &polygon.holes)?;
        let offset = result.points.len();

        result.points.extend_from_slice(polygon.outer.nodes());
        for hole in polygon.holes.iter().filter(|h| h.is_valid()) {
            result.points.extend_from_slice(hole.nodes());
        }

        for tri in indices.chunks_exact(3) {
            let (a, mut b, mut c) = (tri[0] + offset, tri[1] + offset, tri[2] + offset);
            if cross(&result.points[a], &result.points[b], &result.points[c]) < 0.0 {
                std::mem::swap(&mut b, &mut c);
            }
            result.indices.extend_from_slice(&[a, b, c]);
        }
    }

    Ok(result)
}

/// Twice the signed area of a plan triangle
#[inline]
pub(crate) fn cross(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}
