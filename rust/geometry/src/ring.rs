// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Footprint rings and multipolygons

use nalgebra::Point2;

/// Role of a ring inside a multipolygon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RingType {
    Outer,
    Inner,
}

/// Ordered 2D boundary, tagged outer or inner.
///
/// Nodes are stored open (first != last) and wound so that outer rings are
/// counter-clockwise and inner rings clockwise. That keeps the left-hand side of
/// every edge inside the material, which walls and roofs rely on for normals.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    ring_type: RingType,
    nodes: Vec<Point2<f64>>,
}

impl Ring {
    /// Create a ring. Malformed input is kept as-is apart from closing/winding.
    pub fn new(ring_type: RingType, mut nodes: Vec<Point2<f64>>) -> Self {
        if nodes.len() > 1 && nodes.first() == nodes.last() {
            nodes.pop();
        }

        let area = signed_area(&nodes);
        let wants_ccw = ring_type == RingType::Outer;
        if (area > 0.0) != wants_ccw && area != 0.0 {
            nodes.reverse();
        }

        Self { ring_type, nodes }
    }

    #[inline]
    pub fn ring_type(&self) -> RingType {
        self.ring_type
    }

    #[inline]
    pub fn nodes(&self) -> &[Point2<f64>] {
        &self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// A ring needs at least three nodes to bound anything
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.nodes.len() >= 3
    }

    /// Shoelace area, positive for counter-clockwise rings
    pub fn signed_area(&self) -> f64 {
        signed_area(&self.nodes)
    }

    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Even-odd point containment
    pub fn contains_point(&self, point: &Point2<f64>) -> bool {
        let n = self.nodes.len();
        if n < 3 {
            return false;
        }

        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let pi = &self.nodes[i];
            let pj = &self.nodes[j];
            if (pi.y > point.y) != (pj.y > point.y)
                && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Area-weighted centroid, falling back to the vertex average for
    /// degenerate rings
    pub fn centroid(&self) -> Point2<f64> {
        let n = self.nodes.len();
        if n == 0 {
            return Point2::origin();
        }

        let area = self.signed_area();
        if area.abs() < 1e-12 {
            let sum = self
                .nodes
                .iter()
                .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
            return Point2::new(sum.0 / n as f64, sum.1 / n as f64);
        }

        let mut cx = 0.0;
        let mut cy = 0.0;
        for i in 0..n {
            let p0 = &self.nodes[i];
            let p1 = &self.nodes[(i + 1) % n];
            let cross = p0.x * p1.y - p1.x * p0.y;
            cx += (p0.x + p1.x) * cross;
            cy += (p0.y + p1.y) * cross;
        }
        Point2::new(cx / (6.0 * area), cy / (6.0 * area))
    }

    /// Check whether all turns go the same way
    pub fn is_convex(&self) -> bool {
        crate::triangulation::is_convex(&self.nodes)
    }
}

#[inline]
fn signed_area(nodes: &[Point2<f64>]) -> f64 {
    let n = nodes.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let p0 = &nodes[i];
        let p1 = &nodes[(i + 1) % n];
        sum += p0.x * p1.y - p1.x * p0.y;
    }
    sum * 0.5
}

/// One outer ring together with the holes it contains
#[derive(Debug, Clone)]
pub struct Polygon<'a> {
    pub outer: &'a Ring,
    pub holes: Vec<&'a Ring>,
}

impl<'a> Polygon<'a> {
    pub fn area(&self) -> f64 {
        self.outer.area() - self.holes.iter().map(|h| h.area()).sum::<f64>()
    }
}

/// Building footprint: a set of rings read by both walls and roofs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Multipolygon {
    rings: Vec<Ring>,
}

impl Multipolygon {
    pub fn new() -> Self {
        Self { rings: Vec::new() }
    }

    /// Append a ring; insertion order is preserved
    pub fn add_ring(&mut self, ring: Ring) {
        self.rings.push(ring);
    }

    #[inline]
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    pub fn outer_rings(&self) -> impl Iterator<Item = &Ring> {
        self.rings.iter().filter(|r| r.ring_type() == RingType::Outer)
    }

    pub fn inner_rings(&self) -> impl Iterator<Item = &Ring> {
        self.rings.iter().filter(|r| r.ring_type() == RingType::Inner)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// Footprint area: outer rings minus their holes
    pub fn area(&self) -> f64 {
        self.polygons().iter().map(Polygon::area).sum()
    }

    /// Group rings into polygons.
    ///
    /// An inner ring belongs to the first outer ring containing its first node;
    /// inner rings that no outer ring contains are ignored.
    pub fn polygons(&self) -> Vec<Polygon<'_>> {
        let mut polygons: Vec<Polygon<'_>> = self
            .outer_rings()
            .filter(|r| r.is_valid())
            .map(|outer| Polygon {
                outer,
                holes: Vec::new(),
            })
            .collect();

        for inner in self.inner_rings().filter(|r| r.is_valid()) {
            let probe = inner.nodes()[0];
            if let Some(polygon) = polygons.iter_mut().find(|p| p.outer.contains_point(&probe)) {
                polygon.holes.push(inner);
            }
        }

        polygons
    }

    /// Earcut every polygon; triangles come back counter-clockwise
    pub fn triangulate(&self) -> crate::Result<crate::triangulation::Triangulation> {
        crate::triangulation::triangulate_multipolygon(self)
    }

    /// The single outer ring of a hole-free footprint, if that is what this is
    pub fn single_ring(&self) -> Option<&Ring> {
        match self.rings.as_slice() {
            [ring] if ring.ring_type() == RingType::Outer && ring.is_valid() => Some(ring),
            _ => None,
        }
    }
}
