// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Quadrilateral footprints shared by ridge roofs

use crate::ring::Multipolygon;
use nalgebra::{center, Point2, Vector2};

/// Convex four-corner footprint without holes, corners counter-clockwise
#[derive(Debug, Clone, Copy)]
pub(crate) struct QuadFootprint {
    corners: [Point2<f64>; 4],
}

/// Corners relabelled so that the ridge runs parallel to `a -> b` and `c -> d`
#[derive(Debug, Clone, Copy)]
pub(crate) struct RidgeFrame {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
    pub c: Point2<f64>,
    pub d: Point2<f64>,
}

impl RidgeFrame {
    /// Ridge end over the `d -> a` side
    pub fn ridge_start(&self) -> Point2<f64> {
        center(&self.d, &self.a)
    }

    /// Ridge end over the `b -> c` side
    pub fn ridge_end(&self) -> Point2<f64> {
        center(&self.b, &self.c)
    }

    /// Half the distance between the two eave sides
    pub fn half_span(&self) -> f64 {
        (center(&self.a, &self.b) - center(&self.c, &self.d)).norm() * 0.5
    }
}

impl QuadFootprint {
    pub fn from_multipolygon(multipolygon: &Multipolygon) -> Option<Self> {
        let ring = multipolygon.single_ring()?;
        if ring.len() != 4 || !ring.is_convex() {
            return None;
        }
        let n = ring.nodes();
        Some(Self {
            corners: [n[0], n[1], n[2], n[3]],
        })
    }

    /// Frame with the ridge along edge pair `axis` (0: edges 0 and 2, 1: edges 1 and 3)
    pub fn frame(&self, axis: usize) -> RidgeFrame {
        let k = axis % 2;
        let c = &self.corners;
        RidgeFrame {
            a: c[k],
            b: c[(k + 1) % 4],
            c: c[(k + 2) % 4],
            d: c[(k + 3) % 4],
        }
    }

    /// Axis of the edge pair closest to parallel with `direction` (radians).
    /// Footprints with no preference, such as a square at 45 degrees, use the
    /// long axis.
    pub fn axis_along(&self, direction: f64) -> usize {
        let towards = Vector2::new(direction.cos(), direction.sin());
        let c = &self.corners;
        let alignment = |from: usize, to: usize| {
            (c[to] - c[from])
                .try_normalize(1e-12)
                .map_or(0.0, |edge| edge.dot(&towards).abs())
        };

        let pair0 = alignment(0, 1) + alignment(2, 3);
        let pair1 = alignment(1, 2) + alignment(3, 0);
        if (pair0 - pair1).abs() < 1e-9 {
            self.long_axis()
        } else if pair1 > pair0 {
            1
        } else {
            0
        }
    }

    /// Axis of the longer edge pair
    pub fn long_axis(&self) -> usize {
        let c = &self.corners;
        let pair0 = (c[1] - c[0]).norm() + (c[3] - c[2]).norm();
        let pair1 = (c[2] - c[1]).norm() + (c[0] - c[3]).norm();
        if pair1 > pair0 {
            1
        } else {
            0
        }
    }
}
