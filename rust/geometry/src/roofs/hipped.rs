// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::footprint::QuadFootprint;
use super::{lift, push_roof_quad, push_roof_triangle, RoofBuilder, RoofGeometry, RoofParams};
use crate::mesh::Mesh;

/// Four slopes: two trapezoids along the longer sides and two hips.
/// Only quadrilateral footprints are supported; the eaves stay level, so no
/// skirt is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct HippedRoofBuilder;

impl RoofBuilder for HippedRoofBuilder {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        let quad = QuadFootprint::from_multipolygon(params.multipolygon)?;
        let frame = quad.frame(quad.long_axis());

        let half_span = frame.half_span();
        let (roof_height, derived) = params.resolve_height(half_span);
        let top = params.building_height;
        let base = top - roof_height;

        let start = frame.ridge_start();
        let end = frame.ridge_end();
        let ridge = end - start;
        let length = ridge.norm();
        if length < 1e-9 {
            return None;
        }

        let inset = half_span.min(length * 0.5);
        let unit = ridge / length;
        let ridge_start = start + unit * inset;
        let ridge_end = end - unit * inset;

        let mut mesh = Mesh::with_capacity(18);
        push_roof_quad(
            &mut mesh,
            [
                lift(&frame.a, base),
                lift(&frame.b, base),
                lift(&ridge_end, top),
                lift(&ridge_start, top),
            ],
        );
        push_roof_quad(
            &mut mesh,
            [
                lift(&frame.c, base),
                lift(&frame.d, base),
                lift(&ridge_start, top),
                lift(&ridge_end, top),
            ],
        );
        push_roof_triangle(
            &mut mesh,
            [lift(&frame.b, base), lift(&frame.c, base), lift(&ridge_end, top)],
        );
        push_roof_triangle(
            &mut mesh,
            [lift(&frame.d, base), lift(&frame.a, base), lift(&ridge_start, top)],
        );

        Some(RoofGeometry::new(mesh).with_facade_height(derived.then_some(base)))
    }
}
