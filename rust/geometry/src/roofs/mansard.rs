// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{
    centroid_half_span, lift, push_roof_quad, push_roof_triangle, RoofBuilder, RoofGeometry, RoofParams,
};
use crate::mesh::Mesh;
use crate::ring::Ring;
use nalgebra::Point2;

/// Steep band up to an inset ring, then a flat top
#[derive(Debug, Clone, Copy, Default)]
pub struct MansardRoofBuilder;

/// Steep band to half height, then a pyramid to the apex
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadrupleSaltboxRoofBuilder;

/// Scale of the upper ring relative to the footprint, around the centroid
const MANSARD_INSET: f64 = 0.7;
const SALTBOX_INSET: f64 = 0.6;
const SALTBOX_BAND_RATIO: f64 = 0.5;

enum Cap {
    Flat,
    Apex,
}

impl RoofBuilder for MansardRoofBuilder {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        build_banded(params, MANSARD_INSET, 1.0, Cap::Flat)
    }
}

impl RoofBuilder for QuadrupleSaltboxRoofBuilder {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        build_banded(params, SALTBOX_INSET, SALTBOX_BAND_RATIO, Cap::Apex)
    }
}

/// Convex single-ring footprints only: scaling toward the centroid keeps the
/// inset ring inside the footprint only when it is convex.
fn build_banded(params: &RoofParams<'_>, inset: f64, band_ratio: f64, cap: Cap) -> Option<RoofGeometry> {
    let ring = params.multipolygon.single_ring()?;
    if !ring.is_convex() {
        return None;
    }

    let top = params.building_height;
    let (roof_height, derived) = params.resolve_height(centroid_half_span(ring));
    let base = top - roof_height;
    let band_top = base + roof_height * band_ratio;

    let outer = ring.nodes();
    let inner = inset_ring(ring, inset);
    let n = outer.len();

    let mut mesh = Mesh::with_capacity(n * 9);
    for i in 0..n {
        let j = (i + 1) % n;
        push_roof_quad(
            &mut mesh,
            [
                lift(&outer[i], base),
                lift(&outer[j], base),
                lift(&inner[j], band_top),
                lift(&inner[i], band_top),
            ],
        );
    }

    match cap {
        Cap::Flat => {
            for i in 1..n - 1 {
                push_roof_triangle(
                    &mut mesh,
                    [
                        lift(&inner[0], band_top),
                        lift(&inner[i], band_top),
                        lift(&inner[i + 1], band_top),
                    ],
                );
            }
        }
        Cap::Apex => {
            let apex = lift(&ring.centroid(), top);
            for i in 0..n {
                let j = (i + 1) % n;
                push_roof_triangle(
                    &mut mesh,
                    [lift(&inner[i], band_top), lift(&inner[j], band_top), apex],
                );
            }
        }
    }

    Some(RoofGeometry::new(mesh).with_facade_height(derived.then_some(base)))
}

fn inset_ring(ring: &Ring, scale: f64) -> Vec<Point2<f64>> {
    let centroid = ring.centroid();
    ring.nodes()
        .iter()
        .map(|p| centroid + (p - centroid) * scale)
        .collect()
}
