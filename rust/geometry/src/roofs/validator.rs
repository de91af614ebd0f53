// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::RoofGeometry;
use crate::ring::Multipolygon;
use nalgebra::Point3;

/// Triangles below this area count as degenerate
const DEGENERATE_AREA: f64 = 1e-9;
/// Allowed relative difference between roof plan area and footprint area
const AREA_TOLERANCE: f64 = 0.01;

/// Accepts or rejects a roof mesh against the footprint it was built from
#[derive(Debug, Clone, Copy, Default)]
pub struct RoofGeometryValidator;

impl RoofGeometryValidator {
    pub fn validate(roof: &RoofGeometry, multipolygon: &Multipolygon) -> bool {
        let mesh = &roof.mesh;

        if mesh.is_empty()
            || mesh.position.len() % 9 != 0
            || mesh.normal.len() != mesh.position.len()
            || mesh.uv.len() * 3 != mesh.position.len() * 2
        {
            return false;
        }

        if !mesh
            .position
            .iter()
            .chain(&mesh.normal)
            .chain(&mesh.uv)
            .all(|v| v.is_finite())
        {
            return false;
        }

        let mut degenerate = 0usize;
        let mut plan_area = 0.0;
        for [a, b, c] in mesh.triangles() {
            if triangle_area(&a, &b, &c) < DEGENERATE_AREA {
                degenerate += 1;
            }
            plan_area += ((b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)).abs() * 0.5;
        }
        if degenerate * 2 > mesh.triangle_count() {
            return false;
        }

        // Folded or overlapping faces cover more plan area than the footprint;
        // gaps cover less.
        let footprint_area = multipolygon.area();
        if footprint_area < DEGENERATE_AREA {
            return false;
        }
        (plan_area - footprint_area).abs() <= footprint_area * AREA_TOLERANCE
    }
}

#[inline]
fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    (b - a).cross(&(c - a)).norm() * 0.5
}
