// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{lift, push_roof_triangle, RoofBuilder, RoofGeometry, RoofParams, RoofSkirt, SkirtPoint};
use crate::mesh::Mesh;
use crate::triangulation::triangulate_multipolygon;
use nalgebra::{Point2, Vector2};

/// Single inclined plane whose slope faces `direction`.
///
/// Works on any footprint, holes included. Since no edge except the lowest
/// sits on the facade top, every ring is returned as a skirt.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkillionRoofBuilder;

impl RoofBuilder for SkillionRoofBuilder {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        let triangulation = triangulate_multipolygon(params.multipolygon).ok()?;
        if triangulation.triangle_count() == 0 {
            return None;
        }

        let facing = Vector2::new(params.direction.cos(), params.direction.sin());
        let project = |p: &Point2<f64>| p.coords.dot(&facing);

        let (min, max) = triangulation
            .points
            .iter()
            .map(project)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)));
        let span = max - min;
        if span < 1e-9 {
            return None;
        }

        let (roof_height, derived) = params.resolve_height(span);
        let top = params.building_height;
        let base = top - roof_height;

        // Lowest along the facing direction, highest at the back
        let height_at = |p: &Point2<f64>| base + roof_height * (max - project(p)) / span;

        let mut mesh = Mesh::with_capacity(triangulation.indices.len());
        for [a, b, c] in triangulation.triangles() {
            push_roof_triangle(
                &mut mesh,
                [lift(&a, height_at(&a)), lift(&b, height_at(&b)), lift(&c, height_at(&c))],
            );
        }

        let skirt: RoofSkirt = params
            .multipolygon
            .rings()
            .iter()
            .filter(|ring| ring.is_valid())
            .map(|ring| {
                ring.nodes()
                    .iter()
                    .chain(ring.nodes().first())
                    .map(|p| SkirtPoint::new(*p, height_at(p)))
                    .collect()
            })
            .collect();

        Some(
            RoofGeometry::new(mesh)
                .with_skirt(skirt)
                .with_facade_height(derived.then_some(base)),
        )
    }
}
