// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{centroid_half_span, lift, push_roof_triangle, RoofBuilder, RoofGeometry, RoofParams};
use crate::mesh::Mesh;

/// One triangle per footprint edge, all meeting above the area centroid.
/// Needs a single outer ring without holes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PyramidalRoofBuilder;

impl RoofBuilder for PyramidalRoofBuilder {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        let ring = params.multipolygon.single_ring()?;
        let nodes = ring.nodes();
        let centroid = ring.centroid();

        let (roof_height, derived) = params.resolve_height(centroid_half_span(ring));
        let top = params.building_height;
        let base = top - roof_height;
        let apex = lift(&centroid, top);

        let mut mesh = Mesh::with_capacity(nodes.len() * 3);
        for i in 0..nodes.len() {
            let p0 = &nodes[i];
            let p1 = &nodes[(i + 1) % nodes.len()];
            push_roof_triangle(&mut mesh, [lift(p0, base), lift(p1, base), apex]);
        }

        Some(RoofGeometry::new(mesh).with_facade_height(derived.then_some(base)))
    }
}
