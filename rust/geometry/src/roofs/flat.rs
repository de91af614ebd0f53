// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{lift, push_roof_triangle, RoofBuilder, RoofGeometry, RoofParams};
use crate::mesh::Mesh;
use crate::triangulation::triangulate_multipolygon;

/// Flat cap over the whole footprint at the building height.
///
/// This is the fallback for every other strategy, so it never declines: a
/// footprint earcut cannot handle yields an empty roof. A requested roof height
/// is absorbed by the facade, which must then reach `building_height`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatRoofBuilder;

impl FlatRoofBuilder {
    pub fn build_flat(params: &RoofParams<'_>) -> RoofGeometry {
        let mut mesh = Mesh::new();

        match triangulate_multipolygon(params.multipolygon) {
            Ok(triangulation) => {
                let z = params.building_height;
                for [a, b, c] in triangulation.triangles() {
                    push_roof_triangle(&mut mesh, [lift(&a, z), lift(&b, z), lift(&c, z)]);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "Flat roof triangulation failed, roof left empty");
            }
        }

        if params.flip {
            mesh.flip();
        }

        let facade_height = (params.height > 0.0).then_some(params.building_height);
        RoofGeometry::new(mesh).with_facade_height(facade_height)
    }
}

impl RoofBuilder for FlatRoofBuilder {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        Some(Self::build_flat(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roofs::tests::{footprint, params};
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_roof_on_square() {
        let mp = footprint(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let roof = FlatRoofBuilder::build_flat(&params(&mp));

        assert_eq!(roof.mesh.vertex_count(), 6);
        assert!(roof.skirt.is_none());
        assert!(!roof.add_skirt);
        for n in roof.mesh.normal.chunks_exact(3) {
            assert_relative_eq!(n[2], 1.0);
        }
        let bounds = roof.mesh.bounds();
        assert_relative_eq!(bounds.min.z, 10.0);
        assert_relative_eq!(bounds.max.z, 10.0);
    }

    #[test]
    fn test_roof_height_raises_facade_to_cap() {
        let mp = footprint(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let roof = FlatRoofBuilder::build_flat(&params(&mp));
        assert_eq!(roof.facade_height_override, Some(10.0));

        let mut p = params(&mp);
        p.height = 0.0;
        assert_eq!(FlatRoofBuilder::build_flat(&p).facade_height_override, None);
    }

    #[test]
    fn test_flipped_flat_roof_faces_down() {
        let mp = footprint(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        let mut p = params(&mp);
        p.flip = true;
        p.building_height = 2.0;

        let roof = FlatRoofBuilder::build_flat(&p);
        for n in roof.mesh.normal.chunks_exact(3) {
            assert_relative_eq!(n[2], -1.0);
        }
        assert_relative_eq!(roof.mesh.bounds().max.z, 2.0);
    }

    #[test]
    fn test_degenerate_footprint_gives_empty_roof() {
        let mp = footprint(&[(0.0, 0.0), (1.0, 1.0)]);
        let roof = FlatRoofBuilder.build(&params(&mp)).unwrap();
        assert!(roof.mesh.is_empty());
    }
}
