// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::footprint::{QuadFootprint, RidgeFrame};
use super::{lift, push_roof_quad, RoofBuilder, RoofGeometry, RoofOrientation, RoofParams, SkirtPoint};
use crate::mesh::Mesh;

/// Two slopes meeting at a ridge parallel to the longer sides.
/// Only quadrilateral footprints are supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct GabledRoofBuilder;

/// Gabled roof whose ridge runs parallel (`Along`) or perpendicular
/// (`Across`) to `direction`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrientedGabledRoofBuilder;

impl RoofBuilder for GabledRoofBuilder {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        let quad = QuadFootprint::from_multipolygon(params.multipolygon)?;
        Some(build_gabled(params, &quad.frame(quad.long_axis())))
    }
}

impl RoofBuilder for OrientedGabledRoofBuilder {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        let quad = QuadFootprint::from_multipolygon(params.multipolygon)?;
        let along = quad.axis_along(params.direction);
        let axis = match params.orientation {
            RoofOrientation::Across => along + 1,
            RoofOrientation::Along | RoofOrientation::None => along,
        };
        Some(build_gabled(params, &quad.frame(axis)))
    }
}

fn build_gabled(params: &RoofParams<'_>, frame: &RidgeFrame) -> RoofGeometry {
    let (roof_height, derived) = params.resolve_height(frame.half_span());
    let top = params.building_height;
    let base = top - roof_height;

    let ridge_start = frame.ridge_start();
    let ridge_end = frame.ridge_end();

    let mut mesh = Mesh::with_capacity(12);
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

    // Gable ends, wound along the footprint so the walls face outward
    let skirt = vec![
        vec![
            SkirtPoint::new(frame.b, base),
            SkirtPoint::new(ridge_end, top),
            SkirtPoint::new(frame.c, base),
        ],
        vec![
            SkirtPoint::new(frame.d, base),
            SkirtPoint::new(ridge_start, top),
            SkirtPoint::new(frame.a, base),
        ],
    ];

    RoofGeometry::new(mesh)
        .with_skirt(skirt)
        .with_facade_height(derived.then_some(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roofs::tests::{footprint, params};
    use crate::roofs::RoofGeometryValidator;
    use approx::assert_relative_eq;
    use nalgebra::Point2;

    fn ridge_direction(roof: &RoofGeometry) -> (f64, f64) {
        let ridge: Vec<_> = roof
            .mesh
            .points()
            .filter(|p| (p.z - 10.0).abs() < 1e-9)
            .collect();
        let min_x = ridge.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let max_x = ridge.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let min_y = ridge.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_y = ridge.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        (max_x - min_x, max_y - min_y)
    }

    #[test]
    fn test_gabled_rectangle() {
        let mp = footprint(&[(0.0, 0.0), (8.0, 0.0), (8.0, 4.0), (0.0, 4.0)]);
        let roof = GabledRoofBuilder.build(&params(&mp)).unwrap();

        assert_eq!(roof.mesh.vertex_count(), 12);
        assert!(RoofGeometryValidator::validate(&roof, &mp));
        assert_eq!(ridge_direction(&roof), (8.0, 0.0));

        let skirt = roof.skirt.as_ref().unwrap();
        assert!(roof.add_skirt);
        assert_eq!(skirt.len(), 2);
        assert_relative_eq!(skirt[0][1].height, 10.0);
        assert_relative_eq!(skirt[0][0].height, 7.0);
        assert_eq!(skirt[0][1].position, Point2::new(8.0, 2.0));
        assert!(roof.facade_height_override.is_none());
    }

    #[test]
    fn test_slopes_face_up() {
        let mp = footprint(&[(0.0, 0.0), (8.0, 0.0), (8.0, 4.0), (0.0, 4.0)]);
        let roof = GabledRoofBuilder.build(&params(&mp)).unwrap();
        for n in roof.mesh.normal.chunks_exact(3) {
            assert!(n[2] > 0.0);
        }
    }

    #[test]
    fn test_oriented_across() {
        let mp = footprint(&[(0.0, 0.0), (8.0, 0.0), (8.0, 4.0), (0.0, 4.0)]);
        let mut p = params(&mp);
        p.orientation = RoofOrientation::Across;
        let roof = OrientedGabledRoofBuilder.build(&p).unwrap();
        assert_eq!(ridge_direction(&roof), (0.0, 4.0));

        p.orientation = RoofOrientation::Along;
        let roof = OrientedGabledRoofBuilder.build(&p).unwrap();
        assert_eq!(ridge_direction(&roof), (8.0, 0.0));
    }

    #[test]
    fn test_oriented_ridge_follows_direction() {
        let mp = footprint(&[(0.0, 0.0), (8.0, 0.0), (8.0, 4.0), (0.0, 4.0)]);
        let mut p = params(&mp);
        p.orientation = RoofOrientation::Along;

        p.direction = 0.0;
        let east = OrientedGabledRoofBuilder.build(&p).unwrap();
        p.direction = std::f64::consts::FRAC_PI_2;
        let north = OrientedGabledRoofBuilder.build(&p).unwrap();

        assert_ne!(east.mesh, north.mesh);
        assert_eq!(ridge_direction(&east), (8.0, 0.0));
        assert_eq!(ridge_direction(&north), (0.0, 4.0));
        assert!(RoofGeometryValidator::validate(&north, &mp));

        p.orientation = RoofOrientation::Across;
        assert_eq!(ridge_direction(&OrientedGabledRoofBuilder.build(&p).unwrap()), (8.0, 0.0));
    }

    #[test]
    fn test_height_from_pitch() {
        let mp = footprint(&[(0.0, 0.0), (8.0, 0.0), (8.0, 4.0), (0.0, 4.0)]);
        let mut p = params(&mp);
        p.height = 0.0;
        p.angle = std::f64::consts::FRAC_PI_4;

        let roof = GabledRoofBuilder.build(&p).unwrap();
        // Half span 2 at 45 degrees
        assert_relative_eq!(roof.facade_height_override.unwrap(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(roof.mesh.bounds().min.z, 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_declines_l_shape() {
        let mp = footprint(&[(0.0, 0.0), (2.0, 0.0), (2.0, 1.0), (1.0, 1.0), (1.0, 2.0), (0.0, 2.0)]);
        assert!(GabledRoofBuilder.build(&params(&mp)).is_none());
    }
}
