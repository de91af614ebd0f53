// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extruded building assembly
//!
//! [`ExtrudedGeometryBuilder`] combines wall extrusion and a roof strategy for
//! one building footprint and packs the result, with per-vertex colour,
//! texture id and the feature id, into render buffers.
//!
//! A typical build runs the roof first, because the roof decides how tall the
//! facade must be and whether gables need closing:
//!
//! ```
//! use tile3d_geometry::{
//!     ExtrudedGeometryBuilder, FeatureReference, Point2, RingType, RoofOrientation, RoofRequest,
//!     RoofType, WallsRequest,
//! };
//!
//! let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(1));
//! builder.add_ring(
//!     RingType::Outer,
//!     vec![
//!         Point2::new(0.0, 0.0),
//!         Point2::new(8.0, 0.0),
//!         Point2::new(8.0, 5.0),
//!         Point2::new(0.0, 5.0),
//!     ],
//! );
//!
//! let roof = builder.add_roof(RoofRequest {
//!     roof_type: RoofType::Gabled,
//!     building_height: 9.0,
//!     min_height: 0.0,
//!     height: 3.0,
//!     direction: 0.0,
//!     angle: 0.0,
//!     orientation: RoofOrientation::None,
//!     color: 0x884422,
//!     texture_id: 2,
//! });
//!
//! builder.add_walls(WallsRequest {
//!     min_height: 0.0,
//!     height: roof.facade_height_override.unwrap_or(6.0),
//!     skirt: roof.skirt.as_ref(),
//!     levels: 2,
//!     window_width: 2.5,
//!     color: 0xeeeeee,
//!     texture_id: 1,
//! });
//!
//! let geometry = builder.geometry();
//! assert!(geometry.check_invariants());
//! ```

use crate::aabb::BoundingBox;
use crate::feature::FeatureReference;
use crate::mesh::Mesh;
use crate::ring::{Multipolygon, Ring, RingType};
use crate::roofs::{
    build_roof_safe, FlatRoofBuilder, RoofOrientation, RoofParams, RoofSkirt, RoofStrategy,
    RoofType,
};
use crate::walls::{build_walls, HeightProfile, WallParams};
use nalgebra::Point2;

/// Colour components stored per vertex (r, g, b)
pub const COLOR_COMPONENTS: usize = 3;

/// Expand `0xRRGGBB` into its byte components
#[inline]
pub fn color_to_components(color: u32) -> [u8; COLOR_COMPONENTS] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

/// Wall pass input
#[derive(Debug, Clone, Copy)]
pub struct WallsRequest<'a> {
    /// Bottom of the facade; above zero the building gets an underside
    pub min_height: f64,
    /// Top of the facade
    pub height: f64,
    /// Roof skirt to close above the facade
    pub skirt: Option<&'a RoofSkirt>,
    pub levels: u32,
    pub window_width: f64,
    pub color: u32,
    pub texture_id: u8,
}

/// Roof pass input
#[derive(Debug, Clone, Copy)]
pub struct RoofRequest {
    pub roof_type: RoofType,
    pub building_height: f64,
    pub min_height: f64,
    pub height: f64,
    pub direction: f64,
    pub angle: f64,
    pub orientation: RoofOrientation,
    pub color: u32,
    pub texture_id: u8,
}

/// What the wall pass needs to know about the roof that was built
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoofOutcome {
    pub skirt: Option<RoofSkirt>,
    pub facade_height_override: Option<f64>,
}

/// How roofs are tinted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoofPaint {
    /// Use the colour of the roof request
    #[default]
    Supplied,
    /// Ignore the requested colour and give every roof call its own
    /// pseudo-random tint, derived from the feature id and call index so that
    /// rebuilding a building reproduces it. Useful to tell roof pieces apart.
    DebugTint,
}

/// Geometry tag of the finished artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Extruded,
}

impl GeometryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extruded => "extruded",
        }
    }
}

/// Finished, render-ready building mesh
#[derive(Debug, Clone, PartialEq)]
pub struct ExtrudedGeometry {
    pub kind: GeometryKind,
    pub bounding_box: BoundingBox,
    pub position_buffer: Vec<f32>,
    pub normal_buffer: Vec<f32>,
    pub uv_buffer: Vec<f32>,
    pub texture_id_buffer: Vec<u8>,
    pub color_buffer: Vec<u8>,
    pub id_buffer: [u32; 2],
}

impl ExtrudedGeometry {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.position_buffer.len() / 3
    }

    /// Check that all per-vertex buffers describe the same vertices
    pub fn check_invariants(&self) -> bool {
        let vertices = self.vertex_count();
        self.position_buffer.len() % 3 == 0
            && self.normal_buffer.len() == self.position_buffer.len()
            && self.uv_buffer.len() * 3 == self.position_buffer.len() * 2
            && self.color_buffer.len() == vertices * COLOR_COMPONENTS
            && self.texture_id_buffer.len() == vertices
    }
}

#[derive(Debug, Clone, Default)]
struct AttributeArrays {
    position: Vec<f64>,
    normal: Vec<f64>,
    uv: Vec<f64>,
    texture_id: Vec<u8>,
    color: Vec<u8>,
}

/// Builds one finished mesh (walls and roof) for one building footprint.
///
/// The builder is an exclusively owned accumulator: it only appends, and its
/// buffers are exposed only through [`ExtrudedGeometryBuilder::geometry`].
#[derive(Debug, Clone)]
pub struct ExtrudedGeometryBuilder {
    feature: FeatureReference,
    arrays: AttributeArrays,
    multipolygon: Multipolygon,
    bounding_box: BoundingBox,
    roof_paint: RoofPaint,
    roof_calls: u32,
}

impl ExtrudedGeometryBuilder {
    pub fn new(feature: FeatureReference) -> Self {
        Self {
            feature,
            arrays: AttributeArrays::default(),
            multipolygon: Multipolygon::new(),
            bounding_box: BoundingBox::new(),
            roof_paint: RoofPaint::default(),
            roof_calls: 0,
        }
    }

    pub fn with_roof_paint(mut self, roof_paint: RoofPaint) -> Self {
        self.roof_paint = roof_paint;
        self
    }

    /// Add a footprint ring. Degenerate rings are accepted; they end up as
    /// degenerate walls and a rejected (hence flat) roof.
    pub fn add_ring(&mut self, ring_type: RingType, nodes: Vec<Point2<f64>>) {
        self.multipolygon.add_ring(Ring::new(ring_type, nodes));
    }

    /// Extrude facades for every ring, close the roof skirt and, for raised
    /// buildings, the underside.
    pub fn add_walls(&mut self, request: WallsRequest<'_>) {
        if let Some(skirt) = request.skirt {
            for polyline in skirt {
                let vertices: Vec<Point2<f64>> = polyline.iter().map(|p| p.position).collect();
                let heights: Vec<f64> = polyline.iter().map(|p| p.height).collect();

                let walls = build_walls(&WallParams {
                    vertices: &vertices,
                    closed: false,
                    min_height: HeightProfile::Uniform(request.height),
                    height: HeightProfile::PerVertex(heights),
                    levels: request.levels,
                    window_width: request.window_width,
                });
                self.add_and_paint_geometry(&walls, request.color, request.texture_id);
            }
        }

        let mut facades = Vec::with_capacity(self.multipolygon.rings().len());
        for ring in self.multipolygon.rings() {
            facades.push(build_walls(&WallParams {
                vertices: ring.nodes(),
                closed: true,
                min_height: HeightProfile::Uniform(request.min_height),
                height: HeightProfile::Uniform(request.height),
                levels: request.levels,
                window_width: request.window_width,
            }));
        }
        for walls in &facades {
            self.add_and_paint_geometry(walls, request.color, request.texture_id);
        }

        if request.min_height > 0.0 {
            let underside = FlatRoofBuilder::build_flat(&RoofParams {
                multipolygon: &self.multipolygon,
                building_height: request.min_height,
                min_height: request.min_height,
                height: 0.0,
                flip: true,
                direction: 0.0,
                angle: 0.0,
                orientation: RoofOrientation::None,
            });
            self.add_and_paint_geometry(&underside.mesh, request.color, request.texture_id);
        }
    }

    /// Build the roof with the strategy selected by the roof type, falling back
    /// to a flat roof when it does not fit or fails validation.
    pub fn add_roof(&mut self, request: RoofRequest) -> RoofOutcome {
        let strategy = RoofStrategy::select(request.roof_type, request.orientation);
        let params = RoofParams {
            multipolygon: &self.multipolygon,
            building_height: request.building_height,
            min_height: request.min_height,
            height: request.height,
            flip: false,
            direction: request.direction,
            angle: request.angle,
            orientation: request.orientation,
        };

        tracing::trace!(strategy = strategy.name(), feature = ?self.feature, "Building roof");
        let roof = build_roof_safe(&strategy, &params);

        let color = match self.roof_paint {
            RoofPaint::Supplied => request.color,
            RoofPaint::DebugTint => debug_tint(&self.feature, self.roof_calls),
        };
        self.roof_calls += 1;
        self.add_and_paint_geometry(&roof.mesh, color, request.texture_id);

        RoofOutcome {
            skirt: if roof.add_skirt { roof.skirt } else { None },
            facade_height_override: roof.facade_height_override,
        }
    }

    fn add_and_paint_geometry(&mut self, mesh: &Mesh, color: u32, texture_id: u8) {
        self.arrays.position.extend_from_slice(&mesh.position);
        self.arrays.normal.extend_from_slice(&mesh.normal);
        self.arrays.uv.extend_from_slice(&mesh.uv);

        let vertex_count = mesh.vertex_count();
        let components = color_to_components(color);
        self.arrays.color.reserve(vertex_count * COLOR_COMPONENTS);
        self.arrays.texture_id.reserve(vertex_count);
        for _ in 0..vertex_count {
            self.arrays.color.extend_from_slice(&components);
            self.arrays.texture_id.push(texture_id);
        }

        // Bounds must hold the positions as they are packed
        for point in mesh.points() {
            self.bounding_box.include_point(&point.map(|c| c as f32 as f64));
        }
    }

    /// Pack everything appended so far into render buffers.
    ///
    /// Calling this again without further appends yields identical buffers.
    pub fn geometry(&self) -> ExtrudedGeometry {
        ExtrudedGeometry {
            kind: GeometryKind::Extruded,
            bounding_box: self.bounding_box,
            position_buffer: to_f32(&self.arrays.position),
            normal_buffer: to_f32(&self.arrays.normal),
            uv_buffer: to_f32(&self.arrays.uv),
            texture_id_buffer: self.arrays.texture_id.clone(),
            color_buffer: self.arrays.color.clone(),
            id_buffer: self.feature.id_buffer(),
        }
    }
}

#[inline]
fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|&v| v as f32).collect()
}

/// splitmix64 finalizer over feature id and call index
fn debug_tint(feature: &FeatureReference, call: u32) -> u32 {
    let mut z = feature
        .id
        .wrapping_add((call as u64) << 32)
        .wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    ((z ^ (z >> 31)) & 0x00ff_ffff) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureKind;
    use nalgebra::Point3;

    fn square(size: f64) -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    fn walls(min_height: f64, height: f64) -> WallsRequest<'static> {
        WallsRequest {
            min_height,
            height,
            skirt: None,
            levels: 1,
            window_width: 1.0,
            color: 0xffffff,
            texture_id: 0,
        }
    }

    fn roof(roof_type: RoofType, building_height: f64, height: f64) -> RoofRequest {
        RoofRequest {
            roof_type,
            building_height,
            min_height: 0.0,
            height,
            direction: 0.0,
            angle: 0.0,
            orientation: RoofOrientation::None,
            color: 0x102030,
            texture_id: 5,
        }
    }

    #[test]
    fn test_color_to_components() {
        assert_eq!(color_to_components(0x102030), [0x10, 0x20, 0x30]);
        assert_eq!(color_to_components(0xffffff), [255, 255, 255]);
    }

    #[test]
    fn test_unit_square_flat_building() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(1));
        builder.add_ring(RingType::Outer, square(1.0));
        builder.add_walls(walls(0.0, 3.0));
        builder.add_roof(roof(RoofType::Flat, 3.0, 0.0));

        let geometry = builder.geometry();
        assert_eq!(geometry.kind.as_str(), "extruded");
        assert_eq!(geometry.vertex_count(), 4 * 6 + 2 * 3);
        assert!(geometry.check_invariants());
        assert_eq!(geometry.bounding_box.min.z, 0.0);
        assert_eq!(geometry.bounding_box.max.z, 3.0);
    }

    #[test]
    fn test_roof_uses_supplied_color_and_texture() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(1));
        builder.add_ring(RingType::Outer, square(1.0));
        builder.add_walls(walls(0.0, 3.0));
        builder.add_roof(roof(RoofType::Flat, 3.0, 0.0));

        let geometry = builder.geometry();
        let roof_start = 24;
        assert_eq!(&geometry.color_buffer[..3], &[255, 255, 255]);
        assert_eq!(&geometry.color_buffer[roof_start * 3..roof_start * 3 + 3], &[0x10, 0x20, 0x30]);
        assert_eq!(geometry.texture_id_buffer[0], 0);
        assert_eq!(geometry.texture_id_buffer[roof_start], 5);
    }

    #[test]
    fn test_debug_tint_is_reproducible() {
        let build = || {
            let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(77))
                .with_roof_paint(RoofPaint::DebugTint);
            builder.add_ring(RingType::Outer, square(1.0));
            builder.add_roof(roof(RoofType::Flat, 3.0, 0.0));
            builder.geometry()
        };
        let first = build();
        assert_eq!(first, build());
        assert_eq!(
            &first.color_buffer[..3],
            &color_to_components(debug_tint(&FeatureReference::way(77), 0))
        );
    }

    #[test]
    fn test_raised_building_gets_underside() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(1));
        builder.add_ring(RingType::Outer, square(2.0));
        builder.add_walls(walls(4.0, 6.0));

        let geometry = builder.geometry();
        assert_eq!(geometry.vertex_count(), 4 * 2 * 6 + 2 * 3);
        assert_eq!(geometry.bounding_box.min.z, 4.0);

        // Underside is appended last and faces down
        let normals = &geometry.normal_buffer[geometry.normal_buffer.len() - 6 * 3..];
        for n in normals.chunks_exact(3) {
            assert_eq!(n[2], -1.0);
        }
    }

    #[test]
    fn test_walls_cover_holes() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::relation(3));
        builder.add_ring(RingType::Outer, square(10.0));
        builder.add_ring(
            RingType::Inner,
            square(2.0).into_iter().map(|p| Point2::new(p.x + 4.0, p.y + 4.0)).collect(),
        );
        builder.add_walls(WallsRequest {
            window_width: 0.0,
            ..walls(0.0, 3.0)
        });

        assert_eq!(builder.geometry().vertex_count(), 8 * 6);
        assert_eq!(builder.geometry().id_buffer, [3, 1 << 19]);
    }

    #[test]
    fn test_gabled_skirt_round_trip() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(9));
        builder.add_ring(RingType::Outer, vec![
            Point2::new(0.0, 0.0),
            Point2::new(8.0, 0.0),
            Point2::new(8.0, 4.0),
            Point2::new(0.0, 4.0),
        ]);
        let outcome = builder.add_roof(roof(RoofType::Gabled, 9.0, 3.0));
        let skirt = outcome.skirt.as_ref().expect("gabled roofs close their gables");
        assert_eq!(skirt.len(), 2);

        builder.add_walls(WallsRequest {
            skirt: Some(skirt),
            window_width: 0.0,
            ..walls(0.0, 6.0)
        });

        let geometry = builder.geometry();
        assert!(geometry.check_invariants());
        // roof 12 + two gables of two segments + four facades
        assert_eq!(geometry.vertex_count(), 12 + 2 * 2 * 6 + 4 * 6);
        assert_eq!(geometry.bounding_box.max.z, 9.0);
    }

    #[test]
    fn test_flat_roof_skirt_is_not_reported() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(1));
        builder.add_ring(RingType::Outer, square(1.0));
        assert_eq!(builder.add_roof(roof(RoofType::Flat, 3.0, 0.0)), RoofOutcome::default());
    }

    #[test]
    fn test_geometry_is_idempotent() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(1));
        builder.add_ring(RingType::Outer, square(3.0));
        builder.add_roof(roof(RoofType::Hipped, 5.0, 2.0));
        builder.add_walls(walls(0.0, 3.0));

        let first = builder.geometry();
        let second = builder.geometry();
        assert_eq!(first, second);
        let bits = |g: &ExtrudedGeometry| g.position_buffer.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first), bits(&second));
    }

    #[test]
    fn test_bounding_box_contains_every_vertex() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::new(FeatureKind::Node, 1));
        builder.add_ring(RingType::Outer, square(5.0));
        builder.add_walls(walls(1.0, 4.0));
        let before = builder.geometry().bounding_box;
        builder.add_roof(roof(RoofType::Pyramidal, 7.0, 3.0));

        let geometry = builder.geometry();
        assert!(geometry.bounding_box.encloses(&before));
        for p in geometry.position_buffer.chunks_exact(3) {
            let point = Point3::new(p[0] as f64, p[1] as f64, p[2] as f64);
            assert!(geometry.bounding_box.contains(&point));
        }
        assert_eq!(geometry.id_buffer, [0, 0]);
    }

    #[test]
    fn test_bounding_box_holds_packed_positions() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(1));
        builder.add_ring(
            RingType::Outer,
            vec![
                Point2::new(0.1, 0.1),
                Point2::new(0.7, 0.1),
                Point2::new(0.7, 0.3),
                Point2::new(0.1, 0.3),
            ],
        );
        builder.add_walls(WallsRequest {
            window_width: 0.1,
            ..walls(0.0, 3.3)
        });
        builder.add_roof(roof(RoofType::Pyramidal, 4.7, 1.4));

        let geometry = builder.geometry();
        let bbox = geometry.bounding_box;
        for p in geometry.position_buffer.chunks_exact(3) {
            let point = Point3::new(p[0] as f64, p[1] as f64, p[2] as f64);
            assert!(bbox.contains(&point), "{point:?} outside {bbox:?}");
        }
        assert_eq!(bbox.max.z, 4.7f32 as f64);
    }

    #[test]
    fn test_degenerate_ring_is_tolerated() {
        let mut builder = ExtrudedGeometryBuilder::new(FeatureReference::way(1));
        builder.add_ring(RingType::Outer, vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)]);
        builder.add_walls(walls(0.0, 3.0));
        let outcome = builder.add_roof(roof(RoofType::Gabled, 3.0, 1.0));

        assert!(outcome.skirt.is_none());
        assert!(builder.geometry().check_invariants());
    }
}
