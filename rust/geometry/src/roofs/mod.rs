// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof strategies
//!
//! A roof is built by one member of a closed family of strategies, selected
//! from the roof type tag. Strategies read the footprint, never mutate it, and
//! may decline a footprint they cannot handle by returning `None`.
//! [`build_roof_safe`] turns "declined" and "built something broken" into a
//! flat roof so a renderable roof always comes out.

mod flat;
mod footprint;
mod gabled;
mod hipped;
mod mansard;
mod pyramidal;
mod skillion;
mod validator;

pub use flat::FlatRoofBuilder;
pub use gabled::{GabledRoofBuilder, OrientedGabledRoofBuilder};
pub use hipped::HippedRoofBuilder;
pub use mansard::{MansardRoofBuilder, QuadrupleSaltboxRoofBuilder};
pub use pyramidal::PyramidalRoofBuilder;
pub use skillion::SkillionRoofBuilder;
pub use validator::RoofGeometryValidator;

use crate::mesh::Mesh;
use crate::ring::{Multipolygon, Ring};
use crate::triangulation::cross;
use nalgebra::{Point2, Point3};

/// Roof shape tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoofType {
    #[default]
    Flat,
    Gabled,
    Hipped,
    Pyramidal,
    Dome,
    Skillion,
    Mansard,
    QuadrupleSaltbox,
}

impl RoofType {
    /// Parse a `roof:shape` tag value. Unknown shapes are flat.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "gabled" => Self::Gabled,
            "hipped" => Self::Hipped,
            "pyramidal" => Self::Pyramidal,
            "dome" => Self::Dome,
            "skillion" => Self::Skillion,
            "mansard" => Self::Mansard,
            "quadruple_saltbox" => Self::QuadrupleSaltbox,
            _ => Self::Flat,
        }
    }
}

/// Ridge orientation relative to the longest side of the footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RoofOrientation {
    #[default]
    None,
    Along,
    Across,
}

impl RoofOrientation {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "along" => Self::Along,
            "across" => Self::Across,
            _ => Self::None,
        }
    }
}

/// Input of a single roof build
#[derive(Debug, Clone, Copy)]
pub struct RoofParams<'a> {
    pub multipolygon: &'a Multipolygon,
    /// Top of the building (roof apex)
    pub building_height: f64,
    /// Bottom of the building
    pub min_height: f64,
    /// Roof height; zero lets pitched roofs derive it from `angle`
    pub height: f64,
    /// Face downwards (underside caps)
    pub flip: bool,
    /// Direction the roof slope faces, radians
    pub direction: f64,
    /// Pitch, radians
    pub angle: f64,
    pub orientation: RoofOrientation,
}

impl RoofParams<'_> {
    /// Resolve the roof height, deriving it from the pitch when none was given.
    ///
    /// Returns the height and whether it was derived.
    pub(crate) fn resolve_height(&self, half_span: f64) -> (f64, bool) {
        if self.height <= 0.0 && self.angle > 0.0 && half_span > 0.0 {
            (self.angle.tan() * half_span, true)
        } else {
            (self.height.max(0.0), false)
        }
    }
}

/// One vertex of a skirt polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkirtPoint {
    pub position: Point2<f64>,
    pub height: f64,
}

impl SkirtPoint {
    pub fn new(position: Point2<f64>, height: f64) -> Self {
        Self { position, height }
    }
}

/// Lower roof boundary that does not sit flat on the facade
pub type RoofSkirt = Vec<Vec<SkirtPoint>>;

/// Output of a roof strategy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoofGeometry {
    pub mesh: Mesh,
    pub skirt: Option<RoofSkirt>,
    /// Facade height the walls should use instead of the caller's guess
    pub facade_height_override: Option<f64>,
    /// Ask the caller to close the skirt with extra walls
    pub add_skirt: bool,
}

impl RoofGeometry {
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            ..Default::default()
        }
    }

    pub fn with_skirt(mut self, skirt: RoofSkirt) -> Self {
        self.skirt = Some(skirt);
        self.add_skirt = true;
        self
    }

    pub fn with_facade_height(mut self, facade_height: Option<f64>) -> Self {
        self.facade_height_override = facade_height;
        self
    }
}

/// Roof construction strategy
pub trait RoofBuilder {
    /// Build a roof, or `None` when this shape does not fit the footprint
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry>;
}

/// The closed set of roof strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoofStrategy {
    Flat,
    Skillion,
    Pyramidal,
    Hipped,
    Gabled,
    OrientedGabled,
    Mansard,
    QuadrupleSaltbox,
}

impl RoofStrategy {
    /// Pick the strategy for a roof type. Gabled roofs with an explicit
    /// orientation use the orientation-aware builder; everything without a
    /// dedicated builder is flat.
    pub fn select(roof_type: RoofType, orientation: RoofOrientation) -> Self {
        match roof_type {
            RoofType::Skillion => Self::Skillion,
            RoofType::Pyramidal => Self::Pyramidal,
            RoofType::Hipped => Self::Hipped,
            RoofType::Gabled => match orientation {
                RoofOrientation::Along | RoofOrientation::Across => Self::OrientedGabled,
                RoofOrientation::None => Self::Gabled,
            },
            RoofType::Mansard => Self::Mansard,
            RoofType::QuadrupleSaltbox => Self::QuadrupleSaltbox,
            RoofType::Flat | RoofType::Dome => Self::Flat,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Skillion => "skillion",
            Self::Pyramidal => "pyramidal",
            Self::Hipped => "hipped",
            Self::Gabled => "gabled",
            Self::OrientedGabled => "oriented_gabled",
            Self::Mansard => "mansard",
            Self::QuadrupleSaltbox => "quadruple_saltbox",
        }
    }
}

impl RoofBuilder for RoofStrategy {
    fn build(&self, params: &RoofParams<'_>) -> Option<RoofGeometry> {
        match self {
            Self::Flat => FlatRoofBuilder.build(params),
            Self::Skillion => SkillionRoofBuilder.build(params),
            Self::Pyramidal => PyramidalRoofBuilder.build(params),
            Self::Hipped => HippedRoofBuilder.build(params),
            Self::Gabled => GabledRoofBuilder.build(params),
            Self::OrientedGabled => OrientedGabledRoofBuilder.build(params),
            Self::Mansard => MansardRoofBuilder.build(params),
            Self::QuadrupleSaltbox => QuadrupleSaltboxRoofBuilder.build(params),
        }
    }
}

/// Build with `builder`, falling back to a flat roof when the strategy
/// declines or the validator rejects its result.
pub fn build_roof_safe(builder: &dyn RoofBuilder, params: &RoofParams<'_>) -> RoofGeometry {
    match builder.build(params) {
        Some(roof) if RoofGeometryValidator::validate(&roof, params.multipolygon) => roof,
        Some(_) => {
            tracing::debug!("Roof rejected by validator, falling back to flat roof");
            FlatRoofBuilder::build_flat(params)
        }
        None => {
            tracing::debug!("Roof strategy declined footprint, falling back to flat roof");
            FlatRoofBuilder::build_flat(params)
        }
    }
}

/// Append a roof triangle with plan-projected texture coordinates
#[inline]
pub(crate) fn push_roof_triangle(mesh: &mut Mesh, points: [Point3<f64>; 3]) {
    let uvs = points.map(|p| Point2::new(p.x, p.y));
    mesh.add_triangle(points, uvs);
}

/// Append a roof quad (a, b, c, d) as two triangles
#[inline]
pub(crate) fn push_roof_quad(mesh: &mut Mesh, points: [Point3<f64>; 4]) {
    let [a, b, c, d] = points;
    push_roof_triangle(mesh, [a, b, c]);
    push_roof_triangle(mesh, [a, c, d]);
}

#[inline]
pub(crate) fn lift(point: &Point2<f64>, z: f64) -> Point3<f64> {
    Point3::new(point.x, point.y, z)
}

/// Shortest distance from the ring centroid to any edge line, or zero when
/// every edge is degenerate. Zero-length edges are skipped.
pub(crate) fn centroid_half_span(ring: &Ring) -> f64 {
    let centroid = ring.centroid();
    let nodes = ring.nodes();
    (0..nodes.len())
        .filter_map(|i| {
            let a = &nodes[i];
            let b = &nodes[(i + 1) % nodes.len()];
            let length = (b - a).norm();
            (length > 1e-9).then(|| cross(a, b, &centroid).abs() / length)
        })
        .reduce(f64::min)
        .unwrap_or(0.0)
}
