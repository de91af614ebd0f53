// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building features as stored in tile files, and their assembly into meshes.

use serde::{Deserialize, Serialize};
use tile3d_geometry::{
    ExtrudedGeometry, ExtrudedGeometryBuilder, FeatureReference, Point2, RingType, RoofOrientation,
    RoofPaint, RoofRequest, RoofType, WallsRequest,
};

const DEFAULT_FACADE_COLOR: u32 = 0xdddddd;
const DEFAULT_ROOF_COLOR: u32 = 0x999999;
const DEFAULT_WINDOW_WIDTH: f64 = 3.0;

fn default_levels() -> u32 {
    1
}

fn default_window_width() -> f64 {
    DEFAULT_WINDOW_WIDTH
}

fn default_facade_color() -> u32 {
    DEFAULT_FACADE_COLOR
}

/// Footprint ring in tile-local coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRing {
    #[serde(rename = "type")]
    pub ring_type: RingType,
    pub nodes: Vec<[f64; 2]>,
}

impl FeatureRing {
    pub fn points(&self) -> Vec<Point2<f64>> {
        self.nodes.iter().map(|&[x, y]| Point2::new(x, y)).collect()
    }
}

/// Roof attributes of a building
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofSpec {
    #[serde(rename = "type")]
    pub roof_type: RoofType,
    pub height: f64,
    /// Radians
    pub direction: f64,
    /// Radians
    pub angle: f64,
    pub orientation: RoofOrientation,
    pub color: u32,
    pub texture_id: u8,
}

impl Default for RoofSpec {
    fn default() -> Self {
        Self {
            roof_type: RoofType::Flat,
            height: 0.0,
            direction: 0.0,
            angle: 0.0,
            orientation: RoofOrientation::None,
            color: DEFAULT_ROOF_COLOR,
            texture_id: 0,
        }
    }
}

/// One extruded building (or building part)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingFeature {
    pub feature: FeatureReference,
    pub rings: Vec<FeatureRing>,
    /// Top of the building including the roof
    pub height: f64,
    #[serde(default)]
    pub min_height: f64,
    #[serde(default = "default_levels")]
    pub levels: u32,
    #[serde(default = "default_window_width")]
    pub window_width: f64,
    #[serde(default = "default_facade_color")]
    pub color: u32,
    #[serde(default)]
    pub texture_id: u8,
    #[serde(default)]
    pub roof: RoofSpec,
}

impl BuildingFeature {
    /// Roof height limited to the building's own extent
    pub fn roof_height(&self) -> f64 {
        let extent = (self.height - self.min_height).max(0.0);
        self.roof.height.clamp(0.0, extent)
    }

    pub fn assemble(&self) -> ExtrudedGeometry {
        self.assemble_with(RoofPaint::Supplied)
    }

    /// Build the roof first, then size the facade from what the roof reports.
    pub fn assemble_with(&self, roof_paint: RoofPaint) -> ExtrudedGeometry {
        let mut builder = ExtrudedGeometryBuilder::new(self.feature).with_roof_paint(roof_paint);
        for ring in &self.rings {
            builder.add_ring(ring.ring_type, ring.points());
        }

        let roof_height = self.roof_height();
        let roof = builder.add_roof(RoofRequest {
            roof_type: self.roof.roof_type,
            building_height: self.height,
            min_height: self.min_height,
            height: roof_height,
            direction: self.roof.direction,
            angle: self.roof.angle,
            orientation: self.roof.orientation,
            color: self.roof.color,
            texture_id: self.roof.texture_id,
        });

        builder.add_walls(WallsRequest {
            min_height: self.min_height,
            height: roof
                .facade_height_override
                .unwrap_or(self.height - roof_height),
            skirt: roof.skirt.as_ref(),
            levels: self.levels,
            window_width: self.window_width,
            color: self.color,
            texture_id: self.texture_id,
        });

        builder.geometry()
    }
}
