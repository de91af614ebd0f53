//! Tile3D Building Geometry
//!
//! Extruded building meshes for map tiles: footprint rings are extruded into
//! facades, capped with a roof chosen by roof type (falling back to a flat
//! roof when a shape does not fit), and packed into render-ready buffers.
//! Triangulation uses earcutr, math uses nalgebra.

pub mod aabb;
pub mod builder;
pub mod error;
pub mod feature;
pub mod mesh;
pub mod ring;
pub mod roofs;
pub mod triangulation;
pub mod walls;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector2, Vector3};

pub use aabb::BoundingBox;
pub use builder::{
    color_to_components, ExtrudedGeometry, ExtrudedGeometryBuilder, GeometryKind, RoofOutcome,
    RoofPaint, RoofRequest, WallsRequest, COLOR_COMPONENTS,
};
pub use error::{Error, Result};
pub use feature::{FeatureKind, FeatureReference};
pub use mesh::Mesh;
pub use ring::{Multipolygon, Polygon, Ring, RingType};
pub use roofs::{
    build_roof_safe, RoofBuilder, RoofGeometry, RoofGeometryValidator, RoofOrientation,
    RoofParams, RoofSkirt, RoofStrategy, RoofType, SkirtPoint,
};
pub use triangulation::{triangulate_multipolygon, Triangulation};
pub use walls::{build_walls, HeightProfile, WallParams};
