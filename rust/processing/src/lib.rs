// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tile geometry processing
//!
//! Schedules building-geometry work for map tiles over a fixed pool of
//! workers, nearest tile first, and provides the worker that turns a tile's
//! building features into extruded meshes.

pub mod building;
pub mod config;
pub mod error;
pub mod pool;
pub mod scheduler;
pub mod tile;
pub mod worker;

pub use building::{BuildingFeature, FeatureRing, RoofSpec};
pub use config::{RetryPolicy, SchedulerConfig};
pub use error::{TileError, WorkerError};
pub use pool::WorkerPool;
pub use scheduler::{TileFuture, TileScheduler};
pub use tile::{Tile, TileHandle};
pub use worker::{
    AssemblerWorker, DirectoryTileSource, TileFile, TileGeometry, TileSource, TileWorker,
};
