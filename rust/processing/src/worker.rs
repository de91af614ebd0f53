// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tile workers: the execution contexts the scheduler dispatches tiles to.

use crate::building::BuildingFeature;
use crate::config::SchedulerConfig;
use crate::error::WorkerError;
use futures::future::BoxFuture;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tile3d_geometry::{ExtrudedGeometry, RoofPaint};

/// Produces the geometry of one tile.
///
/// `start` must return immediately; the work happens when the returned future
/// is polled. Failure is reported through the future's `Err`, never by
/// panicking.
pub trait TileWorker: Send + Sync + 'static {
    type Output: Send + 'static;

    fn start(&self, x: i32, y: i32) -> BoxFuture<'static, Result<Self::Output, WorkerError>>;
}

/// Where building features of a tile come from. Called on a blocking thread.
pub trait TileSource: Send + Sync + 'static {
    fn load(&self, x: i32, y: i32) -> Result<Vec<BuildingFeature>, WorkerError>;
}

/// On-disk tile file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TileFile {
    #[serde(default)]
    pub buildings: Vec<BuildingFeature>,
}

/// Reads `{root}/{x}_{y}.json`. A missing file is an empty tile.
#[derive(Debug, Clone)]
pub struct DirectoryTileSource {
    root: PathBuf,
}

impl DirectoryTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tile_path(&self, x: i32, y: i32) -> PathBuf {
        self.root.join(format!("{x}_{y}.json"))
    }
}

impl TileSource for DirectoryTileSource {
    fn load(&self, x: i32, y: i32) -> Result<Vec<BuildingFeature>, WorkerError> {
        let path = self.tile_path(x, y);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(x, y, path = %path.display(), "No tile file, tile is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        let file: TileFile = serde_json::from_str(&content)?;
        Ok(file.buildings)
    }
}

/// Static geometry of one tile
#[derive(Debug, Clone)]
pub struct TileGeometry {
    pub x: i32,
    pub y: i32,
    pub buildings: Vec<ExtrudedGeometry>,
}

impl TileGeometry {
    pub fn vertex_count(&self) -> usize {
        self.buildings.iter().map(ExtrudedGeometry::vertex_count).sum()
    }
}

/// Loads a tile's buildings and assembles them in parallel.
pub struct AssemblerWorker<S> {
    source: Arc<S>,
    roof_paint: RoofPaint,
}

impl<S: TileSource> AssemblerWorker<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            roof_paint: RoofPaint::Supplied,
        }
    }

    pub fn with_roof_paint(mut self, roof_paint: RoofPaint) -> Self {
        self.roof_paint = roof_paint;
        self
    }
}

impl<S> Clone for AssemblerWorker<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            roof_paint: self.roof_paint,
        }
    }
}

impl<S: TileSource> TileWorker for AssemblerWorker<S> {
    type Output = TileGeometry;

    fn start(&self, x: i32, y: i32) -> BoxFuture<'static, Result<TileGeometry, WorkerError>> {
        let source = Arc::clone(&self.source);
        let roof_paint = self.roof_paint;

        Box::pin(async move {
            tokio::task::spawn_blocking(move || -> Result<TileGeometry, WorkerError> {
                let features = source.load(x, y)?;
                let buildings: Vec<ExtrudedGeometry> = features
                    .par_iter()
                    .map(|feature| feature.assemble_with(roof_paint))
                    .collect();

                tracing::debug!(x, y, buildings = buildings.len(), "Tile assembled");
                Ok(TileGeometry { x, y, buildings })
            })
            .await?
        })
    }
}
