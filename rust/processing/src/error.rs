// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Worker failures and the errors observed by tile requesters.

use thiserror::Error;

/// Failure reported by a worker for one dispatch.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Worker failed: {0}")]
    Failed(String),

    #[error("Tile I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tile parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Join error")]
    Join(#[from] tokio::task::JoinError),
}

/// Why a tile future resolved without geometry.
#[derive(Debug, Error)]
pub enum TileError {
    #[error("Tile {x},{y} failed {attempts} times: {source}")]
    RetriesExhausted {
        x: i32,
        y: i32,
        attempts: u32,
        #[source]
        source: WorkerError,
    },

    #[error("Tile {x},{y} was abandoned before its geometry was built")]
    Abandoned { x: i32, y: i32 },
}
