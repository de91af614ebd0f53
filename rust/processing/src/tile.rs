// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tile handles as seen by the scheduler.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// What the scheduler needs to know about a tile.
///
/// Handles are shared with the map view, which may dispose a tile or move the
/// camera while requests for it are queued.
pub trait TileHandle: Send + Sync + 'static {
    fn x(&self) -> i32;
    fn y(&self) -> i32;
    fn is_disposed(&self) -> bool;
    fn distance_to_camera(&self) -> f64;
}

/// Grid tile with interior-mutable visibility state.
#[derive(Debug)]
pub struct Tile {
    x: i32,
    y: i32,
    disposed: AtomicBool,
    distance: AtomicU64,
}

impl Tile {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            disposed: AtomicBool::new(false),
            distance: AtomicU64::new(f64::INFINITY.to_bits()),
        }
    }

    pub fn with_distance(x: i32, y: i32, distance: f64) -> Self {
        let tile = Self::new(x, y);
        tile.set_distance_to_camera(distance);
        tile
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    pub fn set_distance_to_camera(&self, distance: f64) {
        self.distance.store(distance.to_bits(), Ordering::Relaxed);
    }
}

impl TileHandle for Tile {
    #[inline]
    fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    #[inline]
    fn distance_to_camera(&self) -> f64 {
        f64::from_bits(self.distance.load(Ordering::Relaxed))
    }
}
