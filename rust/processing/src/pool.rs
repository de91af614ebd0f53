// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-size worker pool.
//!
//! "Free" is only a capacity count: a slot is taken when a tile is dispatched
//! and returned when the scheduler observes the worker's completion.

/// Workers addressed by slot index.
#[derive(Debug)]
pub struct WorkerPool<W> {
    workers: Vec<W>,
    free: Vec<usize>,
}

impl<W> WorkerPool<W> {
    /// Build `size` workers (at least one) with `factory(slot)`.
    pub fn new(size: usize, factory: impl FnMut(usize) -> W) -> Self {
        Self::from_workers((0..size.max(1)).map(factory).collect())
    }

    pub fn from_workers(workers: Vec<W>) -> Self {
        // Lowest slot is handed out first
        let free = (0..workers.len()).rev().collect();
        Self { workers, free }
    }

    /// Take a free slot, if any.
    #[inline]
    pub fn acquire(&mut self) -> Option<usize> {
        self.free.pop()
    }

    /// Return a slot taken with [`WorkerPool::acquire`].
    pub fn release(&mut self, slot: usize) {
        if slot < self.workers.len() && !self.free.contains(&slot) {
            self.free.push(slot);
        } else {
            tracing::warn!(slot, "Released a worker slot that was not in use");
        }
    }

    #[inline]
    pub fn worker(&self, slot: usize) -> &W {
        &self.workers[slot]
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn in_use(&self) -> usize {
        self.workers.len() - self.free.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}
