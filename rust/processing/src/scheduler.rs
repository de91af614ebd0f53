// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nearest-first tile scheduling over a bounded worker pool.
//!
//! The scheduler is driven by the map view: requests are registered with
//! [`TileScheduler::get_tile_objects`] and [`TileScheduler::update`] is called
//! once per frame. Each update
//!
//! 1. applies worker completions that arrived since the last tick,
//! 2. drops queued requests whose tile has been disposed,
//! 3. dispatches the queued tile closest to the camera while a worker is free.
//!
//! A failed dispatch goes back to the front of the queue. Work already handed to
//! a worker is never cancelled: a tile disposed after dispatch still resolves.
//!
//! `update` must be called from within a tokio runtime, since dispatched work
//! runs on spawned tasks.

use crate::config::{RetryPolicy, SchedulerConfig};
use crate::error::{TileError, WorkerError};
use crate::pool::WorkerPool;
use crate::tile::TileHandle;
use crate::worker::TileWorker;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};

type Resolver<O> = oneshot::Sender<Result<O, TileError>>;

/// A queued request for one tile's geometry.
struct TileRequest<T, O> {
    tile: Arc<T>,
    /// Failed dispatches so far
    attempts: u32,
    resolve: Resolver<O>,
}

impl<T: TileHandle, O> TileRequest<T, O> {
    fn abandon(self) {
        let (x, y) = (self.tile.x(), self.tile.y());
        // Requester may already be gone
        let _ = self.resolve.send(Err(TileError::Abandoned { x, y }));
    }
}

/// Worker completion signal, consumed by the coordinator.
enum Completion<T, O> {
    Loaded {
        slot: usize,
    },
    Failed {
        slot: usize,
        request: TileRequest<T, O>,
        error: WorkerError,
    },
}

/// Resolves once with the tile's geometry.
///
/// If the scheduler drops the request without running it (the tile was
/// disposed, or the scheduler itself was dropped) the future resolves with
/// [`TileError::Abandoned`].
#[must_use = "futures do nothing unless polled"]
pub struct TileFuture<O> {
    x: i32,
    y: i32,
    receiver: oneshot::Receiver<Result<O, TileError>>,
}

impl<O> TileFuture<O> {
    pub fn coordinates(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl<O> Future for TileFuture<O> {
    type Output = Result<O, TileError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let (x, y) = (self.x, self.y);
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|result| result.unwrap_or(Err(TileError::Abandoned { x, y })))
    }
}

/// Owns the request queue and the worker pool.
pub struct TileScheduler<T: TileHandle, W: TileWorker> {
    queue: VecDeque<TileRequest<T, W::Output>>,
    pool: WorkerPool<W>,
    retry: RetryPolicy,
    completion_tx: mpsc::UnboundedSender<Completion<T, W::Output>>,
    completion_rx: mpsc::UnboundedReceiver<Completion<T, W::Output>>,
}

impl<T: TileHandle, W: TileWorker> TileScheduler<T, W> {
    pub fn new(pool: WorkerPool<W>, retry: RetryPolicy) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        Self {
            queue: VecDeque::new(),
            pool,
            retry,
            completion_tx,
            completion_rx,
        }
    }

    pub fn from_config(config: &SchedulerConfig, factory: impl FnMut(usize) -> W) -> Self {
        tracing::debug!(workers = config.workers, retry = ?config.retry, "Creating tile scheduler");
        Self::new(WorkerPool::new(config.workers, factory), config.retry)
    }

    /// Queue a request for the tile's geometry.
    ///
    /// Requests are not deduplicated: asking twice builds the tile twice.
    pub fn get_tile_objects(&mut self, tile: Arc<T>) -> TileFuture<W::Output> {
        let (resolve, receiver) = oneshot::channel();
        let (x, y) = (tile.x(), tile.y());

        self.queue.push_back(TileRequest {
            tile,
            attempts: 0,
            resolve,
        });

        TileFuture { x, y, receiver }
    }

    /// Run one scheduling tick. Returns the number of dispatched requests.
    pub fn update(&mut self) -> usize {
        self.drain_completions();
        self.remove_disposed_tiles();

        let mut dispatched = 0;
        while let Some(index) = self.nearest_index() {
            let Some(slot) = self.pool.acquire() else {
                break;
            };
            match self.queue.remove(index) {
                Some(request) => {
                    self.dispatch(slot, request);
                    dispatched += 1;
                }
                None => {
                    self.pool.release(slot);
                    break;
                }
            }
        }

        dispatched
    }

    /// Wait for one worker completion and apply it.
    ///
    /// Returns `false` right away when nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight() == 0 {
            return false;
        }

        match self.completion_rx.recv().await {
            Some(completion) => {
                self.apply_completion(completion);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn in_flight(&self) -> usize {
        self.pool.in_use()
    }

    #[inline]
    pub fn free_workers(&self) -> usize {
        self.pool.free_count()
    }

    /// Queued tiles, front first
    pub fn queued_tiles(&self) -> impl Iterator<Item = &T> + '_ {
        self.queue.iter().map(|request| request.tile.as_ref())
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completion_rx.try_recv() {
            self.apply_completion(completion);
        }
    }

    fn remove_disposed_tiles(&mut self) {
        let queue = std::mem::take(&mut self.queue);
        let before = queue.len();

        for request in queue {
            if request.tile.is_disposed() {
                request.abandon();
            } else {
                self.queue.push_back(request);
            }
        }

        let removed = before - self.queue.len();
        if removed > 0 {
            tracing::debug!(removed, remaining = self.queue.len(), "Dropped disposed tiles from queue");
        }
    }

    /// Closest queued tile; ties go to the request nearest the front.
    fn nearest_index(&self) -> Option<usize> {
        let mut nearest: Option<(usize, f64)> = None;
        for (index, request) in self.queue.iter().enumerate() {
            let distance = request.tile.distance_to_camera();
            match nearest {
                Some((_, best)) if distance.total_cmp(&best).is_ge() => {}
                _ => nearest = Some((index, distance)),
            }
        }
        nearest.map(|(index, _)| index)
    }

    fn dispatch(&mut self, slot: usize, request: TileRequest<T, W::Output>) {
        let (x, y) = (request.tile.x(), request.tile.y());
        tracing::debug!(
            x,
            y,
            slot,
            distance = request.tile.distance_to_camera(),
            attempt = request.attempts + 1,
            "Dispatching tile"
        );

        let work = self.pool.worker(slot).start(x, y);
        let completions = self.completion_tx.clone();

        tokio::spawn(async move {
            let completion = match work.await {
                Ok(output) => {
                    // Requester may have lost interest
                    let _ = request.resolve.send(Ok(output));
                    Completion::Loaded { slot }
                }
                Err(error) => Completion::Failed {
                    slot,
                    request,
                    error,
                },
            };
            let _ = completions.send(completion);
        });
    }

    fn apply_completion(&mut self, completion: Completion<T, W::Output>) {
        match completion {
            Completion::Loaded { slot } => self.pool.release(slot),
            Completion::Failed {
                slot,
                mut request,
                error,
            } => {
                self.pool.release(slot);
                request.attempts += 1;

                let (x, y) = (request.tile.x(), request.tile.y());
                tracing::error!(x, y, attempts = request.attempts, error = %error, "Tile worker failed");

                if self.retry.allows_retry(request.attempts) {
                    self.queue.push_front(request);
                } else {
                    let attempts = request.attempts;
                    tracing::warn!(x, y, attempts, "Giving up on tile");
                    let _ = request.resolve.send(Err(TileError::RetriesExhausted {
                        x,
                        y,
                        attempts,
                        source: error,
                    }));
                }
            }
        }
    }
}

impl<T: TileHandle, W: TileWorker> Drop for TileScheduler<T, W> {
    fn drop(&mut self) {
        if !self.queue.is_empty() {
            tracing::debug!(pending = self.queue.len(), "Tile scheduler dropped with queued requests");
        }
    }
}
