// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scheduler configuration loaded from environment variables.

use std::path::PathBuf;

/// How often a failing tile is put back in the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    /// Maximum number of failed attempts before the request is rejected.
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        Self { max_attempts: None }
    }

    pub fn limited(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    /// Whether a request that has failed `attempts` times may run again.
    #[inline]
    pub fn allows_retry(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Number of tiles built concurrently.
    pub workers: usize,
    /// Retry behaviour for failed dispatches.
    pub retry: RetryPolicy,
    /// Directory holding `{x}_{y}.json` tile files.
    pub data_dir: PathBuf,
}

impl SchedulerConfig {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            retry: RetryPolicy::unbounded(),
            data_dir: PathBuf::from("./tiles"),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            workers: std::env::var("TILE_WORKERS")
                .unwrap_or_else(|_| num_cpus::get().to_string())
                .parse()
                .unwrap_or_else(|_| num_cpus::get())
                .max(1),
            retry: match std::env::var("TILE_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse::<u32>().ok())
            {
                Some(0) | None => RetryPolicy::unbounded(),
                Some(max) => RetryPolicy::limited(max),
            },
            data_dir: std::env::var("TILE_DATA_DIR")
                .unwrap_or_else(|_| "./tiles".into())
                .into(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_always_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy, RetryPolicy::unbounded());
        assert!(policy.allows_retry(u32::MAX));
    }

    #[test]
    fn test_limited_retries() {
        let policy = RetryPolicy::limited(2);
        assert!(policy.allows_retry(1));
        assert!(!policy.allows_retry(2));
        assert_eq!(RetryPolicy::limited(0).max_attempts, Some(1));
    }

    #[test]
    fn test_new_clamps_workers() {
        let config = SchedulerConfig::new(0);
        assert_eq!(config.workers, 1);
        assert_eq!(config.retry, RetryPolicy::unbounded());
    }
}
