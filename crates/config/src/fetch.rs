//! Fetch concurrency configuration.
//!
//! Repositories with a cache artifact are loaded by a wide worker pool, while
//! repositories that need the GitHub API share a narrow one. GitHub rejects
//! or throttles sessions that issue many concurrent paginated requests, so
//! the live pool defaults to a single worker.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Default number of concurrent cache readers.
pub const DEFAULT_CACHE_WORKERS: usize = 10;

/// Default number of concurrent GitHub fetchers.
pub const DEFAULT_LIVE_WORKERS: usize = 1;

/// Configuration for the fetch worker pools.
///
/// # Examples
///
/// ```
/// use history_config::FetchConfig;
///
/// let config = FetchConfig::default();
/// assert_eq!(config.cache_workers, 10);
/// assert_eq!(config.live_workers, 1);
/// assert!(config.timeout().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Number of repositories loaded from the cache concurrently.
    #[serde(default = "default_cache_workers")]
    pub cache_workers: usize,

    /// Number of repositories fetched from GitHub concurrently.
    #[serde(default = "default_live_workers")]
    pub live_workers: usize,

    /// Deadline for fetching a single repository, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_cache_workers() -> usize {
    DEFAULT_CACHE_WORKERS
}

fn default_live_workers() -> usize {
    DEFAULT_LIVE_WORKERS
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            cache_workers: DEFAULT_CACHE_WORKERS,
            live_workers: DEFAULT_LIVE_WORKERS,
            timeout_secs: None,
        }
    }
}

impl FetchConfig {
    /// Returns the per-repository deadline, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Validates the fetch configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a pool has no workers or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.cache_workers == 0 {
            return Err(ConfigError::InvalidFetch {
                reason: "cache_workers must be at least 1".to_string(),
            });
        }

        if self.live_workers == 0 {
            return Err(ConfigError::InvalidFetch {
                reason: "live_workers must be at least 1".to_string(),
            });
        }

        if self.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidFetch {
                reason: "timeout_secs must be at least 1".to_string(),
            });
        }

        Ok(())
    }
}
