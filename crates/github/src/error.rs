//! Error types for GitHub and cache operations.
//!
//! This module defines the error types that can occur while listing
//! repositories, fetching issues, reading and writing cache artifacts, and
//! running the fetch worker pools.

use std::path::PathBuf;
use std::time::Duration;

use history_protocol::RepoId;

/// Errors that can occur during GitHub and cache operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error occurred while calling the GitHub API.
    #[error("GitHub API error: {0}")]
    Api(#[from] octocrab::Error),

    /// Token validation failed.
    ///
    /// This occurs when a provided token is invalid, expired, or lacks
    /// the necessary permissions.
    #[error("token validation failed: {reason}")]
    TokenValidation {
        /// A description of why validation failed.
        reason: String,
    },

    /// An I/O error occurred during cache operations.
    #[error("I/O error during cache operation: {0}")]
    Io(#[from] std::io::Error),

    /// A cache artifact could not be serialized.
    #[error("failed to serialize cache artifact {path}: {source}")]
    CacheSerialize {
        /// The artifact being written.
        path: PathBuf,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Fetching a repository took longer than the configured deadline.
    #[error("fetching {repo} timed out after {} seconds", after.as_secs())]
    Timeout {
        /// The repository being fetched.
        repo: RepoId,
        /// The deadline that expired.
        after: Duration,
    },

    /// The live lane stopped accepting repositories before the run ended.
    #[error("live fetch lane closed before {repo} could be queued")]
    LaneClosed {
        /// The repository that could not be queued.
        repo: RepoId,
    },

    /// A fetch worker panicked or was cancelled.
    #[error("fetch worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// A specialized Result type for GitHub and cache operations.
pub type Result<T> = std::result::Result<T, Error>;
