//! Error types for configuration operations.
//!
//! This module defines the error types that can occur during configuration
//! loading, parsing, validation, and API key resolution.

use std::path::PathBuf;

/// Errors that can occur during configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON5 configuration.
    #[error("failed to parse config: {0}")]
    ParseJson5(#[from] serde_json5::Error),

    /// A snapshot batch is misconfigured.
    #[error("invalid snapshot batch '{name}': {reason}")]
    InvalidBatch {
        /// The batch name as configured.
        name: String,
        /// The reason the batch is invalid.
        reason: String,
    },

    /// The fetch settings are invalid.
    #[error("invalid fetch settings: {reason}")]
    InvalidFetch {
        /// The reason the settings are invalid.
        reason: String,
    },

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,

    /// No API key was found in any source.
    #[error("missing GitHub API key (attempted {key_file}, ${env_var}, and user prompt)")]
    MissingToken {
        /// The key file that was checked.
        key_file: String,
        /// The environment variable that was checked.
        env_var: String,
    },
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
