//! Error types for the history-protocol crate.
//!
//! This module defines the errors that can occur while replaying issue
//! history and rendering the output modules.

use thiserror::Error;

/// Errors that can occur during protocol operations.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The replay step size was zero.
    #[error("invalid snapshot rate: {0} hours (must be at least 1)")]
    InvalidRate(u32),

    /// A checkpoint fell outside the range chrono can represent.
    #[error("snapshot checkpoint is out of the representable time range")]
    TimestampOutOfRange,

    /// An output module name is not a valid JavaScript identifier.
    #[error("invalid module name '{0}': expected a JavaScript identifier")]
    InvalidModuleName(String),

    /// Failed to serialize output data to JSON.
    #[error("failed to serialize to JSON: {0}")]
    SerializationFailed(#[source] serde_json::Error),
}

/// A specialized Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
