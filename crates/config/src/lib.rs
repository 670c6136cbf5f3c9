//! Configuration management for issue-history.
//!
//! This crate handles loading and validating configuration, and
//! resolving the GitHub API key.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`config`]: Core configuration struct and loading logic
//! - [`batch`]: Snapshot batch definitions and their defaults
//! - [`fetch`]: Worker pool widths and the per-repository deadline
//! - [`auth`]: API key resolution (key file, environment, prompt)
//! - [`persistence`]: Config file discovery and reading
//! - [`error`]: Error types for configuration operations
//!
//! # Configuration File
//!
//! ```json5
//! {
//!   organization: "conda",
//!   output_dir: "snapshots",
//!   // stop after 50 issues per repository
//!   limit: 50,
//!   fetch: { cache_workers: 10, live_workers: 1, timeout_secs: 3600 },
//!   batches: [
//!     { name: "recent", rate: 1, trim: 72 },
//!     { name: "alltime", rate: 72 },
//!   ],
//! }
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use history_config::Config;
//!
//! # fn example() -> history_config::Result<()> {
//! let config = Config::load()?;
//! for batch in &config.batches {
//!     println!("{}: every {}h", batch.name, batch.rate);
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod batch;
pub mod config;
pub mod error;
pub mod fetch;
pub mod persistence;

// Re-export primary types at crate root for convenience
pub use batch::BatchConfig;
pub use config::Config;
pub use error::{ConfigError, Result};
pub use fetch::FetchConfig;
