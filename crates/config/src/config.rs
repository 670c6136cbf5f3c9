//! Core configuration struct and loading logic.
//!
//! This module provides the main [`Config`] struct which aggregates all
//! configuration options of a history run.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::batch::{BatchConfig, default_batches, validate_batches};
use crate::error::Result;
use crate::fetch::FetchConfig;
use crate::persistence::{default_cache_dir, find_config_file, read_config_file};

/// Organization crawled when none is configured.
pub const DEFAULT_ORGANIZATION: &str = "conda";

/// Directory output modules are written to when none is configured.
pub const DEFAULT_OUTPUT_DIR: &str = "snapshots";

/// The main configuration struct for a history run.
///
/// # Examples
///
/// ```
/// use history_config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.organization, "conda");
/// assert_eq!(config.batches.len(), 4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// GitHub organization whose repositories are crawled.
    #[serde(default = "default_organization")]
    pub organization: String,

    /// Directory holding the cache artifacts.
    ///
    /// Defaults to the platform cache directory when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Directory the output modules are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of issues fetched per repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Worker pool settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Snapshot batches to produce, in order.
    #[serde(default = "default_batches")]
    pub batches: Vec<BatchConfig>,
}

fn default_organization() -> String {
    DEFAULT_ORGANIZATION.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            organization: default_organization(),
            cache_dir: None,
            output_dir: default_output_dir(),
            limit: None,
            fetch: FetchConfig::default(),
            batches: default_batches(),
        }
    }
}

impl Config {
    /// Loads configuration from the default file locations.
    ///
    /// If no configuration file is found, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found but cannot be
    /// read, parsed, or validated.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use history_config::Config;
    ///
    /// # fn example() -> history_config::Result<()> {
    /// let config = Config::load_from("custom-config.json5")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config: Config = read_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the fetch settings and every batch.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    ///
    /// # Examples
    ///
    /// ```
    /// use history_config::{BatchConfig, Config};
    ///
    /// let mut config = Config::default();
    /// config.batches.push(BatchConfig::new("hourly", 0, None));
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        self.fetch.validate()?;
        validate_batches(&self.batches)?;
        Ok(())
    }

    /// Returns the cache directory, falling back to the platform default.
    ///
    /// # Errors
    ///
    /// Returns an error if no cache directory is configured and the home
    /// directory cannot be determined.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_cache_dir(),
        }
    }
}
