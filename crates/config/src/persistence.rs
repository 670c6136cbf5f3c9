//! Configuration file discovery and reading.
//!
//! Configuration is read as JSON5; plain JSON is a subset.
//!
//! # File Locations
//!
//! Configuration is searched in the following order:
//!
//! 1. Working directory: `./issue-history.json5` or `./issue-history.json`
//! 2. User: `~/.config/issue-history/config.json5` or `~/.config/issue-history/config.json`
//!
//! Cache artifacts default to `<cache dir>/issue-history/github`, e.g.
//! `~/.cache/issue-history/github` on Linux.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};

/// Application directory name under the user config and cache directories.
const APP_DIR: &str = "issue-history";

/// Working-directory config file names, in priority order.
const LOCAL_CONFIG_FILE_NAMES: &[&str] = &["issue-history.json5", "issue-history.json"];

/// User config file names, in priority order.
const USER_CONFIG_FILE_NAMES: &[&str] = &["config.json5", "config.json"];

/// Finds the configuration file path.
///
/// Returns `None` if no configuration file exists in any searched location.
///
/// # Examples
///
/// ```no_run
/// use history_config::persistence::find_config_file;
///
/// if let Some(path) = find_config_file() {
///     println!("Found config at: {}", path.display());
/// }
/// ```
#[must_use]
pub fn find_config_file() -> Option<PathBuf> {
    let local = LOCAL_CONFIG_FILE_NAMES.iter().map(PathBuf::from);
    let user = dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .into_iter()
        .flat_map(|dir| USER_CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)));

    let found = local.chain(user).find(|path| path.is_file());
    debug!(?found, "searched for config file");
    found
}

/// Returns the default directory for cache artifacts.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_cache_dir() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join(APP_DIR).join("github"))
        .ok_or(ConfigError::NoHomeDirectory)
}

/// Reads and parses a JSON5 or JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Examples
///
/// ```no_run
/// use history_config::Config;
/// use history_config::persistence::read_config_file;
///
/// # fn main() -> history_config::Result<()> {
/// let config: Config = read_config_file("issue-history.json5")?;
/// # Ok(())
/// # }
/// ```
pub fn read_config_file<T: serde::de::DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    serde_json5::from_str(&content).map_err(ConfigError::from)
}
