//! GitHub API key resolution.
//!
//! This module provides API key resolution with a fallback chain:
//!
//! 1. Key file (`~/.github_apikey`)
//! 2. `GITHUB_APIKEY` environment variable
//! 3. Interactive prompt on the terminal
//!
//! Values are trimmed, and an empty value counts as absent. If no source
//! yields a key, resolution fails with [`ConfigError::MissingToken`].

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

/// Name of the key file in the home directory.
pub const API_KEY_FILE: &str = ".github_apikey";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "GITHUB_APIKEY";

/// Locations the API key is looked up from.
///
/// # Examples
///
/// ```
/// use history_config::auth::{API_KEY_ENV, TokenSources};
///
/// let sources = TokenSources::default();
/// assert_eq!(sources.env_var, API_KEY_ENV);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSources {
    /// File containing the key, if a home directory is known.
    pub key_file: Option<PathBuf>,
    /// Name of the environment variable containing the key.
    pub env_var: String,
}

impl Default for TokenSources {
    fn default() -> Self {
        Self {
            key_file: dirs::home_dir().map(|home| home.join(API_KEY_FILE)),
            env_var: API_KEY_ENV.to_string(),
        }
    }
}

/// Resolves the API key from the configured sources.
///
/// The prompt is only invoked when neither the key file nor the environment
/// variable yields a key.
///
/// # Errors
///
/// Returns [`ConfigError::MissingToken`] if every source comes up empty.
///
/// # Examples
///
/// ```no_run
/// use history_config::auth::{TokenSources, prompt_stdin, resolve_token};
///
/// # fn example() -> history_config::Result<()> {
/// let token = resolve_token(&TokenSources::default(), prompt_stdin)?;
/// # Ok(())
/// # }
/// ```
pub fn resolve_token(
    sources: &TokenSources,
    prompt: impl FnOnce() -> Option<String>,
) -> Result<SecretString> {
    let env_value = std::env::var(&sources.env_var).ok();
    resolve_token_from(sources, env_value, prompt)
}

/// Resolves the API key with an explicit environment value.
///
/// # Errors
///
/// Returns [`ConfigError::MissingToken`] if every source comes up empty.
pub fn resolve_token_from(
    sources: &TokenSources,
    env_value: Option<String>,
    prompt: impl FnOnce() -> Option<String>,
) -> Result<SecretString> {
    if let Some(token) = sources.key_file.as_deref().and_then(read_key_file) {
        debug!("using API key from key file");
        return Ok(SecretString::from(token));
    }

    if let Some(token) = env_value.as_deref().and_then(non_empty) {
        debug!(env_var = %sources.env_var, "using API key from environment");
        return Ok(SecretString::from(token));
    }

    if let Some(token) = prompt().as_deref().and_then(non_empty) {
        debug!("using API key from prompt");
        return Ok(SecretString::from(token));
    }

    Err(ConfigError::MissingToken {
        key_file: sources
            .key_file
            .as_ref()
            .map_or_else(|| format!("~/{API_KEY_FILE}"), |p| p.display().to_string()),
        env_var: sources.env_var.clone(),
    })
}

/// Reads a trimmed key from `path`.
///
/// Returns `None` if the file is missing, unreadable, or blank.
#[must_use]
pub fn read_key_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => non_empty(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(?path, error = %e, "failed to read API key file");
            None
        }
    }
}

/// Asks for the API key on stderr and reads one line from stdin.
///
/// Returns `None` if stdin is closed or cannot be read.
#[must_use]
pub fn prompt_stdin() -> Option<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "GitHub API Key? ").ok()?;
    stderr.flush().ok()?;

    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => non_empty(&line),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
