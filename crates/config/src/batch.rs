//! Snapshot batch configuration.
//!
//! A batch is one named replay of the issue history with a fixed step size
//! and an optional cap on the number of steps. Each batch ends up in its own
//! output module named after the batch.
//!
//! The defaults cover four views of the history:
//!
//! | Batch | Step | Steps kept |
//! |-------|------|------------|
//! | `recent` | 1 hour | 72 (3 days) |
//! | `month` | 3 hours | 248 (31 days) |
//! | `year` | 24 hours | 366 |
//! | `alltime` | 72 hours | all |

use std::collections::HashSet;

use history_protocol::output::{REPOS_MODULE, is_module_name, module_file_name};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// One named snapshot batch.
///
/// # Examples
///
/// ```
/// use history_config::BatchConfig;
///
/// let batch = BatchConfig::new("recent", 1, Some(72));
/// assert!(batch.validate().is_ok());
///
/// let batch = BatchConfig::new("all time", 72, None);
/// assert!(batch.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Batch name, used as the output module and binding name.
    pub name: String,

    /// Hours between two checkpoints.
    pub rate: u32,

    /// Maximum number of checkpoints; unbounded when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim: Option<usize>,
}

impl BatchConfig {
    /// Creates a batch configuration.
    #[must_use]
    pub fn new(name: impl Into<String>, rate: u32, trim: Option<usize>) -> Self {
        Self {
            name: name.into(),
            rate,
            trim,
        }
    }

    /// Validates the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the rate is zero, or the name is not an ASCII
    /// JavaScript identifier or collides with the repository list module.
    pub fn validate(&self) -> Result<()> {
        if self.rate == 0 {
            return Err(self.invalid("rate must be at least 1 hour"));
        }

        if !is_module_name(&self.name) {
            return Err(self.invalid("name must be a JavaScript identifier"));
        }

        if module_file_name(&self.name) == REPOS_MODULE {
            return Err(self.invalid("name is reserved for the repository list"));
        }

        Ok(())
    }

    fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidBatch {
            name: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}

/// Returns the default batches: `recent`, `month`, `year` and `alltime`.
#[must_use]
pub fn default_batches() -> Vec<BatchConfig> {
    vec![
        BatchConfig::new("recent", 1, Some(72)),
        BatchConfig::new("month", 3, Some(248)),
        BatchConfig::new("year", 24, Some(366)),
        BatchConfig::new("alltime", 72, None),
    ]
}

/// Validates every batch and checks that names are unique.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate_batches(batches: &[BatchConfig]) -> Result<()> {
    let mut seen = HashSet::new();
    for batch in batches {
        batch.validate()?;
        if !seen.insert(batch.name.as_str()) {
            return Err(batch.invalid("name is used by more than one batch"));
        }
    }
    Ok(())
}
