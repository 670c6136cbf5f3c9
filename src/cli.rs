//! Command-line interface definition.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use history_config::Config;
use history_protocol::StartPolicy;

/// Builds open-issue time series for the repositories of a GitHub
/// organization.
///
/// Issue histories are cached on disk; later runs only fetch repositories
/// that are not cached yet. The API key is read from ~/.github_apikey, the
/// GITHUB_APIKEY environment variable, or prompted for.
#[derive(Parser, Debug)]
#[command(name = "issue-history")]
#[command(version)]
pub struct Cli {
    /// Bypass all caches and fetch everything again
    #[arg(long)]
    pub ignore_cache: bool,

    /// Configuration file (defaults to issue-history.json5 in the working
    /// or user config directory)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// GitHub organization to crawl
    #[arg(long, value_name = "NAME")]
    pub org: Option<String>,

    /// Directory the output modules are written to
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding cached repository lists and issues
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Maximum number of issues fetched per repository (0 for no limit)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Start the series at the earliest issue of any repository instead of
    /// the first-numbered one
    #[arg(long)]
    pub exact_start: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Applies command-line overrides on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(org) = &self.org {
            config.organization.clone_from(org);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if let Some(limit) = self.limit {
            config.limit = Some(limit);
        }
    }

    /// Returns how the start of the replay is chosen.
    pub fn start_policy(&self) -> StartPolicy {
        if self.exact_start {
            StartPolicy::EarliestCreated
        } else {
            StartPolicy::FirstIssue
        }
    }

    /// Returns the default log filter for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
