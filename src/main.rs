//! issue-history - open-issue time series for a GitHub organization.
//!
//! Lists the organization's repositories, fetches the issue history of each
//! one (cached on disk), replays it into one snapshot series per configured
//! batch and writes the results as JavaScript modules.

mod cli;
mod output;
mod progress;

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use history_config::Config;
use history_config::auth::{TokenSources, prompt_stdin, resolve_token};
use history_github::{FetchScheduler, GitHubClient, IssueCache, IssueFetcher, organization_repos};
use history_protocol::{SnapshotBuilder, SnapshotParams};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::progress::TerminalProgress;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    cli.apply(&mut config);
    config.validate().context("invalid configuration")?;

    run(&cli, &config).await
}

async fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let use_cache = !cli.ignore_cache;

    let token = resolve_token(&TokenSources::default(), prompt_stdin)?;
    let client = GitHubClient::new(Some(token)).await?;
    client
        .validate_token()
        .await
        .context("GitHub rejected the API key")?;

    let cache_dir = config.resolved_cache_dir()?;
    let cache = IssueCache::with_path(cache_dir.clone())
        .with_context(|| format!("failed to open cache at {}", cache_dir.display()))?;
    debug!(cache = %cache.base_path().display(), use_cache, "opened cache");

    let repos = organization_repos(&client, &cache, &config.organization, use_cache)
        .await
        .with_context(|| format!("failed to list repositories of {}", config.organization))?;
    info!(organization = %config.organization, repos = repos.len(), "crawling repositories");

    let progress = TerminalProgress::new();
    let fetcher = IssueFetcher::new(client, cache)
        .ignore_cache(cli.ignore_cache)
        .with_limit(config.limit);
    let scheduler = FetchScheduler::new(fetcher)
        .with_cache_workers(config.fetch.cache_workers)
        .with_live_workers(config.fetch.live_workers)
        .with_timeout(config.fetch.timeout());
    let issues = scheduler
        .fetch_all(&repos, Arc::new(progress.clone()))
        .await
        .context("failed to fetch issues")?;

    output::write_repos(&config.output_dir, &repos)?;

    let now = Utc::now();
    let builder = SnapshotBuilder::new(&issues, &repos);
    for batch in &config.batches {
        let params = SnapshotParams::new(batch.rate)
            .with_trim(batch.trim)
            .with_start_policy(cli.start_policy());

        let (bar, on_step) = progress.snapshot_bar(&batch.name);
        let snapshots = builder
            .build_with_progress(&params, now, on_step)
            .with_context(|| format!("failed to build batch {}", batch.name))?;
        bar.finish();

        info!(batch = %batch.name, steps = snapshots.len(), "built snapshots");
        output::write_batch(&config.output_dir, &batch.name, &snapshots)?;
    }

    Ok(())
}
