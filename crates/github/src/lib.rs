//! GitHub access for issue-history.
//!
//! This crate lists the repositories of an organization and fetches the
//! creation and closing timestamps of every issue, with an on-disk cache and
//! bounded concurrency.
//!
//! # Overview
//!
//! - [`GitHubClient`]: octocrab-backed [`IssueSource`] and [`RepoSource`]
//! - [`organization_repos`]: non-archived repositories, cached per
//!   organization
//! - [`IssueFetcher`]: loads or fetches the issues of one repository
//! - [`FetchScheduler`]: fetches many repositories in a cache lane and a live
//!   lane
//! - [`IssueCache`]: persistent JSON artifacts
//! - [`FetchProgress`]: per-repository progress reporting
//! - [`Error`]: error types for all of the above
//!
//! # Authentication
//!
//! Tokens are handled using [`secrecy::SecretString`] to prevent accidental
//! logging of credentials. Unauthenticated access is limited to 60 requests
//! per hour, which is not enough to crawl an organization.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use history_github::{
//!     FetchScheduler, GitHubClient, IssueCache, IssueFetcher, NoProgress, organization_repos,
//! };
//! use secrecy::SecretString;
//!
//! # async fn example() -> history_github::Result<()> {
//! let token = SecretString::from("ghp_your_token_here".to_string());
//! let client = GitHubClient::new(Some(token)).await?;
//! client.validate_token().await?;
//!
//! let cache = IssueCache::with_path(".cache/github".into())?;
//! let repos = organization_repos(&client, &cache, "conda", true).await?;
//!
//! let scheduler = FetchScheduler::new(IssueFetcher::new(client, cache));
//! let issues = scheduler.fetch_all(&repos, Arc::new(NoProgress)).await?;
//! println!("fetched {} repositories", issues.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod error;
pub mod fetcher;
pub mod progress;
pub mod repos;
pub mod scheduler;
pub mod source;

#[cfg(test)]
mod fake;

pub use cache::{CachedIndex, CachedIssues, IssueCache};
pub use client::GitHubClient;
pub use error::{Error, Result};
pub use fetcher::IssueFetcher;
pub use progress::{FetchOrigin, FetchProgress, NoProgress, RepoProgress};
pub use repos::organization_repos;
pub use scheduler::FetchScheduler;
pub use source::{IssuePage, IssueSource, RepoListing, RepoSource, SourceIssue};
