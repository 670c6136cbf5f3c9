//! Abstract sources of repositories and issues.
//!
//! The fetch layer only needs two things from GitHub: the repositories of an
//! organization and, page by page, the issues of a repository. Both are
//! expressed as traits so the scheduler can run against [`GitHubClient`]
//! in production and against in-memory data in tests.
//!
//! [`GitHubClient`]: crate::GitHubClient

use std::future::Future;

use chrono::{DateTime, Utc};
use history_protocol::RepoId;

use crate::error::Result;

/// One issue as returned by the issue source.
///
/// GitHub's issue endpoint also returns pull requests; they are flagged here
/// and skipped by the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceIssue {
    /// Issue number, unique within the repository.
    pub number: u64,
    /// When the issue was opened.
    pub created_at: DateTime<Utc>,
    /// When the issue was closed, if it is closed.
    pub closed_at: Option<DateTime<Utc>>,
    /// Whether this entry is a pull request.
    pub is_pull_request: bool,
}

/// One page of issues.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuePage {
    /// Issues on this page, in source order.
    pub issues: Vec<SourceIssue>,
    /// Whether another page follows.
    pub has_next: bool,
}

/// Paginated access to the issues of a repository, in every state.
pub trait IssueSource: Send + Sync {
    /// Fetches page `page` (starting at 1) of the issues of `repo`.
    fn fetch_page(&self, repo: &RepoId, page: u32) -> impl Future<Output = Result<IssuePage>> + Send;
}

/// A repository as listed for an organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoListing {
    /// Full `"owner/name"` identifier.
    pub id: RepoId,
    /// Whether the repository is archived.
    pub archived: bool,
}

/// Access to the repositories of an organization.
pub trait RepoSource: Send + Sync {
    /// Lists every repository of `organization`, archived ones included.
    fn list_repositories(
        &self,
        organization: &str,
    ) -> impl Future<Output = Result<Vec<RepoListing>>> + Send;
}
