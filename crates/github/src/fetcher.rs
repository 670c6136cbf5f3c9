//! Fetching the issue history of a single repository.
//!
//! [`IssueFetcher`] either loads a repository from the [`IssueCache`] or pages
//! through an [`IssueSource`], keeping only creation and closing timestamps.
//! Live results are written back to the cache before they are returned.

use history_protocol::{IssueRecord, RepoId, RepoIssues, TotalEstimator};
use tracing::{debug, info, instrument};

use crate::cache::{CachedIssues, IssueCache};
use crate::error::Result;
use crate::progress::RepoProgress;
use crate::source::IssueSource;

/// Initial growth chunk of the per-repository progress estimate.
const PROGRESS_CHUNK: u64 = 100;

/// Loads or fetches the issues of one repository at a time.
#[derive(Debug)]
pub struct IssueFetcher<S> {
    source: S,
    cache: IssueCache,
    use_cache: bool,
    limit: Option<usize>,
}

impl<S: IssueSource> IssueFetcher<S> {
    /// Creates a fetcher reading from and writing to `cache`.
    #[must_use]
    pub fn new(source: S, cache: IssueCache) -> Self {
        Self {
            source,
            cache,
            use_cache: true,
            limit: None,
        }
    }

    /// Stops reading cache artifacts. Fetched histories are still written.
    #[must_use]
    pub fn ignore_cache(mut self, ignore: bool) -> Self {
        self.use_cache = !ignore;
        self
    }

    /// Stores at most `limit` issues per repository. `Some(0)` means no limit.
    #[must_use]
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&limit| limit > 0);
        self
    }

    /// Returns the underlying issue source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns whether `repo` will be served from the cache.
    #[must_use]
    pub fn is_cached(&self, repo: &RepoId) -> bool {
        self.use_cache && self.cache.contains(repo)
    }

    /// Loads `repo` from the cache.
    ///
    /// Returns `None` when caching is disabled or the artifact is missing or
    /// malformed.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact exists but cannot be read.
    pub fn load_cached(&self, repo: &RepoId) -> Result<Option<RepoIssues>> {
        if !self.use_cache {
            return Ok(None);
        }
        Ok(self.cache.load(repo)?.map(|cached| self.apply_limit(cached.issues)))
    }

    /// Pages through the issue source for `repo` and caches the result.
    ///
    /// Pull requests are skipped. Paging stops after the last page or once
    /// the issue limit is reached.
    ///
    /// # Errors
    ///
    /// Returns an error if a page cannot be fetched or the cache artifact
    /// cannot be written.
    #[instrument(skip(self, progress), fields(repo = %repo))]
    pub async fn fetch_live(
        &self,
        repo: &RepoId,
        progress: &mut dyn RepoProgress,
    ) -> Result<RepoIssues> {
        let mut issues = RepoIssues::new();
        let mut estimate = TotalEstimator::new(0, PROGRESS_CHUNK);
        let mut page_number = 1;

        'pages: loop {
            let page = self.source.fetch_page(repo, page_number).await?;
            debug!(page = page_number, entries = page.issues.len(), "fetched issue page");

            for issue in page.issues {
                if issue.is_pull_request {
                    continue;
                }
                issues.insert(
                    issue.number,
                    IssueRecord {
                        created: issue.created_at,
                        closed: issue.closed_at,
                    },
                );
                if self.limit.is_some_and(|limit| issues.len() >= limit) {
                    debug!(limit = ?self.limit, "issue limit reached");
                    break 'pages;
                }
            }

            let completed = issues.len() as u64;
            progress.advance(completed, estimate.report(completed));

            if !page.has_next {
                break;
            }
            page_number += 1;
        }

        self.cache.save(repo, &CachedIssues::new(issues.clone()))?;
        info!(issues = issues.len(), pages = page_number, "fetched repository");
        progress.finish(issues.len() as u64);
        Ok(issues)
    }

    fn apply_limit(&self, issues: RepoIssues) -> RepoIssues {
        match self.limit {
            Some(limit) if issues.len() > limit => issues.into_iter().take(limit).collect(),
            _ => issues,
        }
    }
}
