//! Concurrent fetching of many repositories.
//!
//! Repositories with a cache artifact and repositories that need the remote
//! source run in two separate lanes. Each lane is a queue drained by a fixed
//! number of workers:
//!
//! - the cache lane is wide (default 10) and reads artifacts on the blocking
//!   thread pool;
//! - the live lane is narrow (default 1), which keeps remote API usage to a
//!   single request at a time and processes repositories in list order.
//!
//! A cache worker that finds a malformed artifact hands the repository over
//! to the live lane rather than calling the remote source itself.
//!
//! Workers return their results to [`FetchScheduler::fetch_all`], which
//! assembles the final [`IssueMap`]. The first worker error ends the run and
//! cancels every other worker.

use std::sync::Arc;
use std::time::Duration;

use history_protocol::{IssueMap, RepoId, RepoIssues};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::fetcher::IssueFetcher;
use crate::progress::{FetchOrigin, FetchProgress};
use crate::source::IssueSource;

/// Default number of concurrent cache loads.
pub const DEFAULT_CACHE_WORKERS: usize = 10;

/// Default number of concurrent remote fetches.
pub const DEFAULT_LIVE_WORKERS: usize = 1;

type Queue = Arc<Mutex<UnboundedReceiver<RepoId>>>;
type WorkerResult = Result<Vec<(RepoId, RepoIssues)>>;

/// Fetches the issues of a list of repositories with bounded concurrency.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use history_github::{FetchScheduler, GitHubClient, IssueCache, IssueFetcher, NoProgress};
/// use history_protocol::RepoId;
/// use secrecy::SecretString;
///
/// # async fn example() -> history_github::Result<()> {
/// let client = GitHubClient::new(Some(SecretString::from("ghp_xxx".to_string()))).await?;
/// let cache = IssueCache::with_path(".cache/github".into())?;
/// let scheduler = FetchScheduler::new(IssueFetcher::new(client, cache));
///
/// let repos = vec![RepoId::new("conda/conda"), RepoId::new("conda/grayskull")];
/// let issues = scheduler.fetch_all(&repos, Arc::new(NoProgress)).await?;
/// assert_eq!(issues.len(), repos.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FetchScheduler<S> {
    fetcher: Arc<IssueFetcher<S>>,
    cache_workers: usize,
    live_workers: usize,
    timeout: Option<Duration>,
}

impl<S: IssueSource + 'static> FetchScheduler<S> {
    /// Creates a scheduler with the default lane widths and no deadline.
    #[must_use]
    pub fn new(fetcher: IssueFetcher<S>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            cache_workers: DEFAULT_CACHE_WORKERS,
            live_workers: DEFAULT_LIVE_WORKERS,
            timeout: None,
        }
    }

    /// Sets the number of concurrent cache loads (at least one).
    #[must_use]
    pub fn with_cache_workers(mut self, workers: usize) -> Self {
        self.cache_workers = workers.max(1);
        self
    }

    /// Sets the number of concurrent remote fetches (at least one).
    #[must_use]
    pub fn with_live_workers(mut self, workers: usize) -> Self {
        self.live_workers = workers.max(1);
        self
    }

    /// Fails a remote fetch that takes longer than `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the fetcher shared by all workers.
    #[must_use]
    pub fn fetcher(&self) -> &IssueFetcher<S> {
        &self.fetcher
    }

    /// Fetches every repository in `repos`.
    ///
    /// Returns once all of them are processed; the map holds one entry per
    /// distinct repository.
    ///
    /// # Errors
    ///
    /// Returns the first error of any worker. Remaining workers are cancelled.
    #[instrument(skip_all, fields(repos = repos.len()))]
    pub async fn fetch_all(
        &self,
        repos: &[RepoId],
        progress: Arc<dyn FetchProgress>,
    ) -> Result<IssueMap> {
        let (cached, fresh): (Vec<_>, Vec<_>) =
            repos.iter().cloned().partition(|repo| self.fetcher.is_cached(repo));
        info!(cached = cached.len(), fresh = fresh.len(), "scheduling fetch");

        let (cache_tx, cache_rx) = mpsc::unbounded_channel();
        let (live_tx, live_rx) = mpsc::unbounded_channel();
        for repo in cached {
            enqueue(&cache_tx, repo)?;
        }
        for repo in fresh {
            enqueue(&live_tx, repo)?;
        }
        drop(cache_tx);

        let cache_queue: Queue = Arc::new(Mutex::new(cache_rx));
        let live_queue: Queue = Arc::new(Mutex::new(live_rx));
        let mut workers: JoinSet<WorkerResult> = JoinSet::new();

        for _ in 0..self.cache_workers {
            workers.spawn(cache_worker(
                Arc::clone(&self.fetcher),
                Arc::clone(&cache_queue),
                live_tx.clone(),
                Arc::clone(&progress),
            ));
        }
        // The live queue closes once every cache worker has finished.
        drop(live_tx);

        for _ in 0..self.live_workers {
            workers.spawn(live_worker(
                Arc::clone(&self.fetcher),
                Arc::clone(&live_queue),
                Arc::clone(&progress),
                self.timeout,
            ));
        }

        let mut issues = IssueMap::with_capacity(repos.len());
        while let Some(joined) = workers.join_next().await {
            let fetched = match joined {
                Ok(Ok(fetched)) => fetched,
                Ok(Err(e)) => {
                    warn!(error = %e, "fetch worker failed, cancelling run");
                    return Err(e);
                }
                Err(e) => return Err(Error::Worker(e)),
            };
            issues.extend(fetched);
        }

        debug!(repos = issues.len(), "all repositories fetched");
        Ok(issues)
    }
}

fn enqueue(queue: &UnboundedSender<RepoId>, repo: RepoId) -> Result<()> {
    queue
        .send(repo)
        .map_err(|rejected| Error::LaneClosed { repo: rejected.0 })
}

async fn next_repo(queue: &Queue) -> Option<RepoId> {
    queue.lock().await.recv().await
}

async fn cache_worker<S: IssueSource + 'static>(
    fetcher: Arc<IssueFetcher<S>>,
    queue: Queue,
    live: UnboundedSender<RepoId>,
    progress: Arc<dyn FetchProgress>,
) -> WorkerResult {
    let mut fetched = Vec::new();
    while let Some(repo) = next_repo(&queue).await {
        let loader = Arc::clone(&fetcher);
        let key = repo.clone();
        let loaded = tokio::task::spawn_blocking(move || loader.load_cached(&key)).await??;
        match loaded {
            Some(issues) => {
                progress
                    .begin(&repo, FetchOrigin::Cache)
                    .finish(issues.len() as u64);
                fetched.push((repo, issues));
            }
            None => {
                debug!(%repo, "cache miss, handing over to live lane");
                enqueue(&live, repo)?;
            }
        }
    }
    Ok(fetched)
}

async fn live_worker<S: IssueSource>(
    fetcher: Arc<IssueFetcher<S>>,
    queue: Queue,
    progress: Arc<dyn FetchProgress>,
    timeout: Option<Duration>,
) -> WorkerResult {
    let mut fetched = Vec::new();
    while let Some(repo) = next_repo(&queue).await {
        let mut bar = progress.begin(&repo, FetchOrigin::Live);
        let fetch = fetcher.fetch_live(&repo, bar.as_mut());
        let issues = match timeout {
            Some(after) => tokio::time::timeout(after, fetch)
                .await
                .map_err(|_| Error::Timeout {
                    repo: repo.clone(),
                    after,
                })??,
            None => fetch.await?,
        };
        fetched.push((repo, issues));
    }
    Ok(fetched)
}
