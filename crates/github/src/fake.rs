//! In-memory issue source for tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use history_protocol::RepoId;

use crate::error::{Error, Result};
use crate::source::{IssuePage, IssueSource, RepoListing, RepoSource, SourceIssue};

pub(crate) fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap()
}

pub(crate) fn issue(number: u64, created: u32, closed: Option<u32>) -> SourceIssue {
    SourceIssue {
        number,
        created_at: day(created),
        closed_at: closed.map(day),
        is_pull_request: false,
    }
}

pub(crate) fn pull_request(number: u64, created: u32) -> SourceIssue {
    SourceIssue {
        is_pull_request: true,
        ..issue(number, created, None)
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeSource {
    pages: HashMap<RepoId, Vec<Vec<SourceIssue>>>,
    failing: HashSet<RepoId>,
    repos: Vec<RepoListing>,
    delay: Option<Duration>,
    requests: Mutex<Vec<(RepoId, u32)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_pages(mut self, repo: &RepoId, pages: Vec<Vec<SourceIssue>>) -> Self {
        self.pages.insert(repo.clone(), pages);
        self
    }

    pub(crate) fn failing(mut self, repo: &RepoId) -> Self {
        self.failing.insert(repo.clone());
        self
    }

    pub(crate) fn with_repo(mut self, full_name: &str, archived: bool) -> Self {
        self.repos.push(RepoListing {
            id: RepoId::new(full_name),
            archived,
        });
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Repositories in the order their first page was requested.
    pub(crate) fn repos_requested(&self) -> Vec<RepoId> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, page)| *page == 1)
            .map(|(repo, _)| repo.clone())
            .collect()
    }

    pub(crate) fn pages_requested(&self, repo: &RepoId) -> Vec<u32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(requested, _)| requested == repo)
            .map(|(_, page)| *page)
            .collect()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl IssueSource for FakeSource {
    async fn fetch_page(&self, repo: &RepoId, page: u32) -> Result<IssuePage> {
        self.requests.lock().unwrap().push((repo.clone(), page));

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(repo) {
            return Err(Error::Io(std::io::Error::other(format!(
                "{repo} is unavailable"
            ))));
        }

        let pages = self.pages.get(repo).map(Vec::as_slice).unwrap_or_default();
        let index = page.saturating_sub(1) as usize;
        Ok(IssuePage {
            issues: pages.get(index).cloned().unwrap_or_default(),
            has_next: index + 1 < pages.len(),
        })
    }
}

impl RepoSource for FakeSource {
    async fn list_repositories(&self, _organization: &str) -> Result<Vec<RepoListing>> {
        Ok(self.repos.clone())
    }
}
