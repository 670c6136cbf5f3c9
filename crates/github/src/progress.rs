//! Per-repository fetch progress reporting.
//!
//! The scheduler opens one [`RepoProgress`] per repository through a shared
//! [`FetchProgress`] and drives it as pages arrive. The binary renders these
//! as terminal progress bars; tests and library callers can use
//! [`NoProgress`].

use history_protocol::RepoId;

/// Where a repository's issues come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Loaded from a cache artifact.
    Cache,
    /// Paged from the remote issue source.
    Live,
}

/// Factory for per-repository progress reporters.
pub trait FetchProgress: Send + Sync {
    /// Starts reporting for `repo`.
    fn begin(&self, repo: &RepoId, origin: FetchOrigin) -> Box<dyn RepoProgress>;
}

/// Progress of one repository.
pub trait RepoProgress: Send {
    /// Reports `completed` issues out of an estimated total.
    fn advance(&mut self, completed: u64, estimated_total: u64);

    /// Marks the repository as done with `total` issues stored.
    fn finish(&mut self, total: u64);
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn begin(&self, _repo: &RepoId, _origin: FetchOrigin) -> Box<dyn RepoProgress> {
        Box::new(NoProgress)
    }
}

impl RepoProgress for NoProgress {
    fn advance(&mut self, _completed: u64, _estimated_total: u64) {}

    fn finish(&mut self, _total: u64) {}
}
