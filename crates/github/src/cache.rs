//! Caching layer for repository lists and issue histories.
//!
//! A full crawl of an organization can take hours, so every repository's
//! issue history is persisted once fetched and reused on later runs. Cache
//! artifacts are never invalidated automatically; callers bypass them
//! explicitly when a fresh crawl is wanted.
//!
//! # Directory Structure
//!
//! ```text
//! <base>/
//! ├── index/
//! │   └── {organization}.json     # repository list
//! └── issues/
//!     └── {owner}/
//!         └── {repo}.json         # issue number -> {created, closed}
//! ```
//!
//! A missing artifact is a cache miss. An artifact that exists but cannot be
//! parsed is logged and also treated as a miss, so the repository is fetched
//! again and the artifact rewritten.
//!
//! # Examples
//!
//! ```no_run
//! use std::path::PathBuf;
//! use history_github::IssueCache;
//! use history_protocol::RepoId;
//!
//! # fn example() -> history_github::Result<()> {
//! let cache = IssueCache::with_path(PathBuf::from(".cache/github"))?;
//! let repo = RepoId::new("conda/conda");
//!
//! if let Some(cached) = cache.load(&repo)? {
//!     println!("{} issues cached at {}", cached.issues.len(), cached.cached_at);
//! }
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use history_protocol::{RepoId, RepoIssues};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};

/// Cached issue history of one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedIssues {
    /// Issues keyed by number.
    pub issues: RepoIssues,
    /// When the history was fetched.
    pub cached_at: DateTime<Utc>,
}

impl CachedIssues {
    /// Wraps `issues` with the current timestamp.
    #[must_use]
    pub fn new(issues: RepoIssues) -> Self {
        Self {
            issues,
            cached_at: Utc::now(),
        }
    }
}

/// Cached repository list of one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedIndex {
    /// Non-archived repositories, in listing order.
    pub repos: Vec<RepoId>,
    /// When the list was fetched.
    pub cached_at: DateTime<Utc>,
}

impl CachedIndex {
    /// Wraps `repos` with the current timestamp.
    #[must_use]
    pub fn new(repos: Vec<RepoId>) -> Self {
        Self {
            repos,
            cached_at: Utc::now(),
        }
    }
}

/// File-backed cache of repository lists and issue histories.
#[derive(Debug, Clone)]
pub struct IssueCache {
    base_path: PathBuf,
}

impl IssueCache {
    /// Creates a cache rooted at `base_path`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    #[instrument]
    pub fn with_path(base_path: PathBuf) -> Result<Self> {
        if !base_path.exists() {
            debug!(?base_path, "creating cache directory");
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self { base_path })
    }

    /// Returns the cache root.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns whether an issue artifact exists for `repo`.
    ///
    /// The artifact is not parsed; a corrupt file still counts as present.
    #[must_use]
    pub fn contains(&self, repo: &RepoId) -> bool {
        self.issues_path(repo).is_file()
    }

    /// Loads the cached issues of `repo`.
    ///
    /// Returns `None` if the artifact is missing or cannot be parsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact exists but cannot be read.
    #[instrument(skip(self), fields(repo = %repo))]
    pub fn load(&self, repo: &RepoId) -> Result<Option<CachedIssues>> {
        let cached: Option<CachedIssues> = read_artifact(&self.issues_path(repo))?;
        if let Some(cached) = &cached {
            debug!(
                issues = cached.issues.len(),
                cached_at = %cached.cached_at,
                "loaded cached issues"
            );
        }
        Ok(cached)
    }

    /// Saves the issues of `repo`, replacing any existing artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be written.
    #[instrument(skip(self, cached), fields(repo = %repo, issues = cached.issues.len()))]
    pub fn save(&self, repo: &RepoId, cached: &CachedIssues) -> Result<()> {
        write_artifact(&self.issues_path(repo), cached)
    }

    /// Loads the cached repository list of `organization`.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact exists but cannot be read.
    #[instrument(skip(self))]
    pub fn load_index(&self, organization: &str) -> Result<Option<CachedIndex>> {
        read_artifact(&self.index_path(organization))
    }

    /// Saves the repository list of `organization`.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be written.
    #[instrument(skip(self, index), fields(repos = index.repos.len()))]
    pub fn save_index(&self, organization: &str, index: &CachedIndex) -> Result<()> {
        write_artifact(&self.index_path(organization), index)
    }

    fn issues_path(&self, repo: &RepoId) -> PathBuf {
        self.base_path
            .join("issues")
            .join(sanitize(repo.owner()))
            .join(format!("{}.json", sanitize(repo.name())))
    }

    fn index_path(&self, organization: &str) -> PathBuf {
        self.base_path
            .join("index")
            .join(format!("{}.json", sanitize(organization)))
    }
}

/// Makes a single path component out of an untrusted name.
fn sanitize(component: &str) -> String {
    let safe = component.replace(['/', '\\'], "_");
    match safe.as_str() {
        "" | "." | ".." => safe.replace('.', "_") + "_",
        _ => safe,
    }
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read(path) {
        Ok(content) => match serde_json::from_slice(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(?path, error = %e, "ignoring unreadable cache artifact");
                Ok(None)
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(?path, "cache artifact not found");
            Ok(None)
        }
        Err(e) => {
            warn!(?path, error = %e, "failed to read cache artifact");
            Err(Error::Io(e))
        }
    }
}

fn write_artifact<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value).map_err(|source| Error::CacheSerialize {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    debug!(?path, "cache artifact written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use history_protocol::IssueRecord;
    use tempfile::TempDir;

    fn create_test_cache() -> (IssueCache, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cache =
            IssueCache::with_path(temp_dir.path().to_path_buf()).expect("Failed to create cache");
        (cache, temp_dir)
    }

    fn sample_issues() -> RepoIssues {
        let created = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        let closed = Utc.with_ymd_and_hms(2023, 5, 3, 8, 30, 0).unwrap();
        RepoIssues::from([
            (1, IssueRecord::closed(created, closed)),
            (7, IssueRecord::open(closed)),
        ])
    }

    #[test]
    fn issues_path_is_nested_by_owner() {
        let (cache, temp) = create_test_cache();
        let path = cache.issues_path(&RepoId::new("conda/conda.github.io"));
        assert_eq!(
            path,
            temp.path()
                .join("issues")
                .join("conda")
                .join("conda.github.io.json")
        );
    }

    #[test]
    fn sanitize_blocks_traversal() {
        assert_eq!(sanitize(".."), "___");
        assert_eq!(sanitize("."), "__");
        assert_eq!(sanitize(""), "_");
        assert_eq!(sanitize("a\\b"), "a_b");
        assert_eq!(sanitize("conda-build"), "conda-build");
    }

    #[test]
    fn traversal_in_repo_name_stays_inside_cache() {
        let (cache, temp) = create_test_cache();
        let path = cache.issues_path(&RepoId::new("../evil"));
        assert!(path.starts_with(temp.path()));
        assert!(path.ends_with("issues/___/evil.json"));
    }

    #[test]
    fn load_returns_none_for_missing_cache() {
        let (cache, _temp) = create_test_cache();
        let repo = RepoId::new("conda/nonexistent");

        assert!(!cache.contains(&repo));
        assert!(cache.load(&repo).expect("load should not fail").is_none());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (cache, _temp) = create_test_cache();
        let repo = RepoId::new("conda/conda");
        let cached = CachedIssues::new(sample_issues());

        cache.save(&repo, &cached).expect("save should succeed");
        assert!(cache.contains(&repo));

        let loaded = cache
            .load(&repo)
            .expect("load should succeed")
            .expect("cache should exist");
        assert_eq!(loaded, cached);
    }

    #[test]
    fn artifact_is_human_readable() {
        let (cache, temp) = create_test_cache();
        let repo = RepoId::new("conda/conda");
        cache
            .save(&repo, &CachedIssues::new(sample_issues()))
            .expect("save");

        let content =
            fs::read_to_string(temp.path().join("issues/conda/conda.json")).expect("read");
        assert!(content.contains("\"7\": {"));
        assert!(content.contains("\"closed\": null"));
        assert!(content.contains("2023-05-03T08:30:00Z"));
    }

    #[test]
    fn save_overwrites_existing_cache() {
        let (cache, _temp) = create_test_cache();
        let repo = RepoId::new("conda/conda");

        cache
            .save(&repo, &CachedIssues::new(sample_issues()))
            .expect("first save");
        cache
            .save(&repo, &CachedIssues::new(RepoIssues::new()))
            .expect("second save");

        let loaded = cache.load(&repo).expect("load").expect("cache exists");
        assert!(loaded.issues.is_empty());
    }

    #[test]
    fn malformed_artifact_is_a_miss() {
        let (cache, temp) = create_test_cache();
        let repo = RepoId::new("conda/conda");

        let path = temp.path().join("issues/conda/conda.json");
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, "not valid json").expect("write invalid json");

        assert!(cache.contains(&repo));
        assert!(cache.load(&repo).expect("load should not fail").is_none());
    }

    #[test]
    fn non_utf8_artifact_is_a_miss() {
        let (cache, temp) = create_test_cache();
        let repo = RepoId::new("conda/conda");

        let path = temp.path().join("issues/conda/conda.json");
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, [0xff, 0xfe, 0x00]).expect("write binary garbage");

        assert!(cache.contains(&repo));
        assert!(cache.load(&repo).expect("load should not fail").is_none());
    }

    #[test]
    fn non_utf8_index_is_a_miss() {
        let (cache, temp) = create_test_cache();
        let path = temp.path().join("index/conda.json");
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        fs::write(&path, [0xc3, 0x28]).expect("write invalid utf-8");

        assert!(cache.load_index("conda").expect("load should not fail").is_none());
    }

    #[test]
    fn index_roundtrip_per_organization() {
        let (cache, _temp) = create_test_cache();
        let conda = CachedIndex::new(vec![RepoId::new("conda/conda"), RepoId::new("conda/grayskull")]);
        let other = CachedIndex::new(vec![RepoId::new("other/repo")]);

        cache.save_index("conda", &conda).expect("save conda");
        cache.save_index("other", &other).expect("save other");

        assert_eq!(cache.load_index("conda").expect("load").expect("exists"), conda);
        assert_eq!(cache.load_index("other").expect("load").expect("exists"), other);
        assert!(cache.load_index("missing").expect("load").is_none());
    }

    #[test]
    fn with_path_creates_directory() {
        let temp = TempDir::new().expect("temp dir");
        let cache_path = temp.path().join("nested").join("cache");
        assert!(!cache_path.exists());

        let cache = IssueCache::with_path(cache_path.clone()).expect("create cache");
        assert!(cache_path.exists());
        assert_eq!(cache.base_path(), cache_path.as_path());
    }
}
