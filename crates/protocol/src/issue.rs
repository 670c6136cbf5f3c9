//! Issue lifecycle types.
//!
//! This module defines the data fetched for every repository: an opaque
//! [`RepoId`] and, per issue number, an [`IssueRecord`] holding the only two
//! timestamps the replay needs.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a repository within an organization, in `"owner/name"` form.
///
/// The identifier is treated as an opaque key everywhere except when talking
/// to the GitHub API, which needs the owner and name separately.
///
/// # Examples
///
/// ```
/// use history_protocol::RepoId;
///
/// let repo = RepoId::new("conda/conda-build");
/// assert_eq!(repo.owner(), "conda");
/// assert_eq!(repo.name(), "conda-build");
/// assert_eq!(repo.to_string(), "conda/conda-build");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RepoId(String);

impl RepoId {
    /// Creates a repository identifier from its full name.
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self(full_name.into())
    }

    /// Returns the full `"owner/name"` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the part before the first `/`, or the whole id if there is none.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(owner, _)| owner)
    }

    /// Returns the part after the first `/`, or the whole id if there is none.
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RepoId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RepoId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Creation and closing time of a single issue.
///
/// A missing `closed` means the issue was still open when it was fetched.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use history_protocol::IssueRecord;
///
/// let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let closed = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
/// let issue = IssueRecord::closed(created, closed);
///
/// assert!(issue.is_open_at(created));
/// assert!(!issue.is_open_at(closed));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// When the issue was opened.
    pub created: DateTime<Utc>,
    /// When the issue was closed, if it is closed.
    #[serde(default)]
    pub closed: Option<DateTime<Utc>>,
}

impl IssueRecord {
    /// Creates a record for an issue that is still open.
    #[must_use]
    pub fn open(created: DateTime<Utc>) -> Self {
        Self {
            created,
            closed: None,
        }
    }

    /// Creates a record for an issue closed at `closed`.
    #[must_use]
    pub fn closed(created: DateTime<Utc>, closed: DateTime<Utc>) -> Self {
        Self {
            created,
            closed: Some(closed),
        }
    }

    /// Returns whether the issue existed at `at`.
    #[must_use]
    pub fn exists_at(&self, at: DateTime<Utc>) -> bool {
        self.created <= at
    }

    /// Returns whether the issue counts as open at `at`.
    ///
    /// An issue closed exactly at `at` is no longer open.
    #[must_use]
    pub fn is_open_at(&self, at: DateTime<Utc>) -> bool {
        self.exists_at(at) && self.is_unclosed_at(at)
    }

    /// Returns whether the issue has not been closed yet at `at`, ignoring
    /// whether it was created.
    #[must_use]
    pub(crate) fn is_unclosed_at(&self, at: DateTime<Utc>) -> bool {
        self.closed.is_none_or(|closed| at < closed)
    }
}

/// Issues of one repository keyed by issue number.
pub type RepoIssues = BTreeMap<u64, IssueRecord>;

/// Issues of every fetched repository.
pub type IssueMap = HashMap<RepoId, RepoIssues>;
