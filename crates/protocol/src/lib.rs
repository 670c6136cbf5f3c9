//! Shared protocol types for issue-history.
//!
//! This crate holds everything that does not talk to the network or the
//! filesystem: the issue data model, the backward snapshot replay, and the
//! rendering of the JavaScript modules written at the end of a run.
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`issue`]: Repository identifiers and issue lifecycle records
//! - [`snapshot`]: The backward replay producing open-issue time series
//! - [`estimate`]: Growing totals for progress of unknown size
//! - [`output`]: Rendering of the `repos` and snapshot batch modules
//! - [`error`]: Error types for protocol operations
//!
//! # Examples
//!
//! Replaying a small issue map:
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use history_protocol::{IssueMap, IssueRecord, RepoId, SnapshotBuilder, SnapshotParams};
//!
//! let repo = RepoId::new("conda/conda");
//! let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let closed = Utc.with_ymd_and_hms(2024, 1, 1, 6, 0, 0).unwrap();
//!
//! let mut issues = IssueMap::new();
//! issues
//!     .entry(repo.clone())
//!     .or_default()
//!     .insert(1, IssueRecord::closed(created, closed));
//!
//! let repos = [repo.clone()];
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! let params = SnapshotParams::new(3);
//! let snapshots = SnapshotBuilder::new(&issues, &repos).build(&params, now).unwrap();
//!
//! // 09:00 and 06:00 are at or after closing, 03:00 is while open.
//! assert_eq!(snapshots.series(&repo), Some(&[0, 0, 1][..]));
//! ```

pub mod error;
pub mod estimate;
pub mod issue;
pub mod output;
pub mod snapshot;

// Re-export primary types at crate root for convenience
pub use error::{ProtocolError, Result};
pub use estimate::TotalEstimator;
pub use issue::{IssueMap, IssueRecord, RepoId, RepoIssues};
pub use snapshot::{SnapshotBuilder, SnapshotParams, Snapshots, StartPolicy};
