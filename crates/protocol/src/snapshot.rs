//! Backward replay of issue lifecycles into open-issue time series.
//!
//! The replay starts at "now", floored to a multiple of the step size, and
//! walks backward one step at a time. At every checkpoint it counts, per
//! repository, the issues that existed and were not yet closed.
//!
//! Walking backward means an issue that does not exist yet at one checkpoint
//! cannot exist at any earlier one either. Each repository's issues are laid
//! out once, newest first, and a cursor skips past issues as soon as the
//! replay moves before their creation. A repository whose cursor reaches the
//! end has no issues left and is dropped from the remaining steps.
//!
//! # Examples
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use history_protocol::{IssueMap, IssueRecord, RepoId, SnapshotBuilder, SnapshotParams};
//!
//! let repo = RepoId::new("conda/conda");
//! let mut issues = IssueMap::new();
//! issues.entry(repo.clone()).or_default().insert(
//!     1,
//!     IssueRecord::open(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
//! );
//!
//! let repos = [repo.clone()];
//! let now = Utc.with_ymd_and_hms(2024, 1, 3, 7, 30, 0).unwrap();
//! let snapshots = SnapshotBuilder::new(&issues, &repos)
//!     .build(&SnapshotParams::new(24), now)
//!     .unwrap();
//!
//! // Jan 3 and Jan 2 are after the creation time, Jan 1 is the start.
//! assert_eq!(snapshots.timestamps().len(), 2);
//! assert_eq!(snapshots.series(&repo), Some(&[1, 1][..]));
//! ```

use chrono::{DateTime, Duration, DurationRound, Timelike, Utc};
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{ProtocolError, Result};
use crate::issue::{IssueMap, IssueRecord, RepoId};

/// Key under which the checkpoint timestamps are serialized.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// How the earliest checkpoint of the replay is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StartPolicy {
    /// Use the earliest creation time among the lowest-numbered issue of
    /// every repository.
    ///
    /// Issue numbers are assigned in creation order, so this is normally the
    /// earliest issue overall. Transferred issues can break that assumption
    /// and shorten the replay.
    #[default]
    FirstIssue,
    /// Use the earliest creation time of any issue in any repository.
    EarliestCreated,
}

/// Parameters of a single replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotParams {
    /// Hours between two consecutive checkpoints.
    pub rate_hours: u32,
    /// Maximum number of checkpoints; `None` or `Some(0)` means unbounded.
    pub trim: Option<usize>,
    /// How the replay's lower bound is chosen.
    pub start_policy: StartPolicy,
}

impl SnapshotParams {
    /// Creates unbounded parameters stepping `rate_hours` at a time.
    #[must_use]
    pub fn new(rate_hours: u32) -> Self {
        Self {
            rate_hours,
            trim: None,
            start_policy: StartPolicy::default(),
        }
    }

    /// Caps the replay at `trim` checkpoints.
    #[must_use]
    pub fn with_trim(mut self, trim: Option<usize>) -> Self {
        self.trim = trim;
        self
    }

    /// Sets the start policy.
    #[must_use]
    pub fn with_start_policy(mut self, start_policy: StartPolicy) -> Self {
        self.start_policy = start_policy;
        self
    }

    fn step_cap(&self) -> Option<usize> {
        self.trim.filter(|&trim| trim > 0)
    }
}

/// Open-issue counts per repository, aligned with a descending timestamp
/// sequence.
///
/// Serializes to a single JSON object: one key per repository (in repository
/// list order) followed by [`TIMESTAMP_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshots {
    timestamps: Vec<i64>,
    series: IndexMap<RepoId, Vec<u32>>,
}

impl Snapshots {
    /// Checkpoint times in epoch milliseconds, newest first.
    #[must_use]
    pub fn timestamps(&self) -> &[i64] {
        &self.timestamps
    }

    /// Open counts of `repo`, one per checkpoint until it was dropped.
    #[must_use]
    pub fn series(&self, repo: &RepoId) -> Option<&[u32]> {
        self.series.get(repo).map(Vec::as_slice)
    }

    /// Repositories with at least one count, in insertion order.
    pub fn repos(&self) -> impl Iterator<Item = &RepoId> {
        self.series.keys()
    }

    /// Number of checkpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Returns whether no checkpoint was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

impl Serialize for Snapshots {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.series.len() + 1))?;
        for (repo, counts) in &self.series {
            map.serialize_entry(repo.as_str(), counts)?;
        }
        map.serialize_entry(TIMESTAMP_KEY, &self.timestamps)?;
        map.end()
    }
}

/// Floors `now` to the most recent checkpoint for the given step size.
///
/// Minutes and smaller units are dropped and the hour of the day is floored to
/// a multiple of `rate_hours`; steps of a day or more therefore land on
/// midnight.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidRate`] if `rate_hours` is zero.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use history_protocol::snapshot::floor_to_rate;
///
/// let now = Utc.with_ymd_and_hms(2024, 3, 10, 17, 45, 12).unwrap();
/// assert_eq!(
///     floor_to_rate(now, 3).unwrap(),
///     Utc.with_ymd_and_hms(2024, 3, 10, 15, 0, 0).unwrap()
/// );
/// assert_eq!(
///     floor_to_rate(now, 72).unwrap(),
///     Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
/// );
/// ```
pub fn floor_to_rate(now: DateTime<Utc>, rate_hours: u32) -> Result<DateTime<Utc>> {
    if rate_hours == 0 {
        return Err(ProtocolError::InvalidRate(rate_hours));
    }

    let hour = now.hour() / rate_hours * rate_hours;
    now.duration_trunc(Duration::hours(1))
        .ok()
        .and_then(|truncated| truncated.with_hour(hour))
        .ok_or(ProtocolError::TimestampOutOfRange)
}

/// Returns the lower bound of the replay for the given repositories.
///
/// Returns `None` if none of them has an issue.
#[must_use]
pub fn replay_start(
    issues: &IssueMap,
    repos: &[RepoId],
    policy: StartPolicy,
) -> Option<DateTime<Utc>> {
    let tracked = repos.iter().filter_map(|repo| issues.get(repo));
    match policy {
        StartPolicy::FirstIssue => tracked
            .filter_map(|map| map.values().next())
            .map(|issue| issue.created)
            .min(),
        StartPolicy::EarliestCreated => tracked
            .flat_map(|map| map.values())
            .map(|issue| issue.created)
            .min(),
    }
}

/// Per-repository replay state: issues newest first and the index of the
/// newest issue that still exists at the current checkpoint.
#[derive(Debug)]
struct RepoCursor<'a> {
    repo: &'a RepoId,
    issues: Vec<&'a IssueRecord>,
    next: usize,
}

impl<'a> RepoCursor<'a> {
    fn new(repo: &'a RepoId, issues: impl Iterator<Item = &'a IssueRecord>) -> Self {
        let mut issues: Vec<_> = issues.collect();
        issues.sort_by(|a, b| b.created.cmp(&a.created));
        Self {
            repo,
            issues,
            next: 0,
        }
    }

    /// Moves the cursor to `at` and returns the open count, or `None` once no
    /// issue exists anymore.
    fn open_at(&mut self, at: DateTime<Utc>) -> Option<u32> {
        while self
            .issues
            .get(self.next)
            .is_some_and(|issue| !issue.exists_at(at))
        {
            self.next += 1;
        }

        let remaining = &self.issues[self.next..];
        if remaining.is_empty() {
            return None;
        }

        let open = remaining
            .iter()
            .filter(|issue| issue.is_unclosed_at(at))
            .count();
        Some(u32::try_from(open).unwrap_or(u32::MAX))
    }
}

/// Replays an [`IssueMap`] into [`Snapshots`].
///
/// The builder only borrows the issue map, so the same map can feed several
/// replays with different parameters.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotBuilder<'a> {
    issues: &'a IssueMap,
    repos: &'a [RepoId],
}

impl<'a> SnapshotBuilder<'a> {
    /// Creates a builder over `issues`, producing series in `repos` order.
    ///
    /// Repositories missing from `issues` are ignored, as are entries of
    /// `issues` not listed in `repos`.
    #[must_use]
    pub fn new(issues: &'a IssueMap, repos: &'a [RepoId]) -> Self {
        Self { issues, repos }
    }

    /// Runs the replay.
    ///
    /// # Errors
    ///
    /// Returns an error if the step size is zero or a checkpoint falls outside
    /// the representable time range.
    pub fn build(&self, params: &SnapshotParams, now: DateTime<Utc>) -> Result<Snapshots> {
        self.build_with_progress(params, now, |_| {})
    }

    /// Runs the replay, calling `on_step` with the number of completed
    /// checkpoints after each one.
    ///
    /// # Errors
    ///
    /// See [`build`](Self::build).
    pub fn build_with_progress(
        &self,
        params: &SnapshotParams,
        now: DateTime<Utc>,
        mut on_step: impl FnMut(usize),
    ) -> Result<Snapshots> {
        let mut current = floor_to_rate(now, params.rate_hours)?;
        let step = Duration::hours(i64::from(params.rate_hours));

        let mut snapshots = Snapshots::default();
        let Some(start) = replay_start(self.issues, self.repos, params.start_policy) else {
            return Ok(snapshots);
        };

        let mut cursors: Vec<RepoCursor<'_>> = self
            .repos
            .iter()
            .filter_map(|repo| {
                self.issues
                    .get(repo)
                    .map(|issues| RepoCursor::new(repo, issues.values()))
            })
            .collect();

        let cap = params.step_cap();
        let mut steps = 0;
        while current > start && cap.is_none_or(|cap| steps < cap) {
            cursors.retain_mut(|cursor| match cursor.open_at(current) {
                Some(open) => {
                    snapshots
                        .series
                        .entry(cursor.repo.clone())
                        .or_default()
                        .push(open);
                    true
                }
                None => false,
            });
            snapshots.timestamps.push(current.timestamp_millis());

            current = current
                .checked_sub_signed(step)
                .ok_or(ProtocolError::TimestampOutOfRange)?;
            steps += 1;
            on_step(steps);
        }

        Ok(snapshots)
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// Issues expressed as hour offsets from [`epoch`].
    fn issue_strategy() -> impl Strategy<Value = IssueRecord> {
        (0i64..500, proptest::option::of(0i64..200)).prop_map(|(created, open_for)| {
            let created = epoch() + Duration::hours(created);
            IssueRecord {
                created,
                closed: open_for.map(|hours| created + Duration::hours(hours)),
            }
        })
    }

    fn issue_map_strategy() -> impl Strategy<Value = (IssueMap, Vec<RepoId>)> {
        proptest::collection::vec(proptest::collection::vec(issue_strategy(), 0..12), 1..5)
            .prop_map(|repos| {
                let mut issues = IssueMap::new();
                let mut ids = Vec::new();
                for (index, records) in repos.into_iter().enumerate() {
                    let repo = RepoId::new(format!("org/repo-{index}"));
                    issues.insert(repo.clone(), (1u64..).zip(records).collect());
                    ids.push(repo);
                }
                (issues, ids)
            })
    }

    proptest! {
        /// Tests that consecutive timestamps differ by exactly one step.
        #[test]
        fn timestamps_step_down_by_rate(
            (issues, repos) in issue_map_strategy(),
            rate in 1u32..48,
        ) {
            let now = epoch() + Duration::hours(600);
            let snapshots = SnapshotBuilder::new(&issues, &repos)
                .build(&SnapshotParams::new(rate), now)
                .unwrap();

            let step = i64::from(rate) * 3_600_000;
            for pair in snapshots.timestamps().windows(2) {
                prop_assert_eq!(pair[0] - pair[1], step);
            }
        }

        /// Tests that every series is a prefix of the timestamps and matches a
        /// brute-force count at each checkpoint.
        #[test]
        fn series_match_brute_force(
            (issues, repos) in issue_map_strategy(),
            rate in 1u32..48,
            trim in proptest::option::of(0usize..40),
        ) {
            let now = epoch() + Duration::hours(600);
            let params = SnapshotParams::new(rate)
                .with_trim(trim)
                .with_start_policy(StartPolicy::EarliestCreated);
            let snapshots = SnapshotBuilder::new(&issues, &repos).build(&params, now).unwrap();

            if let Some(cap) = trim.filter(|&t| t > 0) {
                prop_assert!(snapshots.len() <= cap);
            }

            for repo in &repos {
                let records = &issues[repo];
                let leading = snapshots
                    .timestamps()
                    .iter()
                    .take_while(|&&ms| {
                        let at = Utc.timestamp_millis_opt(ms).unwrap();
                        records.values().any(|issue| issue.exists_at(at))
                    })
                    .count();

                match snapshots.series(repo) {
                    None => prop_assert_eq!(leading, 0),
                    Some(counts) => {
                        prop_assert_eq!(counts.len(), leading);
                        for (count, &ms) in counts.iter().zip(snapshots.timestamps()) {
                            let at = Utc.timestamp_millis_opt(ms).unwrap();
                            let expected = records
                                .values()
                                .filter(|issue| issue.is_open_at(at))
                                .count();
                            prop_assert_eq!(*count as usize, expected);
                        }
                    }
                }
            }
        }

        /// Tests that a trim smaller than the full window is hit exactly.
        #[test]
        fn trim_is_exact_when_history_is_long(trim in 1usize..50) {
            let repo = RepoId::new("org/a");
            let mut issues = IssueMap::new();
            issues.entry(repo.clone()).or_default().insert(1, IssueRecord::open(epoch()));
            let repos = [repo];

            let now = epoch() + Duration::hours(1000);
            let params = SnapshotParams::new(1).with_trim(Some(trim));
            let snapshots = SnapshotBuilder::new(&issues, &repos).build(&params, now).unwrap();

            prop_assert_eq!(snapshots.len(), trim);
        }
    }
}
