//! End-to-end tests: fetch through the scheduler, replay, render.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use history_github::{
    FetchScheduler, IssueCache, IssueFetcher, IssuePage, IssueSource, NoProgress, SourceIssue,
};
use history_protocol::output::render_snapshot_module;
use history_protocol::{RepoId, SnapshotBuilder, SnapshotParams};
use tempfile::TempDir;

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).unwrap()
}

fn issue(number: u64, created: DateTime<Utc>, closed: Option<DateTime<Utc>>) -> SourceIssue {
    SourceIssue {
        number,
        created_at: created,
        closed_at: closed,
        is_pull_request: false,
    }
}

/// Serves one page per repository.
#[derive(Default)]
struct StaticSource(HashMap<RepoId, Vec<SourceIssue>>);

impl IssueSource for StaticSource {
    async fn fetch_page(&self, repo: &RepoId, _page: u32) -> history_github::Result<IssuePage> {
        Ok(IssuePage {
            issues: self.0.get(repo).cloned().unwrap_or_default(),
            has_next: false,
        })
    }
}

fn repos() -> Vec<RepoId> {
    vec![RepoId::new("acme/a"), RepoId::new("acme/b")]
}

fn source() -> StaticSource {
    let [a, b] = [RepoId::new("acme/a"), RepoId::new("acme/b")];
    StaticSource(HashMap::from([
        (
            a,
            vec![
                issue(1, at(7, 0), Some(at(9, 0))),
                issue(2, at(8, 12), None),
                SourceIssue {
                    is_pull_request: true,
                    ..issue(3, at(7, 0), None)
                },
            ],
        ),
        (b, vec![issue(1, at(9, 0), None)]),
    ]))
}

async fn fetch(source: StaticSource, cache_dir: &TempDir) -> history_protocol::IssueMap {
    let cache = IssueCache::with_path(cache_dir.path().to_path_buf()).unwrap();
    let scheduler = FetchScheduler::new(IssueFetcher::new(source, cache));
    scheduler
        .fetch_all(&repos(), Arc::new(NoProgress))
        .await
        .unwrap()
}

const EXPECTED: &str = "const year = \
    {\"acme/a\":[1,1,1],\"acme/b\":[1,1],\"timestamp\":[1710028800000,1709942400000,1709856000000]};\n\
    export default year;\n";

#[tokio::test]
async fn daily_replay_counts_boundaries_and_drops_young_repos() {
    let cache_dir = TempDir::new().unwrap();
    let issues = fetch(source(), &cache_dir).await;

    let list = repos();
    let snapshots = SnapshotBuilder::new(&issues, &list)
        .build(&SnapshotParams::new(24), at(10, 14))
        .unwrap();

    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots.series(&list[0]), Some(&[1, 1, 1][..]));
    assert_eq!(snapshots.series(&list[1]), Some(&[1, 1][..]));
    assert_eq!(render_snapshot_module("year", &snapshots).unwrap(), EXPECTED);
}

#[tokio::test]
async fn second_run_is_served_from_cache() {
    let cache_dir = TempDir::new().unwrap();
    let first = fetch(source(), &cache_dir).await;
    let second = fetch(StaticSource::default(), &cache_dir).await;

    assert_eq!(first, second);

    let list = repos();
    let snapshots = SnapshotBuilder::new(&second, &list)
        .build(&SnapshotParams::new(24), at(10, 14))
        .unwrap();
    assert_eq!(render_snapshot_module("year", &snapshots).unwrap(), EXPECTED);
}

#[tokio::test]
async fn trim_caps_the_number_of_steps() {
    let cache_dir = TempDir::new().unwrap();
    let issues = fetch(source(), &cache_dir).await;

    let list = repos();
    let snapshots = SnapshotBuilder::new(&issues, &list)
        .build(&SnapshotParams::new(1).with_trim(Some(5)), at(10, 14))
        .unwrap();

    assert_eq!(snapshots.len(), 5);
    assert_eq!(snapshots.timestamps()[0], at(10, 14).timestamp_millis());
    assert!(
        snapshots
            .timestamps()
            .windows(2)
            .all(|pair| pair[0] - pair[1] == 3_600_000)
    );
}
