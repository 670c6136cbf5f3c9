//! Rendering of the JavaScript data modules consumed by the dashboard.
//!
//! Two kinds of modules are produced:
//!
//! - the repository list, exported as `repos`
//! - one module per snapshot batch, exporting the [`Snapshots`] object as
//!   the default export under the batch name
//!
//! Data is embedded as compact JSON.

use serde::Serialize;

use crate::error::{ProtocolError, Result};
use crate::issue::RepoId;
use crate::snapshot::Snapshots;

/// File name of the repository list module.
pub const REPOS_MODULE: &str = "repos.js";

/// Returns whether `name` can be used as a JavaScript binding name.
///
/// Only ASCII identifiers are accepted.
///
/// # Examples
///
/// ```
/// use history_protocol::output::is_module_name;
///
/// assert!(is_module_name("alltime"));
/// assert!(is_module_name("_last7"));
/// assert!(!is_module_name("all-time"));
/// assert!(!is_module_name("7days"));
/// ```
#[must_use]
pub fn is_module_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Returns the file name of the module for batch `name`.
#[must_use]
pub fn module_file_name(name: &str) -> String {
    format!("{name}.js")
}

/// Renders the repository list module.
///
/// # Errors
///
/// Returns an error if the list cannot be serialized.
pub fn render_repos_module(repos: &[RepoId]) -> Result<String> {
    let data = to_compact_json(&repos)?;
    Ok(format!("export const repos = {data};\n"))
}

/// Renders the module for the snapshot batch `name`.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidModuleName`] if `name` is not a valid
/// identifier, or a serialization error.
pub fn render_snapshot_module(name: &str, snapshots: &Snapshots) -> Result<String> {
    if !is_module_name(name) {
        return Err(ProtocolError::InvalidModuleName(name.to_string()));
    }

    let data = to_compact_json(snapshots)?;
    Ok(format!("const {name} = {data};\nexport default {name};\n"))
}

fn to_compact_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(ProtocolError::SerializationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IssueMap, IssueRecord, SnapshotBuilder, SnapshotParams};
    use chrono::{TimeZone, Utc};

    #[test]
    fn repos_module() {
        let repos = vec![RepoId::new("conda/conda"), RepoId::new("conda/conda-build")];
        let rendered = render_repos_module(&repos).unwrap();
        insta::assert_snapshot!(rendered, @r#"export const repos = ["conda/conda","conda/conda-build"];"#);
    }

    #[test]
    fn empty_repos_module() {
        let rendered = render_repos_module(&[]).unwrap();
        assert_eq!(rendered, "export const repos = [];\n");
    }

    #[test]
    fn snapshot_module() {
        let repo = RepoId::new("conda/conda");
        let mut issues = IssueMap::new();
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let closed = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let entry = issues.entry(repo.clone()).or_default();
        entry.insert(1, IssueRecord::closed(created, closed));
        entry.insert(2, IssueRecord::open(created));

        let repos = [repo];
        let now = Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap();
        let snapshots = SnapshotBuilder::new(&issues, &repos)
            .build(&SnapshotParams::new(24), now)
            .unwrap();

        let rendered = render_snapshot_module("year", &snapshots).unwrap();
        insta::assert_snapshot!(rendered, @r#"
        const year = {"conda/conda":[1,2],"timestamp":[1704240000000,1704153600000]};
        export default year;
        "#);
    }

    #[test]
    fn empty_snapshot_module() {
        let rendered = render_snapshot_module("recent", &Snapshots::default()).unwrap();
        assert_eq!(
            rendered,
            "const recent = {\"timestamp\":[]};\nexport default recent;\n"
        );
    }

    #[test]
    fn snapshot_module_rejects_bad_names() {
        let err = render_snapshot_module("all time", &Snapshots::default()).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidModuleName(_)));
    }

    #[test]
    fn module_file_names() {
        assert_eq!(module_file_name("month"), "month.js");
        assert_eq!(REPOS_MODULE, "repos.js");
    }
}
