//! Writing output modules to disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use history_protocol::output::{
    REPOS_MODULE, module_file_name, render_repos_module, render_snapshot_module,
};
use history_protocol::{RepoId, Snapshots};
use tracing::info;

/// Writes `repos.js` into `dir`.
pub fn write_repos(dir: &Path, repos: &[RepoId]) -> anyhow::Result<PathBuf> {
    let content = render_repos_module(repos).context("failed to render repository list")?;
    write_module(dir, REPOS_MODULE, &content)
}

/// Writes `<name>.js` for one batch into `dir`.
pub fn write_batch(dir: &Path, name: &str, snapshots: &Snapshots) -> anyhow::Result<PathBuf> {
    let content = render_snapshot_module(name, snapshots)
        .with_context(|| format!("failed to render batch {name}"))?;
    write_module(dir, &module_file_name(name), &content)
}

fn write_module(dir: &Path, file_name: &str, content: &str) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), bytes = content.len(), "wrote output module");
    Ok(path)
}
