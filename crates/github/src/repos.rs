//! Listing the repositories of an organization.

use history_protocol::RepoId;
use tracing::{debug, info, instrument};

use crate::cache::{CachedIndex, IssueCache};
use crate::error::Result;
use crate::source::RepoSource;

/// Returns the non-archived repositories of `organization`, in listing order.
///
/// With `use_cache`, a cached index is returned as is; otherwise the list is
/// fetched from `source` and written to the cache.
///
/// # Errors
///
/// Returns an error if the listing fails or the index cannot be read or
/// written.
#[instrument(skip(source, cache))]
pub async fn organization_repos<S: RepoSource>(
    source: &S,
    cache: &IssueCache,
    organization: &str,
    use_cache: bool,
) -> Result<Vec<RepoId>> {
    if use_cache && let Some(index) = cache.load_index(organization)? {
        debug!(repos = index.repos.len(), cached_at = %index.cached_at, "using cached repository list");
        return Ok(index.repos);
    }

    let listed = source.list_repositories(organization).await?;
    let total = listed.len();
    let repos: Vec<RepoId> = listed
        .into_iter()
        .filter(|listing| !listing.archived)
        .map(|listing| listing.id)
        .collect();
    info!(repos = repos.len(), archived = total - repos.len(), "listed repositories");

    cache.save_index(organization, &CachedIndex::new(repos.clone()))?;
    Ok(repos)
}
