//! GitHub API client implementation.
//!
//! This module provides the [`GitHubClient`] struct, the production
//! [`IssueSource`] and [`RepoSource`].

use history_protocol::RepoId;
use octocrab::Octocrab;
use octocrab::params::State;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::source::{IssuePage, IssueSource, RepoListing, RepoSource, SourceIssue};

/// Page size used for issue and repository listings.
pub const PAGE_SIZE: u8 = 100;

/// GitHub API client with optional authentication.
///
/// Authenticated clients have higher rate limits (5,000 req/hour vs 60
/// req/hour). A crawl of a whole organization needs the higher limit.
///
/// # Security
///
/// Tokens are stored using [`SecretString`] to prevent accidental logging
/// or exposure in debug output.
///
/// # Examples
///
/// ```no_run
/// use secrecy::SecretString;
/// use history_github::GitHubClient;
///
/// # async fn example() -> history_github::Result<()> {
/// let token = SecretString::from("ghp_your_token".to_string());
/// let client = GitHubClient::new(Some(token)).await?;
///
/// let is_valid = client.validate_token().await?;
/// println!("Token valid: {}", is_valid);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GitHubClient {
    inner: Octocrab,
    authenticated: bool,
}

impl GitHubClient {
    /// Creates a new GitHub client.
    ///
    /// # Errors
    ///
    /// Returns an error if the octocrab client fails to initialize.
    #[instrument(skip(token), fields(authenticated = token.is_some()))]
    pub async fn new(token: Option<SecretString>) -> Result<Self> {
        let builder = Octocrab::builder();
        let (inner, authenticated) = match token {
            Some(token) => {
                debug!("creating authenticated GitHub client");
                let client = builder
                    .personal_token(token.expose_secret())
                    .build()
                    .map_err(Error::Api)?;
                (client, true)
            }
            None => {
                debug!("creating unauthenticated GitHub client");
                (builder.build().map_err(Error::Api)?, false)
            }
        };

        Ok(Self {
            inner,
            authenticated,
        })
    }

    /// Validates the token by calling the `/user` endpoint.
    ///
    /// Returns `Ok(false)` for an unauthenticated client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenValidation`] if GitHub rejects the token and
    /// [`Error::Api`] for other API errors.
    #[instrument(skip(self))]
    pub async fn validate_token(&self) -> Result<bool> {
        if !self.authenticated {
            debug!("client is not authenticated, skipping validation");
            return Ok(false);
        }

        match self.inner.current().user().await {
            Ok(user) => {
                debug!(login = %user.login, "token validated successfully");
                Ok(true)
            }
            Err(octocrab::Error::GitHub { source, .. }) => {
                warn!(message = %source.message, "token validation failed");
                Err(Error::TokenValidation {
                    reason: source.message,
                })
            }
            Err(e) => {
                warn!(error = %e, "API error during token validation");
                Err(Error::Api(e))
            }
        }
    }

    /// Returns whether this client was created with a token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

impl IssueSource for GitHubClient {
    #[instrument(skip(self), fields(repo = %repo))]
    async fn fetch_page(&self, repo: &RepoId, page: u32) -> Result<IssuePage> {
        let listing = self
            .inner
            .issues(repo.owner(), repo.name())
            .list()
            .state(State::All)
            .per_page(PAGE_SIZE)
            .page(page)
            .send()
            .await
            .map_err(Error::Api)?;

        let has_next = listing.next.is_some();
        let issues = listing
            .items
            .into_iter()
            .map(|issue| SourceIssue {
                number: issue.number,
                created_at: issue.created_at,
                closed_at: issue.closed_at,
                // The issues endpoint also returns pull requests.
                is_pull_request: issue.pull_request.is_some(),
            })
            .collect();

        Ok(IssuePage { issues, has_next })
    }
}

impl RepoSource for GitHubClient {
    #[instrument(skip(self))]
    async fn list_repositories(&self, organization: &str) -> Result<Vec<RepoListing>> {
        let first = self
            .inner
            .orgs(organization)
            .list_repos()
            .per_page(PAGE_SIZE)
            .send()
            .await
            .map_err(Error::Api)?;
        let repos = self.inner.all_pages(first).await.map_err(Error::Api)?;
        debug!(count = repos.len(), "listed organization repositories");

        Ok(repos
            .into_iter()
            .map(|repo| {
                let id = match repo.full_name {
                    Some(full_name) => RepoId::new(full_name),
                    None => RepoId::new(format!("{organization}/{}", repo.name)),
                };
                RepoListing {
                    id,
                    archived: repo.archived.unwrap_or(false),
                }
            })
            .collect())
    }
}
