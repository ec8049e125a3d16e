//! Octocrab client wrapper scoped to a specific repository.
//!
//! All cascade effects are repo-scoped (`GitHubEffect` variants carry no repo
//! information), so the client binds an `Octocrab` instance to one `RepoId`
//! up front.

use octocrab::Octocrab;

use crate::types::RepoId;

/// A GitHub API client scoped to a single repository.
#[derive(Clone)]
pub struct RepoClient {
    client: Octocrab,
    repo: RepoId,
}

impl RepoClient {
    /// Creates a new client scoped to the given repository.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    /// Creates a client from an opaque bearer token.
    ///
    /// The token is whatever the environment minted for this run (a personal
    /// access token or a short-lived installation token); the bot never
    /// inspects or persists it.
    pub fn from_token(token: impl Into<String>, repo: RepoId) -> Result<Self, octocrab::Error> {
        let client = Octocrab::builder().personal_token(token.into()).build()?;
        Ok(Self::new(client, repo))
    }

    /// Creates a client from a pre-configured `Octocrab` instance, for
    /// callers that need custom authentication.
    pub fn from_octocrab(client: Octocrab, repo: RepoId) -> Self {
        Self::new(client, repo)
    }

    /// Returns a reference to the underlying octocrab client.
    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    /// Returns the repository this client is scoped to.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    /// Returns the repository owner.
    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    /// Returns the repository name.
    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }
}

impl std::fmt::Debug for RepoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}
