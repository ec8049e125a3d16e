//! Effect interpreter trait.
//!
//! The trait-based design keeps the cascade reducer pure with respect to I/O:
//! it computes which effects to run and hands them to an interpreter. The
//! production interpreter (`crate::github::RepoClient`) talks to the GitHub
//! API; tests script responses with `crate::test_utils::MockGitHub`.

use std::future::Future;

use crate::github::error::ApiError;

use super::github::{GitHubEffect, GitHubResponse};

/// Interprets GitHub effects against the GitHub API.
///
/// Implementations are scoped to a single repository, so all effects executed
/// through one interpreter instance target the same repo. Errors are always
/// `ApiError` - the cascade reducer needs the error's kind to decide between
/// skipping a PR and aborting the run, so the error type is fixed rather than
/// associated.
pub trait GitHubInterpreter {
    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, ApiError>> + Send;
}
