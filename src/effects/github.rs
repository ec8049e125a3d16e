//! GitHub API effect types.
//!
//! These types describe the two GitHub operations the cascade performs as
//! data, without executing them. The interpreter in `crate::github` executes
//! them against the real API; `crate::test_utils::MockGitHub` scripts them for
//! tests.

use serde::{Deserialize, Serialize};

use crate::types::{PrNumber, PrSummary};

/// A GitHub API effect.
///
/// Effects are repo-scoped: the interpreter is constructed around a single
/// repository, so effects don't carry it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GitHubEffect {
    /// List all open PRs whose base branch equals `base`.
    ListOpenPrs { base: String },

    /// Merge the current base tip into the PR's head branch, server-side.
    ///
    /// This is the platform-native "update branch" action. It is idempotent:
    /// an already up-to-date head yields `AlreadyUpToDate`, not an error and
    /// not a new commit.
    UpdateBranch { pr: PrNumber },
}

/// Response from a GitHub effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum GitHubResponse {
    /// Response to `ListOpenPrs`.
    PrList(Vec<PrSummary>),

    /// Response to `UpdateBranch`: the merge was queued and the head will
    /// advance.
    BranchUpdated,

    /// Response to `UpdateBranch`: the head already contained the base tip;
    /// nothing was done.
    AlreadyUpToDate,
}
