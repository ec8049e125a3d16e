//! Pull request summaries as seen by the cascade.
//!
//! A `PrSummary` is a read-only snapshot of what the platform reports about an
//! open PR. The bot never creates or closes PRs; it only reads summaries and
//! requests branch updates.

use serde::{Deserialize, Serialize};

use super::ids::{PrNumber, Sha};

/// Whether a PR's head branch contains the current base tip.
///
/// This is informational only. GitHub computes it lazily (and only reliably
/// under strict status checks), so candidate selection never depends on it:
/// the update-branch call itself reports "nothing to do" for an up-to-date
/// head, which is the authoritative answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchFreshness {
    /// The head already contains the base tip.
    UpToDate,

    /// The head is missing commits from the base.
    Behind,

    /// The platform has not computed the relationship (or reported a state
    /// that doesn't answer the question).
    Unknown,
}

impl BranchFreshness {
    /// Returns true if the platform positively reported the head as behind.
    pub fn is_behind(&self) -> bool {
        matches!(self, BranchFreshness::Behind)
    }
}

/// Snapshot of an open pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrSummary {
    /// The PR number.
    pub number: PrNumber,

    /// The head branch name (the branch carrying the proposed changes).
    pub head_ref: String,

    /// The base branch name (the branch the PR targets).
    pub base_ref: String,

    /// The current tip of the head branch.
    pub head_sha: Sha,

    /// Whether auto-merge is armed on this PR.
    pub auto_merge_enabled: bool,

    /// Whether the PR is a draft. GitHub refuses to arm auto-merge on drafts,
    /// so candidates are never drafts in practice; the flag is kept for
    /// logging.
    pub is_draft: bool,

    /// Whether the head is known to be behind the base.
    pub freshness: BranchFreshness,
}

impl PrSummary {
    /// Returns true if this PR targets the given base branch.
    pub fn targets(&self, base: &str) -> bool {
        self.base_ref == base
    }
}
