//! The cascade reducer.
//!
//! One invocation per base-branch event: list open PRs targeting the base,
//! keep the auto-merge-armed ones, and request a branch update for each.
//! There is no persistent state and no scheduling - the run is a pure
//! function of "current open PRs + current base tip", and convergence of the
//! whole PR set comes from the platform firing a new event after every merge.
//!
//! # Propagation policy
//!
//! Per-PR failures (conflicts, vanished PRs, exhausted retries) are recorded
//! and skipped; they will be retried on the next event. Only a rejected
//! credential aborts the run, because no later update could succeed either.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::error::{ApiError, ApiErrorKind};
use crate::types::{PrNumber, PrSummary};

/// Errors that abort a cascade run.
#[derive(Debug, Error)]
pub enum CascadeError {
    /// Listing open PRs failed. Nothing was attempted.
    #[error("failed to list open pull requests for base {base:?}: {source}")]
    ListFailed {
        base: String,
        #[source]
        source: ApiError,
    },

    /// The credential was rejected mid-run. Updates recorded before the
    /// rejection are carried in `completed`.
    #[error("credential rejected while updating {pr}: {source}")]
    PermissionDenied {
        pr: PrNumber,
        #[source]
        source: ApiError,
        completed: Vec<PrReport>,
    },

    /// The interpreter answered an effect with the wrong response variant.
    #[error("interpreter returned an unexpected response while {context}")]
    UnexpectedResponse { context: &'static str },
}

/// Outcome of one candidate PR within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PrOutcome {
    /// The head branch was updated with the base tip.
    Updated,

    /// The head already contained the base tip; nothing was done.
    AlreadyCurrent,

    /// The base could not be merged automatically; manual resolution is
    /// needed. Retried (and re-reported) on the next event.
    Conflict { message: String },

    /// The PR disappeared mid-run (closed or deleted concurrently).
    Vanished,

    /// The update failed for another PR-scoped reason (e.g., retries
    /// exhausted on a rate limit).
    Failed { message: String },
}

impl PrOutcome {
    /// Short label for log lines and the run summary.
    pub fn label(&self) -> &'static str {
        match self {
            PrOutcome::Updated => "updated",
            PrOutcome::AlreadyCurrent => "already up to date",
            PrOutcome::Conflict { .. } => "conflict",
            PrOutcome::Vanished => "vanished",
            PrOutcome::Failed { .. } => "failed",
        }
    }
}

/// Per-PR record in the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrReport {
    pub pr: PrNumber,
    pub head_ref: String,
    #[serde(flatten)]
    pub outcome: PrOutcome,
}

/// The result of a completed cascade run.
///
/// A run that completes iteration is a success regardless of individual PR
/// outcomes; partial failure is the expected steady state of the cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The base branch this run leveled against.
    pub base: String,

    /// One report per candidate, in processing order.
    pub reports: Vec<PrReport>,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunSummary {
    /// Number of candidates whose outcome matches the given predicate.
    pub fn count(&self, pred: impl Fn(&PrOutcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Selects and orders the candidate PRs for a run.
///
/// Keeps open PRs that target `base` and have auto-merge armed, ascending by
/// PR number. Processing order does not affect the eventual fixed point
/// (every update is independently idempotent), but a deterministic order
/// makes runs reproducible and logs comparable.
///
/// The listing is already server-side filtered by base; the base check here
/// is a guard against acting on unrelated PRs if the listing ever
/// misbehaves.
pub fn candidates(base: &str, prs: Vec<PrSummary>) -> Vec<PrSummary> {
    let mut out: Vec<PrSummary> = prs
        .into_iter()
        .filter(|pr| {
            if !pr.targets(base) {
                tracing::warn!(
                    pr = %pr.number,
                    base_ref = %pr.base_ref,
                    expected = base,
                    "listing returned a PR for a different base; discarding"
                );
                return false;
            }
            pr.auto_merge_enabled
        })
        .collect();
    out.sort_by_key(|pr| pr.number);
    out
}

/// Runs one cascade: list, filter, update each candidate, record outcomes.
///
/// Returns `Ok` with a summary when the iteration completed (individual PR
/// failures included), `Err` when listing failed or the credential was
/// rejected.
pub async fn run_cascade<I: GitHubInterpreter>(
    github: &I,
    base: &str,
) -> Result<RunSummary, CascadeError> {
    let started_at = Utc::now();

    let response = github
        .interpret(GitHubEffect::ListOpenPrs {
            base: base.to_string(),
        })
        .await
        .map_err(|source| CascadeError::ListFailed {
            base: base.to_string(),
            source,
        })?;

    let GitHubResponse::PrList(prs) = response else {
        return Err(CascadeError::UnexpectedResponse {
            context: "listing open pull requests",
        });
    };

    let candidates = candidates(base, prs);
    tracing::info!(base, count = candidates.len(), "collected cascade candidates");

    let mut reports = Vec::with_capacity(candidates.len());
    for pr in &candidates {
        let outcome = match github
            .interpret(GitHubEffect::UpdateBranch { pr: pr.number })
            .await
        {
            Ok(GitHubResponse::BranchUpdated) => {
                tracing::info!(pr = %pr.number, head = %pr.head_ref, "head branch updated");
                PrOutcome::Updated
            }
            Ok(GitHubResponse::AlreadyUpToDate) => {
                tracing::debug!(pr = %pr.number, head = %pr.head_ref, "head already up to date");
                PrOutcome::AlreadyCurrent
            }
            Ok(_) => {
                tracing::error!(pr = %pr.number, "interpreter returned an unexpected response");
                PrOutcome::Failed {
                    message: "unexpected interpreter response".to_string(),
                }
            }
            Err(e) if e.kind == ApiErrorKind::PermissionDenied => {
                tracing::error!(pr = %pr.number, error = %e, "credential rejected; aborting run");
                return Err(CascadeError::PermissionDenied {
                    pr: pr.number,
                    source: e,
                    completed: reports,
                });
            }
            Err(e) if e.kind == ApiErrorKind::Conflict => {
                tracing::warn!(pr = %pr.number, head = %pr.head_ref, error = %e, "merge conflict; skipping");
                PrOutcome::Conflict { message: e.message }
            }
            Err(e) if e.kind == ApiErrorKind::NotFound => {
                tracing::info!(pr = %pr.number, "PR vanished mid-run; skipping");
                PrOutcome::Vanished
            }
            Err(e) => {
                tracing::warn!(pr = %pr.number, error = %e, "branch update failed; skipping");
                PrOutcome::Failed {
                    message: e.to_string(),
                }
            }
        };
        reports.push(PrReport {
            pr: pr.number,
            head_ref: pr.head_ref.clone(),
            outcome,
        });
    }

    Ok(RunSummary {
        base: base.to_string(),
        reports,
        started_at,
        finished_at: Utc::now(),
    })
}
