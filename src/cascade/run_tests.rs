//! Scenario tests for the cascade reducer, run against the scripted
//! interpreter in `test_utils`.

use super::run::{CascadeError, PrOutcome, candidates, run_cascade};
use crate::github::error::ApiErrorKind;
use crate::test_utils::{MockGitHub, UpdateScript, make_pr};
use crate::types::PrNumber;

// ─── Candidate Selection ──────────────────────────────────────────────────────

#[test]
fn auto_merge_disabled_prs_are_never_candidates() {
    let selected = candidates(
        "main",
        vec![
            make_pr(1, "main", true),
            make_pr(2, "main", false),
            make_pr(3, "main", true),
        ],
    );

    let numbers: Vec<_> = selected.iter().map(|pr| pr.number).collect();
    assert_eq!(numbers, vec![PrNumber(1), PrNumber(3)]);
}

#[test]
fn candidates_for_unrelated_base_are_discarded() {
    let selected = candidates(
        "main",
        vec![make_pr(1, "main", true), make_pr(2, "develop", true)],
    );

    let numbers: Vec<_> = selected.iter().map(|pr| pr.number).collect();
    assert_eq!(numbers, vec![PrNumber(1)]);
}

#[test]
fn candidates_are_ordered_ascending_by_number() {
    let selected = candidates(
        "main",
        vec![
            make_pr(7, "main", true),
            make_pr(3, "main", true),
            make_pr(5, "main", true),
        ],
    );

    let numbers: Vec<_> = selected.iter().map(|pr| pr.number).collect();
    assert_eq!(numbers, vec![PrNumber(3), PrNumber(5), PrNumber(7)]);
}

#[test]
fn no_qualifying_prs_yields_empty_list_not_error() {
    assert!(candidates("main", vec![make_pr(9, "main", false)]).is_empty());
    assert!(candidates("main", vec![]).is_empty());
}

// ─── Run Behavior ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn scenario_behind_disabled_and_current() {
    // Base `main` has #1 (auto-merge on, behind), #2 (auto-merge off),
    // #3 (auto-merge on, already up to date).
    let github = MockGitHub::with_prs(vec![
        make_pr(1, "main", true),
        make_pr(2, "main", false),
        make_pr(3, "main", true),
    ])
    .script(3, UpdateScript::AlreadyUpToDate);

    let summary = run_cascade(&github, "main").await.unwrap();

    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.reports[0].pr, PrNumber(1));
    assert_eq!(summary.reports[0].outcome, PrOutcome::Updated);
    assert_eq!(summary.reports[1].pr, PrNumber(3));
    assert_eq!(summary.reports[1].outcome, PrOutcome::AlreadyCurrent);

    // #2 must never be touched.
    assert_eq!(github.update_attempts(2), 0);
}

#[tokio::test]
async fn conflict_is_isolated_from_other_updates() {
    let github = MockGitHub::with_prs(vec![make_pr(5, "main", true), make_pr(7, "main", true)])
        .script(5, UpdateScript::Conflict);

    let summary = run_cascade(&github, "main").await.unwrap();

    assert_eq!(summary.reports.len(), 2);
    assert!(matches!(
        summary.reports[0].outcome,
        PrOutcome::Conflict { .. }
    ));
    assert_eq!(summary.reports[1].outcome, PrOutcome::Updated);
}

#[tokio::test]
async fn vanished_pr_is_a_recoverable_noop() {
    let github = MockGitHub::with_prs(vec![make_pr(4, "main", true), make_pr(6, "main", true)])
        .script(4, UpdateScript::NotFound);

    let summary = run_cascade(&github, "main").await.unwrap();

    assert_eq!(summary.reports[0].outcome, PrOutcome::Vanished);
    assert_eq!(summary.reports[1].outcome, PrOutcome::Updated);
}

#[tokio::test]
async fn rerun_without_base_movement_is_idempotent() {
    let github = MockGitHub::with_prs(vec![make_pr(1, "main", true)])
        .script(1, UpdateScript::UpdatedThenCurrent);

    let first = run_cascade(&github, "main").await.unwrap();
    assert_eq!(first.reports[0].outcome, PrOutcome::Updated);

    // The base didn't move, so the second run must not produce a new commit.
    let second = run_cascade(&github, "main").await.unwrap();
    assert_eq!(second.reports[0].outcome, PrOutcome::AlreadyCurrent);
    assert_eq!(github.update_attempts(1), 2);
}

#[tokio::test]
async fn updates_run_in_ascending_pr_order() {
    let github = MockGitHub::with_prs(vec![
        make_pr(7, "main", true),
        make_pr(3, "main", true),
        make_pr(5, "main", true),
    ]);

    run_cascade(&github, "main").await.unwrap();

    assert_eq!(
        github.update_calls(),
        vec![PrNumber(3), PrNumber(5), PrNumber(7)]
    );
}

#[tokio::test]
async fn empty_candidate_set_completes_successfully() {
    let github = MockGitHub::with_prs(vec![make_pr(2, "main", false)]);

    let summary = run_cascade(&github, "main").await.unwrap();

    assert!(summary.reports.is_empty());
    assert!(github.update_calls().is_empty());
}

// ─── Rate Limits ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn rate_limited_update_is_retried_with_backoff() {
    let github = MockGitHub::with_prs(vec![make_pr(1, "main", true), make_pr(2, "main", true)])
        .script(1, UpdateScript::RateLimitedThenUpdated);

    let summary = run_cascade(&github, "main").await.unwrap();

    assert_eq!(summary.reports[0].outcome, PrOutcome::Updated);
    assert_eq!(summary.reports[1].outcome, PrOutcome::Updated);
    assert_eq!(github.update_attempts(1), 2);
}

#[tokio::test]
async fn exhausted_rate_limit_does_not_abandon_the_queue() {
    let github = MockGitHub::with_prs(vec![make_pr(1, "main", true), make_pr(2, "main", true)])
        .script(1, UpdateScript::AlwaysRateLimited);

    let summary = run_cascade(&github, "main").await.unwrap();

    assert!(matches!(
        summary.reports[0].outcome,
        PrOutcome::Failed { .. }
    ));
    assert_eq!(summary.reports[1].outcome, PrOutcome::Updated);
}

// ─── Fatal Errors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn permission_denied_on_listing_attempts_no_updates() {
    let github = MockGitHub::failing_list(ApiErrorKind::PermissionDenied);

    let result = run_cascade(&github, "main").await;

    assert!(matches!(result, Err(CascadeError::ListFailed { .. })));
    assert!(github.update_calls().is_empty());
}

#[tokio::test]
async fn permission_denied_mid_run_aborts_remaining_work() {
    let github = MockGitHub::with_prs(vec![
        make_pr(1, "main", true),
        make_pr(2, "main", true),
        make_pr(3, "main", true),
    ])
    .script(2, UpdateScript::PermissionDenied);

    let result = run_cascade(&github, "main").await;

    match result {
        Err(CascadeError::PermissionDenied { pr, completed, .. }) => {
            assert_eq!(pr, PrNumber(2));
            // #1 finished before the abort; its outcome is preserved.
            assert_eq!(completed.len(), 1);
            assert_eq!(completed[0].pr, PrNumber(1));
            assert_eq!(completed[0].outcome, PrOutcome::Updated);
        }
        other => panic!("expected PermissionDenied, got {:?}", other),
    }

    // #3 must never be attempted after the fatal error.
    assert_eq!(github.update_attempts(3), 0);
}

#[tokio::test]
async fn mismatched_base_prs_are_never_updated() {
    // The listing (scripted here) claims a PR targeting another base; the
    // reducer must discard it rather than act on it.
    let github = MockGitHub::with_prs(vec![make_pr(1, "main", true), make_pr(9, "develop", true)]);

    let summary = run_cascade(&github, "main").await.unwrap();

    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].pr, PrNumber(1));
    assert_eq!(github.update_attempts(9), 0);
}
