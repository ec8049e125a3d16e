//! GitHub effect interpreter using octocrab.
//!
//! Key implementation details:
//! - Listing uses GraphQL, because REST exposes neither `autoMergeRequest`
//!   nor `mergeStateStatus`.
//! - `UpdateBranch` uses the REST update-branch endpoint; GitHub answers an
//!   already up-to-date head with a 422 validation error ("there are no new
//!   commits on the base branch"), which is decoded here as the no-op
//!   response rather than a failure.
//! - Retriable errors are retried with exponential backoff before being
//!   surfaced.

use serde::Deserialize;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::types::{BranchFreshness, PrNumber, PrSummary, Sha};

use super::client::RepoClient;
use super::error::{ApiError, ApiErrorKind};
use super::retry::{RetryConfig, RetryPolicy, retry_with_backoff};

// ─── GraphQL Types ────────────────────────────────────────────────────────────

/// GraphQL query for open PRs targeting a base branch.
///
/// `pullRequests(baseRefName:)` filters server-side, which keeps the
/// base-match invariant out of band: unrelated PRs never even reach the
/// reducer's defensive filter.
const OPEN_PRS_QUERY: &str = r#"
query($owner: String!, $repo: String!, $base: String!, $cursor: String) {
    repository(owner: $owner, name: $repo) {
        pullRequests(states: OPEN, baseRefName: $base, first: 100, after: $cursor) {
            pageInfo {
                hasNextPage
                endCursor
            }
            nodes {
                number
                headRefName
                baseRefName
                headRefOid
                isDraft
                mergeStateStatus
                autoMergeRequest {
                    enabledAt
                }
            }
        }
    }
}
"#;

#[derive(Debug, Deserialize)]
struct OpenPrsQueryResponse {
    data: OpenPrsData,
}

#[derive(Debug, Deserialize)]
struct OpenPrsData {
    repository: Option<OpenPrsRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OpenPrsRepository {
    pull_requests: PrConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrConnection {
    page_info: PageInfo,
    nodes: Vec<PrNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PrNode {
    number: u64,
    head_ref_name: String,
    base_ref_name: String,
    head_ref_oid: String,
    is_draft: bool,
    merge_state_status: Option<String>,
    auto_merge_request: Option<AutoMergeRequest>,
}

/// Presence of this object is what "auto-merge is armed" means; the fields
/// inside are irrelevant here.
#[derive(Debug, Deserialize)]
struct AutoMergeRequest {
    #[serde(rename = "enabledAt")]
    #[allow(dead_code)]
    enabled_at: Option<String>,
}

// ─── Interpreter Implementation ───────────────────────────────────────────────

impl GitHubInterpreter for RepoClient {
    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, ApiError> {
        interpret_github_effect(
            self,
            effect,
            RetryConfig::DEFAULT,
            RetryPolicy::RetryTransient,
        )
        .await
    }
}

/// Interprets a GitHub effect, executing it against the GitHub API with the
/// given retry behavior.
pub async fn interpret_github_effect(
    client: &RepoClient,
    effect: GitHubEffect,
    retry_config: RetryConfig,
    retry_policy: RetryPolicy,
) -> Result<GitHubResponse, ApiError> {
    retry_with_backoff(retry_config, retry_policy, || {
        execute_effect(client, effect.clone())
    })
    .await
    .into_result()
}

/// Executes a single effect without retry logic.
async fn execute_effect(
    client: &RepoClient,
    effect: GitHubEffect,
) -> Result<GitHubResponse, ApiError> {
    match effect {
        GitHubEffect::ListOpenPrs { base } => list_open_prs(client, &base).await,
        GitHubEffect::UpdateBranch { pr } => update_branch(client, pr).await,
    }
}

// ─── PR Listing (GraphQL) ─────────────────────────────────────────────────────

async fn list_open_prs(client: &RepoClient, base: &str) -> Result<GitHubResponse, ApiError> {
    let mut cursor: Option<String> = None;
    let mut prs = Vec::new();

    loop {
        let response: OpenPrsQueryResponse = client
            .inner()
            .graphql(&serde_json::json!({
                "query": OPEN_PRS_QUERY,
                "variables": {
                    "owner": client.owner(),
                    "repo": client.repo_name(),
                    "base": base,
                    "cursor": cursor,
                },
            }))
            .await
            .map_err(ApiError::from_octocrab)?;

        let connection = response
            .data
            .repository
            .ok_or_else(|| {
                ApiError::new(
                    ApiErrorKind::NotFound,
                    format!("repository {} not found or not visible", client.repo()),
                )
            })?
            .pull_requests;

        for node in connection.nodes {
            if let Some(pr) = summary_from_node(node) {
                prs.push(pr);
            }
        }

        if !connection.page_info.has_next_page {
            break;
        }
        match connection.page_info.end_cursor {
            Some(c) => cursor = Some(c),
            // hasNextPage without a cursor would loop forever on page one.
            None => break,
        }
    }

    Ok(GitHubResponse::PrList(prs))
}

/// Converts a GraphQL PR node into a `PrSummary`.
///
/// Returns `None` (with a warning) for nodes the API should never produce,
/// rather than failing the whole listing over one bad record.
fn summary_from_node(node: PrNode) -> Option<PrSummary> {
    let head_sha = match Sha::parse(&node.head_ref_oid) {
        Ok(sha) => sha,
        Err(e) => {
            tracing::warn!(pr = node.number, error = %e, "skipping PR with invalid head SHA");
            return None;
        }
    };

    Some(PrSummary {
        number: PrNumber(node.number),
        head_ref: node.head_ref_name,
        base_ref: node.base_ref_name,
        head_sha,
        auto_merge_enabled: node.auto_merge_request.is_some(),
        is_draft: node.is_draft,
        freshness: freshness_from_merge_state(node.merge_state_status.as_deref()),
    })
}

/// Maps GitHub's `mergeStateStatus` onto branch freshness.
///
/// Only `BEHIND` is a positive "needs commits from base" signal, and only
/// `CLEAN` implies the head is current. Everything else (`BLOCKED`,
/// `UNSTABLE`, `DIRTY`, `UNKNOWN`, ...) doesn't answer the question.
fn freshness_from_merge_state(status: Option<&str>) -> BranchFreshness {
    match status {
        Some("BEHIND") => BranchFreshness::Behind,
        Some("CLEAN") => BranchFreshness::UpToDate,
        _ => BranchFreshness::Unknown,
    }
}

// ─── Branch Update (REST) ─────────────────────────────────────────────────────

async fn update_branch(client: &RepoClient, pr: PrNumber) -> Result<GitHubResponse, ApiError> {
    let result = client
        .inner()
        .pulls(client.owner(), client.repo_name())
        .update_branch(pr.0)
        .await;

    match result {
        Ok(_) => Ok(GitHubResponse::BranchUpdated),
        Err(e) => {
            let err = ApiError::from_octocrab(e);
            if is_nothing_to_update_message(&err.message) {
                return Ok(GitHubResponse::AlreadyUpToDate);
            }
            Err(err)
        }
    }
}

/// Checks if a 422 validation message means the head already contains the
/// base tip. GitHub phrases this as "there are no new commits on the base
/// branch".
fn is_nothing_to_update_message(message: &str) -> bool {
    message.to_lowercase().contains("no new commits")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(number: u64, auto_merge: bool) -> PrNode {
        PrNode {
            number,
            head_ref_name: format!("feature-{}", number),
            base_ref_name: "main".to_string(),
            head_ref_oid: format!("{:0>40x}", number),
            is_draft: false,
            merge_state_status: Some("BEHIND".to_string()),
            auto_merge_request: if auto_merge {
                Some(AutoMergeRequest { enabled_at: None })
            } else {
                None
            },
        }
    }

    #[test]
    fn summary_reflects_auto_merge_presence() {
        let armed = summary_from_node(node(1, true)).unwrap();
        assert!(armed.auto_merge_enabled);

        let unarmed = summary_from_node(node(2, false)).unwrap();
        assert!(!unarmed.auto_merge_enabled);
    }

    #[test]
    fn summary_rejects_invalid_sha() {
        let mut bad = node(3, true);
        bad.head_ref_oid = "not-a-sha".to_string();
        assert!(summary_from_node(bad).is_none());
    }

    #[test]
    fn freshness_mapping() {
        assert_eq!(
            freshness_from_merge_state(Some("BEHIND")),
            BranchFreshness::Behind
        );
        assert_eq!(
            freshness_from_merge_state(Some("CLEAN")),
            BranchFreshness::UpToDate
        );
        assert_eq!(
            freshness_from_merge_state(Some("BLOCKED")),
            BranchFreshness::Unknown
        );
        assert_eq!(
            freshness_from_merge_state(Some("DIRTY")),
            BranchFreshness::Unknown
        );
        assert_eq!(freshness_from_merge_state(None), BranchFreshness::Unknown);
    }

    #[test]
    fn nothing_to_update_detection() {
        assert!(is_nothing_to_update_message(
            "There are no new commits on the base branch."
        ));
        assert!(!is_nothing_to_update_message(
            "merge conflict between base and head"
        ));
        assert!(!is_nothing_to_update_message("Validation Failed"));
    }

    #[test]
    fn graphql_response_deserializes() {
        let body = serde_json::json!({
            "data": {
                "repository": {
                    "pullRequests": {
                        "pageInfo": { "hasNextPage": false, "endCursor": null },
                        "nodes": [{
                            "number": 12,
                            "headRefName": "feature-12",
                            "baseRefName": "main",
                            "headRefOid": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                            "isDraft": false,
                            "mergeStateStatus": "BEHIND",
                            "autoMergeRequest": { "enabledAt": "2026-01-01T00:00:00Z" }
                        }]
                    }
                }
            }
        });

        let parsed: OpenPrsQueryResponse = serde_json::from_value(body).unwrap();
        let connection = parsed.data.repository.unwrap().pull_requests;
        assert!(!connection.page_info.has_next_page);
        assert_eq!(connection.nodes.len(), 1);
        assert!(connection.nodes[0].auto_merge_request.is_some());
    }
}
