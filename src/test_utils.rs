//! Shared test fixtures: PR factories and a scripted GitHub interpreter.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::effects::{GitHubEffect, GitHubInterpreter, GitHubResponse};
use crate::github::error::{ApiError, ApiErrorKind};
use crate::github::retry::{RetryConfig, RetryPolicy, retry_with_backoff};
use crate::types::{BranchFreshness, PrNumber, PrSummary, Sha};

/// Deterministic SHA derived from a number.
pub fn make_sha(n: u64) -> Sha {
    Sha::parse(format!("{:0>40x}", n)).unwrap()
}

/// An open, non-draft PR with a head branch named after its number.
pub fn make_pr(number: u64, base: &str, auto_merge: bool) -> PrSummary {
    PrSummary {
        number: PrNumber(number),
        head_ref: format!("feature-{}", number),
        base_ref: base.to_string(),
        head_sha: make_sha(number),
        auto_merge_enabled: auto_merge,
        is_draft: false,
        freshness: BranchFreshness::Unknown,
    }
}

/// Scripted behavior of `UpdateBranch` for one PR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScript {
    /// Every call updates the branch.
    Updated,

    /// Every call reports the head as already current.
    AlreadyUpToDate,

    /// First call updates; later calls report already current. This is how
    /// the real platform behaves when the base doesn't move in between.
    UpdatedThenCurrent,

    /// Every call fails with a merge conflict.
    Conflict,

    /// Every call fails with 404 (PR closed concurrently).
    NotFound,

    /// Every call fails with a credential rejection.
    PermissionDenied,

    /// First call is rate limited; the retry succeeds.
    RateLimitedThenUpdated,

    /// Every call is rate limited, exhausting retries.
    AlwaysRateLimited,
}

/// A scripted GitHub interpreter.
///
/// Mirrors the production interpreter's composition - each effect goes
/// through the same retry wrapper, just with millisecond delays - so engine
/// tests exercise the real retry path.
///
/// Listing returns the configured PR set verbatim (no base filtering), which
/// lets tests feed mismatched PRs through the reducer's defensive filter.
pub struct MockGitHub {
    prs: Vec<PrSummary>,
    list_error: Option<ApiErrorKind>,
    scripts: HashMap<PrNumber, UpdateScript>,
    calls: Mutex<Vec<GitHubEffect>>,
    attempts: Mutex<HashMap<PrNumber, u32>>,
}

impl MockGitHub {
    pub fn with_prs(prs: Vec<PrSummary>) -> Self {
        MockGitHub {
            prs,
            list_error: None,
            scripts: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            attempts: Mutex::new(HashMap::new()),
        }
    }

    /// An interpreter whose listing call fails with the given kind.
    pub fn failing_list(kind: ApiErrorKind) -> Self {
        let mut mock = Self::with_prs(Vec::new());
        mock.list_error = Some(kind);
        mock
    }

    /// Scripts the update behavior for one PR. Unscripted PRs update
    /// successfully.
    pub fn script(mut self, pr: u64, script: UpdateScript) -> Self {
        self.scripts.insert(PrNumber(pr), script);
        self
    }

    /// Number of `UpdateBranch` attempts made for a PR, retries included.
    pub fn update_attempts(&self, pr: u64) -> u32 {
        self.attempts
            .lock()
            .unwrap()
            .get(&PrNumber(pr))
            .copied()
            .unwrap_or(0)
    }

    /// The PR numbers of all `UpdateBranch` attempts, in call order.
    pub fn update_calls(&self) -> Vec<PrNumber> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|effect| match effect {
                GitHubEffect::UpdateBranch { pr } => Some(*pr),
                _ => None,
            })
            .collect()
    }

    fn execute(&self, effect: GitHubEffect) -> Result<GitHubResponse, ApiError> {
        self.calls.lock().unwrap().push(effect.clone());

        match effect {
            GitHubEffect::ListOpenPrs { .. } => match self.list_error {
                Some(kind) => Err(ApiError::new(kind, "scripted list failure")),
                None => Ok(GitHubResponse::PrList(self.prs.clone())),
            },
            GitHubEffect::UpdateBranch { pr } => {
                let attempt = {
                    let mut attempts = self.attempts.lock().unwrap();
                    let count = attempts.entry(pr).or_insert(0);
                    *count += 1;
                    *count
                };

                match self.scripts.get(&pr).copied().unwrap_or(UpdateScript::Updated) {
                    UpdateScript::Updated => Ok(GitHubResponse::BranchUpdated),
                    UpdateScript::AlreadyUpToDate => Ok(GitHubResponse::AlreadyUpToDate),
                    UpdateScript::UpdatedThenCurrent => {
                        if attempt == 1 {
                            Ok(GitHubResponse::BranchUpdated)
                        } else {
                            Ok(GitHubResponse::AlreadyUpToDate)
                        }
                    }
                    UpdateScript::Conflict => Err(ApiError::new(
                        ApiErrorKind::Conflict,
                        "merge conflict between base and head",
                    )),
                    UpdateScript::NotFound => {
                        Err(ApiError::new(ApiErrorKind::NotFound, "pull request not found"))
                    }
                    UpdateScript::PermissionDenied => Err(ApiError::new(
                        ApiErrorKind::PermissionDenied,
                        "resource not accessible by integration",
                    )),
                    UpdateScript::RateLimitedThenUpdated => {
                        if attempt == 1 {
                            Err(ApiError::new(
                                ApiErrorKind::RateLimited,
                                "API rate limit exceeded",
                            ))
                        } else {
                            Ok(GitHubResponse::BranchUpdated)
                        }
                    }
                    UpdateScript::AlwaysRateLimited => Err(ApiError::new(
                        ApiErrorKind::RateLimited,
                        "API rate limit exceeded",
                    )),
                }
            }
        }
    }

    fn retry_config() -> RetryConfig {
        RetryConfig::new(
            2,
            Duration::from_millis(1),
            Duration::from_millis(1),
            Duration::from_millis(4),
            2.0,
        )
    }
}

impl GitHubInterpreter for MockGitHub {
    async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, ApiError> {
        retry_with_backoff(Self::retry_config(), RetryPolicy::RetryTransient, || {
            std::future::ready(self.execute(effect.clone()))
        })
        .await
        .into_result()
    }
}
