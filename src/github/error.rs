//! GitHub API error taxonomy.
//!
//! The cascade's propagation policy hangs off the error kind:
//!
//! - `Conflict` and `Other` are PR-scoped: logged, the PR is skipped, the run
//!   continues. The PR will be retried on the next base-branch event.
//! - `NotFound` is a recoverable no-op (the PR was closed mid-run).
//! - `RateLimited` and `Transient` are retried with backoff before being
//!   surfaced; if surfaced, they are still PR-scoped.
//! - `PermissionDenied` is fatal for the whole run: no later update can
//!   succeed with the same credential.

use std::fmt;
use thiserror::Error;

/// The kind of GitHub API error, categorized for the cascade's propagation
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    /// The merge cannot be performed automatically (divergent history needing
    /// manual resolution). PR-scoped, never retried.
    Conflict,

    /// The credential lacks access (401, or 403 without rate-limit markers).
    /// Fatal for the run.
    PermissionDenied,

    /// The PR disappeared mid-run (closed or deleted concurrently).
    /// Recoverable no-op.
    NotFound,

    /// Primary or secondary rate limit (429, or 403 with rate-limit markers).
    /// Retried with a long backoff.
    RateLimited,

    /// Server errors (5xx) and network failures. Retried with a short
    /// backoff.
    Transient,

    /// Any other permanent API failure. PR-scoped.
    Other,
}

impl ApiErrorKind {
    /// Returns true if a retry with backoff may succeed.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ApiErrorKind::RateLimited | ApiErrorKind::Transient)
    }

    /// Returns true if the error dooms the rest of the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ApiErrorKind::PermissionDenied)
    }
}

/// A GitHub API error with categorization.
#[derive(Debug, Error)]
pub struct ApiError {
    /// The categorized kind.
    pub kind: ApiErrorKind,

    /// The HTTP status code, if one could be determined.
    pub status_code: Option<u16>,

    /// A human-readable description.
    pub message: String,

    /// The underlying octocrab error, if any.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl ApiError {
    /// Creates an error of the given kind with no underlying source.
    ///
    /// Mostly useful for mocks and for failures detected on our side (e.g., a
    /// malformed API response).
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        ApiError {
            kind,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// Categorizes an octocrab error by status code and message patterns.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = extract_status_code(&err);
        let message = err.to_string();

        let kind = match status_code {
            Some(401) => ApiErrorKind::PermissionDenied,
            Some(403) if is_rate_limit_message(&message) => ApiErrorKind::RateLimited,
            Some(403) => ApiErrorKind::PermissionDenied,
            Some(404) => ApiErrorKind::NotFound,
            Some(429) => ApiErrorKind::RateLimited,
            Some(code) if (500..600).contains(&code) => ApiErrorKind::Transient,
            Some(409) | Some(422) if is_merge_conflict_message(&message) => ApiErrorKind::Conflict,
            Some(_) => ApiErrorKind::Other,
            None => {
                if is_rate_limit_message(&message) {
                    ApiErrorKind::RateLimited
                } else if is_network_error_message(&message) {
                    ApiErrorKind::Transient
                } else {
                    ApiErrorKind::Other
                }
            }
        };

        ApiError {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }
}

/// Extracts the HTTP status code from an octocrab error, if present.
///
/// octocrab's `Error` doesn't expose a stable status-code accessor across all
/// of its variants, so this falls back to message parsing. `None` is the safe
/// answer: it leads to conservative categorization in `from_octocrab`.
fn extract_status_code(err: &octocrab::Error) -> Option<u16> {
    if let octocrab::Error::GitHub { source, .. } = err {
        return Some(source.status_code.as_u16());
    }

    let err_str = err.to_string();
    if let Some(idx) = err_str.find("status: ") {
        let rest = &err_str[idx + 8..];
        let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
        if let Ok(code) = digits.parse() {
            return Some(code);
        }
    }

    None
}

/// Checks if a message indicates a primary or secondary rate limit.
pub(crate) fn is_rate_limit_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("rate limit")
        || message.contains("api rate")
        || message.contains("secondary rate")
        || message.contains("abuse detection")
}

/// Checks if a message indicates that GitHub could not merge base into head.
///
/// GitHub reports this as 422 with a "merge conflict" validation message on
/// the update-branch endpoint.
pub(crate) fn is_merge_conflict_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("merge conflict") || message.contains("not mergeable")
}

/// Checks if a message indicates a network-level failure.
pub(crate) fn is_network_error_message(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("timeout")
        || message.contains("timed out")
        || message.contains("connection")
        || message.contains("network")
        || message.contains("dns")
}
