//! GitHub API integration: repo-scoped client, error taxonomy, retry, and
//! the octocrab-backed effect interpreter.

pub mod client;
pub mod error;
pub mod interpreter;
pub mod retry;

pub use client::RepoClient;
pub use error::{ApiError, ApiErrorKind};
pub use interpreter::interpret_github_effect;
pub use retry::{RetryConfig, RetryPolicy, RetryResult, retry_with_backoff};
