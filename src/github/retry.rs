//! Exponential backoff retry for GitHub API calls.
//!
//! Only retriable error kinds are retried (`RateLimited`, `Transient`); all
//! other kinds are returned to the caller immediately. Rate limits use a
//! longer schedule than ordinary transient failures, since GitHub expects
//! clients to pause for tens of seconds before retrying.

use std::future::Future;
use std::time::Duration;

use super::error::{ApiError, ApiErrorKind};

/// Configuration for exponential backoff retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,

    /// Initial delay before the first retry of a transient failure.
    pub initial_delay: Duration,

    /// Initial delay before the first retry after a rate limit.
    pub rate_limit_delay: Duration,

    /// Cap for exponential growth of either schedule.
    pub max_delay: Duration,

    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    /// Default configuration: 3 retries, 2s/4s/8s for transient failures,
    /// 15s/30s/60s after rate limits.
    pub const DEFAULT: Self = Self {
        max_retries: 3,
        initial_delay: Duration::from_secs(2),
        rate_limit_delay: Duration::from_secs(15),
        max_delay: Duration::from_secs(60),
        backoff_multiplier: 2.0,
    };

    /// Creates a new retry configuration.
    pub fn new(
        max_retries: u32,
        initial_delay: Duration,
        rate_limit_delay: Duration,
        max_delay: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_retries,
            initial_delay,
            rate_limit_delay,
            max_delay,
            backoff_multiplier,
        }
    }

    /// Computes the delay for the given retry attempt (0-indexed).
    ///
    /// The base delay depends on the error kind that triggered the retry; it
    /// grows as `base * backoff_multiplier^attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32, kind: ApiErrorKind) -> Duration {
        let base = match kind {
            ApiErrorKind::RateLimited => self.rate_limit_delay,
            _ => self.initial_delay,
        };
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay_secs = base.as_secs_f64() * multiplier;
        Duration::from_secs_f64(delay_secs.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Retry policy for controlling retry behavior at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RetryPolicy {
    /// Retry retriable errors with exponential backoff.
    #[default]
    RetryTransient,

    /// Do not retry; return errors immediately.
    NoRetry,
}

/// Result of a retried operation.
#[derive(Debug)]
pub enum RetryResult<T> {
    /// The operation succeeded.
    Success(T),

    /// A retriable error persisted through all allowed attempts.
    ExhaustedRetries {
        /// The last error encountered.
        last_error: ApiError,
        /// Number of attempts made (including the initial attempt).
        attempts: u32,
    },

    /// A non-retriable error occurred; no retry was attempted.
    Aborted(ApiError),
}

impl<T> RetryResult<T> {
    /// Converts to a `Result`, collapsing both failure cases to `Err`.
    pub fn into_result(self) -> Result<T, ApiError> {
        match self {
            RetryResult::Success(v) => Ok(v),
            RetryResult::ExhaustedRetries { last_error, .. } => Err(last_error),
            RetryResult::Aborted(e) => Err(e),
        }
    }
}

/// Executes an async operation with retry.
///
/// The operation is re-invoked after a backoff delay whenever it returns a
/// retriable error, up to `config.max_retries` retries. Non-retriable errors
/// are returned immediately as `Aborted`.
pub async fn retry_with_backoff<T, F, Fut>(
    config: RetryConfig,
    policy: RetryPolicy,
    mut operation: F,
) -> RetryResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let max_attempts = match policy {
        RetryPolicy::NoRetry => 1,
        RetryPolicy::RetryTransient => config.max_retries + 1,
    };

    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return RetryResult::Success(value),
            Err(e) if !e.kind.is_retriable() => return RetryResult::Aborted(e),
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts {
                    return RetryResult::ExhaustedRetries {
                        last_error: e,
                        attempts: attempt,
                    };
                }

                let delay = config.delay_for_attempt(attempt - 1, e.kind);
                tracing::debug!(
                    attempt,
                    delay_secs = delay.as_secs_f64(),
                    error = %e,
                    "retrying GitHub API call after backoff"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
