//! Retry policy with exponential backoff for platform requests.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::errors::GitHubApiError;
use crate::domain::models::RetryConfig;

/// Exponential backoff retry for transient platform errors.
///
/// Backoff doubles per retry from the initial delay and is capped:
/// 2s -> 4s -> 8s -> 10s (cap) with the defaults. Only transient errors
/// (5xx, network, timeout) are retried; a rate-limit condition surfaces
/// immediately.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, first try included
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.initial_backoff_secs),
            Duration::from_secs(config.max_backoff_secs),
        )
    }

    /// Execute an operation, retrying transient failures with backoff.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, GitHubApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, GitHubApiError>>,
    {
        let mut attempt: u32 = 1;

        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => {
                    if !err.is_transient() || attempt >= self.max_attempts {
                        return Err(err);
                    }
                    let backoff = self.backoff_for(attempt);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "transient platform error, retrying"
                    );
                    sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Backoff before the retry following `attempt` (1-indexed):
    /// min(initial * 2^(attempt - 1), max).
    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_for(2), Duration::from_secs(4));
        assert_eq!(policy.backoff_for(3), Duration::from_secs(8));
        assert_eq!(policy.backoff_for(4), Duration::from_secs(10)); // capped
        assert_eq!(policy.backoff_for(5), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_succeeds_without_retry() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(50));
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, GitHubApiError>(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(50));
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(GitHubApiError::ServerError(
                            StatusCode::BAD_GATEWAY,
                            "bad gateway".to_string(),
                        ))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(50));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(GitHubApiError::Timeout)
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_never_retried() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(50));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(GitHubApiError::RateLimitExceeded { reset_at: None })
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), Duration::from_millis(50));
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<(), _> = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(GitHubApiError::NotFound("repos/o/r".to_string()))
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
