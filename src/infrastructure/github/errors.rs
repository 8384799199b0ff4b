//! Error types for the CI platform client.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GitHubApiError {
    /// Remaining request quota is exhausted. Fail fast: never retried,
    /// surfaced with the reset time so the caller can back off at the
    /// pass level.
    #[error("GitHub API rate limit exceeded{}", reset_hint(.reset_at))]
    RateLimitExceeded { reset_at: Option<DateTime<Utc>> },

    /// Bad repository or run reference (HTTP 404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Client-side error that will not succeed on retry (4xx)
    #[error("Invalid request ({0}): {1}")]
    InvalidRequest(StatusCode, String),

    /// Server error from the platform (5xx), retried with backoff
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Network or connection error, retried with backoff
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// Request exceeded the client timeout
    #[error("Request timeout")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Response parse error: {0}")]
    Parse(String),

    /// Client could not be constructed (missing token, bad config)
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

fn reset_hint(reset_at: &Option<DateTime<Utc>>) -> String {
    reset_at
        .map(|t| format!(", resets at {t}"))
        .unwrap_or_default()
}

impl GitHubApiError {
    /// Transient errors are retried with backoff. A rate-limit condition
    /// is deliberately NOT transient: it surfaces immediately.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GitHubApiError::ServerError(_, _) | GitHubApiError::Network(_) | GitHubApiError::Timeout
        )
    }
}

impl From<reqwest::Error> for GitHubApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GitHubApiError::Timeout
        } else {
            GitHubApiError::Network(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(
            GitHubApiError::ServerError(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string())
                .is_transient()
        );
        assert!(GitHubApiError::Timeout.is_transient());
    }

    #[test]
    fn test_rate_limit_is_not_transient() {
        let err = GitHubApiError::RateLimitExceeded { reset_at: None };
        assert!(!err.is_transient());
    }

    #[test]
    fn test_permanent_errors() {
        assert!(!GitHubApiError::NotFound("repos/o/r".to_string()).is_transient());
        assert!(!GitHubApiError::InvalidRequest(StatusCode::UNPROCESSABLE_ENTITY, String::new())
            .is_transient());
        assert!(!GitHubApiError::Configuration("no token".to_string()).is_transient());
    }

    #[test]
    fn test_rate_limit_message_includes_reset() {
        let reset = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let err = GitHubApiError::RateLimitExceeded {
            reset_at: Some(reset),
        };
        assert!(err.to_string().contains("resets at"));
    }
}
