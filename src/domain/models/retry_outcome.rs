//! Per-attempt retry records produced by the healing stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of one re-trigger attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStatus {
    /// The platform accepted the rerun request.
    Success,
    /// The platform rejected the rerun (bad run reference, not retryable).
    Failed,
    /// The rerun call itself failed (transport, rate limit).
    Error,
}

impl RetryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }
}

/// One retry attempt against one run. Appended regardless of result;
/// a failure never aborts the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryOutcome {
    pub run_id: u64,
    pub run_number: u64,
    pub status: RetryStatus,
    /// Why this run was eligible (flaky, healable category).
    pub reason: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Tally of one healing pass. Outcomes are append-only and scoped to the
/// pass that produced them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryReport {
    pub total_retried: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub outcomes: Vec<RetryOutcome>,
}

impl RetryReport {
    /// Record an attempted retry.
    pub fn record(&mut self, outcome: RetryOutcome) {
        self.total_retried += 1;
        match outcome.status {
            RetryStatus::Success => self.successful += 1,
            RetryStatus::Failed => self.failed += 1,
            RetryStatus::Error => self.errors += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Record a run that was not eligible for retry.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }
}
