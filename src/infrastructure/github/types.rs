//! Wire types for the GitHub REST API v3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::WorkflowRun;

/// Repository metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub private: bool,
    #[serde(rename = "stargazers_count")]
    pub stars: u64,
    #[serde(rename = "forks_count")]
    pub forks: u64,
    #[serde(rename = "open_issues_count")]
    pub open_issues: u64,
    pub default_branch: String,
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "html_url")]
    pub url: String,
}

/// One page of workflow runs.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRunsResponse {
    pub total_count: u64,
    pub workflow_runs: Vec<WorkflowRun>,
}

/// Where a run's logs can be found, if anywhere.
///
/// Log content is never fetched inline: the platform answers with a
/// redirect to external storage, an expiry signal once logs age past the
/// retention window, or something unexpected. All three are non-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogsLocation {
    /// Logs are ready at an external download URL.
    Redirect { download_url: String },
    /// Logs have aged out of the platform's retention window.
    Expired { message: String },
    /// The platform answered, but not with logs.
    Unavailable,
}

/// Current API quota, from the `rate` block of `/rate_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u64,
    pub remaining: u64,
    pub used: u64,
    /// Epoch seconds at which the quota resets.
    pub reset: i64,
}

impl RateLimitStatus {
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reset, 0)
    }
}

/// Envelope of `/rate_limit`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RateLimitResponse {
    pub rate: RateLimitStatus,
}
