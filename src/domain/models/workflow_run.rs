//! Workflow run domain models.
//!
//! A [`WorkflowRun`] is sourced verbatim from the CI platform and never
//! constructed locally. A [`FailureRecord`] is a failed run picked up by
//! the monitor stage, later enriched with a classification by the
//! analysis stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::classification::ClassificationResult;

/// One execution of a CI workflow, as reported by the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowRun {
    /// Remote-assigned identifier, immutable and unique.
    pub id: u64,
    pub run_number: u64,
    pub name: String,
    /// Lifecycle status reported by the platform (`queued`, `in_progress`,
    /// `completed`).
    pub status: String,
    /// Set only once the run is terminal (`success`, `failure`, ...).
    pub conclusion: Option<String>,
    pub head_branch: String,
    pub head_sha: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "html_url")]
    pub url: String,
}

impl WorkflowRun {
    /// Whether the platform reports this run as a failure.
    pub fn is_failure(&self) -> bool {
        self.conclusion.as_deref() == Some("failure")
    }
}

/// A detected failure: the remote run plus the classification attached by
/// the analysis stage. Immutable after enrichment except for `analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRecord {
    #[serde(flatten)]
    pub run: WorkflowRun,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<ClassificationResult>,
}

impl FailureRecord {
    pub fn new(run: WorkflowRun) -> Self {
        Self {
            run,
            analysis: None,
        }
    }

    /// Whether this record still needs a classification.
    pub fn is_unanalyzed(&self) -> bool {
        self.analysis.is_none()
    }
}
