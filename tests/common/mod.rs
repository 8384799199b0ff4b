//! Shared helpers for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use mender::domain::models::{
    ClassificationResult, ErrorCategory, RepoTarget, RetryConfig, Severity, WorkflowRun,
};
use mender::domain::ports::Oracle;
use mender::infrastructure::github::{GitHubClient, GitHubClientConfig};

/// Client pointed at a mock server, with instant retries so tests stay
/// fast.
pub fn github_client(base_url: &str) -> GitHubClient {
    GitHubClient::new(GitHubClientConfig {
        token: "ghp_test_token".to_string(),
        base_url: base_url.to_string(),
        timeout_secs: 5,
        retry: RetryConfig {
            max_attempts: 3,
            initial_backoff_secs: 0,
            max_backoff_secs: 0,
        },
    })
    .expect("client should build")
}

pub fn target() -> RepoTarget {
    RepoTarget {
        owner: "octo".to_string(),
        repo: "hello".to_string(),
        branch: "main".to_string(),
    }
}

/// A workflow run as the platform reports it.
pub fn run_json(id: u64, run_number: u64, conclusion: &str) -> serde_json::Value {
    json!({
        "id": id,
        "run_number": run_number,
        "name": "CI",
        "status": "completed",
        "conclusion": conclusion,
        "head_branch": "main",
        "head_sha": format!("sha{id}"),
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:05:00Z",
        "html_url": format!("https://github.com/octo/hello/actions/runs/{id}")
    })
}

/// One page of the runs listing endpoint.
pub fn runs_page(runs: Vec<serde_json::Value>) -> serde_json::Value {
    json!({
        "total_count": runs.len(),
        "workflow_runs": runs
    })
}

/// Build a classification with the fields routing and healing care about.
pub fn classification(
    category: ErrorCategory,
    severity: Severity,
    is_flaky: bool,
    confidence: f64,
) -> ClassificationResult {
    ClassificationResult {
        error_category: category,
        error_type: "scripted".to_string(),
        severity,
        root_cause: "scripted root cause".to_string(),
        affected_components: Default::default(),
        is_flaky,
        confidence_score: confidence,
        suggested_fix: "retry".to_string(),
        reasoning: "scripted".to_string(),
        parse_error: false,
        oracle_error: None,
        analyzed_at: Utc::now(),
        model: "scripted".to_string(),
        run_id: 0,
        run_number: 0,
    }
}

/// Oracle double that replays a fixed script of classifications, in
/// order, and counts how often it is consulted.
pub struct ScriptedOracle {
    script: Mutex<Vec<ClassificationResult>>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    pub fn new(mut script: Vec<ClassificationResult>) -> Self {
        // Popped from the back, so store reversed.
        script.reverse();
        Self {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn classify(&self, run: &WorkflowRun, _logs: &str) -> ClassificationResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut result = self
            .script
            .lock()
            .expect("script lock")
            .pop()
            .unwrap_or_else(|| ClassificationResult::parse_fallback("script exhausted"));
        result.run_id = run.id;
        result.run_number = run.run_number;
        result
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
