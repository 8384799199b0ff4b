//! Analysis stage: classify detected failures through the oracle.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::models::{AnalysisSummary, RunState, RunStatus, WorkflowRun};
use crate::domain::ports::Oracle;
use crate::infrastructure::github::{GitHubClient, LogsLocation};

/// Classifies every not-yet-analyzed failure record.
///
/// The oracle contract is infallible: parse and transport failures come
/// back as flagged fallback results, so a bad response never aborts the
/// pass. With nothing to analyze the stage is a no-op that marks the pass
/// complete without a single oracle call.
pub struct AnalysisStage {
    github: GitHubClient,
    oracle: Arc<dyn Oracle>,
}

impl AnalysisStage {
    pub fn new(github: GitHubClient, oracle: Arc<dyn Oracle>) -> Self {
        Self { github, oracle }
    }

    #[instrument(skip(self, state), fields(repo = %state.target.full_name()))]
    pub async fn execute(&self, state: &mut RunState) {
        if let Err(err) = state.transition(RunStatus::Analyzing) {
            state.fail(err.to_string());
            return;
        }
        state.current_task = Some("Analyzing workflow failures".to_string());

        let pending: Vec<usize> = state
            .detected_failures
            .iter()
            .enumerate()
            .filter(|(_, record)| record.is_unanalyzed())
            .map(|(idx, _)| idx)
            .collect();

        if pending.is_empty() {
            info!("no failures to analyze");
            state.record("No failures to analyze");
            if let Err(err) = state.transition(RunStatus::Complete) {
                state.fail(err.to_string());
            }
            return;
        }

        let total = pending.len();
        info!(total, model = self.oracle.model(), "starting failure analysis");
        state.record(format!(
            "Starting analysis of {total} failures with {}",
            self.oracle.model()
        ));

        let target = state.target.clone();
        let mut summary = AnalysisSummary::default();

        for (position, idx) in pending.into_iter().enumerate() {
            let run = state.detected_failures[idx].run.clone();
            state.current_task = Some(format!(
                "Analyzing failure {}/{total} (run #{})",
                position + 1,
                run.run_number
            ));

            let logs = self
                .fetch_failure_logs(&target.owner, &target.repo, &run)
                .await;
            let analysis = self.oracle.classify(&run, &logs).await;
            summary.record(&analysis);

            state.record(format!(
                "Run #{}: {} - {}",
                run.run_number,
                analysis.error_category.as_str(),
                truncate(&analysis.root_cause, 60)
            ));
            state.detected_failures[idx].analysis = Some(analysis);
        }

        state.record(format!(
            "Analysis complete: {} successful, {} failed, {} high confidence",
            summary.successful, summary.failed, summary.high_confidence
        ));
        state.current_task = Some(format!(
            "Analyzed {}/{} failures successfully",
            summary.successful, summary.total_analyzed
        ));
        info!(
            successful = summary.successful,
            failed = summary.failed,
            "analysis complete"
        );
        state.analysis_summary = Some(summary);

        if let Err(err) = state.transition(RunStatus::AnalysisComplete) {
            state.fail(err.to_string());
        }
    }

    /// Produce the log text handed to the oracle. Log content that is
    /// missing, expired, or unreachable becomes a bracketed marker; the
    /// stage never blocks on logs that may not exist.
    async fn fetch_failure_logs(&self, owner: &str, repo: &str, run: &WorkflowRun) -> String {
        match self.github.get_run_logs(owner, repo, run.id).await {
            Ok(LogsLocation::Redirect { download_url }) => {
                format!("[LOGS_AVAILABLE] Log archive must be downloaded separately: {download_url}")
            }
            Ok(LogsLocation::Expired { message }) => format!("[ERROR] {message}"),
            Ok(LogsLocation::Unavailable) => {
                "[NO_LOGS] No logs available for this run".to_string()
            }
            Err(err) => {
                warn!(run_id = run.id, error = %err, "log retrieval failed");
                format!("[ERROR] Failed to fetch logs: {err}")
            }
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
