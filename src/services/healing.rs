//! Healing stage: re-trigger eligible runs, failed jobs only.

use tracing::{info, instrument, warn};

use crate::domain::models::{
    ClassificationResult, RetryOutcome, RetryReport, RetryStatus, RunState, RunStatus,
};
use crate::infrastructure::github::{GitHubApiError, GitHubClient};

/// Re-triggers the runs the routing decision judged healable.
///
/// Eligibility is recomputed per record with the same rule routing uses
/// (flaky or healable category, confidence >= 0.5). Every attempt yields a
/// [`RetryOutcome`]; a failure on one run never aborts the rest of the
/// batch. Partial failure is expected and tolerated.
pub struct HealingStage {
    github: GitHubClient,
}

impl HealingStage {
    pub fn new(github: GitHubClient) -> Self {
        Self { github }
    }

    #[instrument(skip(self, state), fields(repo = %state.target.full_name()))]
    pub async fn execute(&self, state: &mut RunState) {
        if let Err(err) = state.transition(RunStatus::Healing) {
            state.fail(err.to_string());
            return;
        }
        state.current_task = Some("Attempting to heal failures via workflow retry".to_string());

        let healable_count = state
            .routing
            .as_ref()
            .map_or(0, |decision| decision.healable_count);
        if healable_count == 0 {
            warn!("no healable failures identified, skipping retry");
            state.record("No healable failures to retry");
            if let Err(err) = state.transition(RunStatus::HealingSkipped) {
                state.fail(err.to_string());
            }
            return;
        }

        info!(healable_count, "starting healing");
        state.record(format!("Starting healing for {healable_count} failures"));

        let target = state.target.clone();
        let candidates: Vec<(u64, u64, Option<ClassificationResult>)> = state
            .detected_failures
            .iter()
            .map(|record| (record.run.id, record.run.run_number, record.analysis.clone()))
            .collect();

        let mut report = RetryReport::default();

        for (run_id, run_number, analysis) in candidates {
            let Some(reason) = retry_reason(analysis.as_ref()) else {
                info!(run_number, "skipping retry, not healable");
                report.record_skipped();
                continue;
            };

            let (status, message) = match self
                .github
                .rerun_failed_jobs(&target.owner, &target.repo, run_id)
                .await
            {
                Ok(()) => (
                    RetryStatus::Success,
                    "Rerun of failed jobs accepted".to_string(),
                ),
                Err(err @ (GitHubApiError::NotFound(_) | GitHubApiError::InvalidRequest(..))) => {
                    warn!(run_number, error = %err, "platform rejected rerun");
                    (RetryStatus::Failed, err.to_string())
                }
                Err(err) => {
                    warn!(run_number, error = %err, "rerun call failed");
                    (RetryStatus::Error, err.to_string())
                }
            };

            state.record(format!(
                "Run #{run_number}: retry {} ({reason})",
                status.as_str()
            ));
            report.record(RetryOutcome {
                run_id,
                run_number,
                status,
                reason,
                message,
                timestamp: chrono::Utc::now(),
            });
        }

        state.record(format!(
            "Healing finished: {}/{} retries accepted, {} skipped",
            report.successful, report.total_retried, report.skipped
        ));

        let final_status = if report.successful >= 1 {
            RunStatus::HealingComplete
        } else if report.total_retried == 0 {
            RunStatus::HealingSkipped
        } else {
            RunStatus::HealingPartial
        };
        info!(
            successful = report.successful,
            failed = report.failed,
            errors = report.errors,
            skipped = report.skipped,
            status = final_status.as_str(),
            "healing complete"
        );

        state.retry_report = Some(report);
        if let Err(err) = state.transition(final_status) {
            state.fail(err.to_string());
        }
    }
}

/// Why a record qualifies for retry, or `None` if it does not.
///
/// Mirrors the routing rule: flaky at confidence >= 0.5, or a healable
/// category at confidence >= 0.5.
fn retry_reason(analysis: Option<&ClassificationResult>) -> Option<String> {
    let analysis = analysis?;
    if analysis.is_flaky && analysis.confidence_score >= 0.5 {
        return Some("Flaky test detected".to_string());
    }
    if analysis.error_category.is_healable() && analysis.confidence_score >= 0.5 {
        return Some(format!("Healable {}", analysis.error_category.as_str()));
    }
    None
}
