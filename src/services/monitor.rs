//! Monitor stage: poll for failing runs and deduplicate.

use tracing::{error, info, instrument};

use crate::domain::models::{FailureRecord, RunState, RunStatus};
use crate::infrastructure::github::GitHubClient;

/// Polls the platform for failed runs and ingests the ones not seen
/// before.
///
/// Guarantee: no duplicate [`FailureRecord`] is ever created for the same
/// run identifier across the lifetime of the run state; `processed_runs`
/// only grows. Client errors are absorbed into the state (`memory`,
/// `last_error`, status `Error`); the loop never crashes on them.
pub struct MonitorStage {
    github: GitHubClient,
}

impl MonitorStage {
    pub fn new(github: GitHubClient) -> Self {
        Self { github }
    }

    #[instrument(skip(self, state), fields(repo = %state.target.full_name()))]
    pub async fn execute(&self, state: &mut RunState) {
        if let Err(err) = state.transition(RunStatus::Monitoring) {
            state.fail(err.to_string());
            return;
        }
        state.current_task = Some("Monitoring GitHub workflows for failures".to_string());

        state.total_checks += 1;
        let check = state.total_checks;
        let target = state.target.clone();
        let limit = state.max_failed_runs;

        info!(check, limit, "fetching failed runs");
        let failed = match self
            .github
            .list_failed_runs(&target.owner, &target.repo, &target.branch, Some(limit))
            .await
        {
            Ok(failed) => failed,
            Err(err) => {
                error!(error = %err, "monitoring failed");
                state.fail(format!("GitHub monitoring failed: {err}"));
                return;
            }
        };

        let total_failures = failed.len();
        let mut new_failures = 0usize;
        for run in failed {
            if state.processed_runs.contains(&run.id) {
                continue;
            }
            info!(
                run_number = run.run_number,
                name = %run.name,
                branch = %run.head_branch,
                "new failure detected"
            );
            state.processed_runs.insert(run.id);
            state.detected_failures.push(FailureRecord::new(run));
            new_failures += 1;
        }

        if new_failures > 0 {
            state.record(format!(
                "Check #{check}: detected {new_failures} new failed runs"
            ));
            state.current_task = Some(format!(
                "Processing {new_failures} newly detected failures"
            ));
        } else {
            state.record(format!("Check #{check}: no new failures detected"));
        }

        if total_failures == 0 {
            // Nothing to analyze: the pass is done.
            info!("no failures in repository, monitoring complete");
            state.current_task = Some("No failures detected - monitoring complete".to_string());
            if let Err(err) = state.transition(RunStatus::Complete) {
                state.fail(err.to_string());
                return;
            }
        }

        state.last_check = Some(chrono::Utc::now());
        state.last_failure_count = total_failures as u64;
        info!(
            check,
            new = new_failures,
            total = state.detected_failures.len(),
            "monitoring cycle complete"
        );
    }
}
