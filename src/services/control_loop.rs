//! Control loop: composes the stages into a state machine.
//!
//! One pass drives the run state through monitor -> (analysis -> routing
//! -> healing | notify) | complete. Any stage may land in `error`, which
//! halts automatic progression but preserves the accumulated state for
//! inspection. A pass never raises out of the loop uncaught.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::models::{Config, RepoTarget, RouteAction, RunState, RunStatus};
use crate::domain::ports::Oracle;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::github::GitHubClient;

use super::analysis::AnalysisStage;
use super::healing::HealingStage;
use super::monitor::MonitorStage;
use super::{notify, routing};

/// Drives one run state through monitoring passes.
///
/// Owns the state exclusively; stages receive it by sequential hand-off,
/// never concurrently. Clients are constructed once at process start and
/// injected here, so there is no hidden global connection shared across
/// passes or tests.
pub struct ControlLoop {
    state: RunState,
    monitor: MonitorStage,
    analysis: AnalysisStage,
    healing: HealingStage,
}

impl ControlLoop {
    pub fn new(
        name: impl Into<String>,
        target: RepoTarget,
        github: GitHubClient,
        oracle: Arc<dyn Oracle>,
    ) -> Self {
        Self {
            state: RunState::new(name, "ci-failure-monitor", target),
            monitor: MonitorStage::new(github.clone()),
            analysis: AnalysisStage::new(github.clone(), oracle),
            healing: HealingStage::new(github),
        }
    }

    /// Build a loop from a loaded configuration, carrying over the
    /// monitoring limits.
    pub fn from_config(config: &Config, github: GitHubClient, oracle: Arc<dyn Oracle>) -> Self {
        let target = RepoTarget {
            owner: config.target.owner.clone(),
            repo: config.target.repo.clone(),
            branch: config.target.branch.clone(),
        };
        let mut control_loop = Self::new("mender", target, github, oracle);
        control_loop.state.max_failed_runs = config.monitor.max_failed_runs;
        control_loop.state.monitoring_interval_secs = config.monitor.interval_secs;
        control_loop
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn into_state(self) -> RunState {
        self.state
    }

    /// Validate the target and arm the state machine.
    ///
    /// A missing owner or repository is a configuration error, terminal
    /// for the pass: the state lands in `error` and `run_pass` becomes a
    /// no-op.
    pub fn initialize(&mut self) -> DomainResult<()> {
        if self.state.target.owner.trim().is_empty() || self.state.target.repo.trim().is_empty() {
            let err = DomainError::Configuration(
                "repository owner and name are required".to_string(),
            );
            self.state.fail(err.to_string());
            return Err(err);
        }

        self.state.goals = vec![
            format!(
                "Monitor {} for failing workflow runs",
                self.state.target.full_name()
            ),
            "Classify each failure and retry the ones likely to heal".to_string(),
            "Escalate everything else to humans with a summary".to_string(),
        ];
        self.state.sub_tasks = vec![
            "Poll for failed workflow runs".to_string(),
            "Analyze failure logs".to_string(),
            "Route failures to healing or notification".to_string(),
            "Retry healable failures".to_string(),
        ];

        self.state.transition(RunStatus::Initialized)?;
        self.state.monitoring_started_at = Some(chrono::Utc::now());
        self.state.record(format!(
            "Initialized monitoring for {} (branch {})",
            self.state.target.full_name(),
            self.state.target.branch
        ));
        info!(
            repo = %self.state.target.full_name(),
            branch = %self.state.target.branch,
            "control loop initialized"
        );
        Ok(())
    }

    /// Run one full pass: monitor, then analyze/route/heal-or-notify as
    /// the detected failures dictate.
    ///
    /// Always leaves the state in a terminal, inspectable status.
    /// `processed_runs` and `detected_failures` survive into the next
    /// pass; a non-error terminal re-enters monitoring on the next call.
    #[instrument(skip(self), fields(repo = %self.state.target.full_name(), pass = self.state.total_checks + 1))]
    pub async fn run_pass(&mut self) {
        if self.state.status == RunStatus::Error {
            warn!("control loop is halted in error state, pass skipped");
            return;
        }
        if self.state.status == RunStatus::Created {
            // Callers normally initialize explicitly; absorb the error
            // here so a pass never raises.
            if self.initialize().is_err() {
                return;
            }
        }

        self.monitor.execute(&mut self.state).await;
        if self.state.status != RunStatus::Monitoring {
            // Complete (nothing to analyze) or error.
            return;
        }

        self.analysis.execute(&mut self.state).await;
        if self.state.status != RunStatus::AnalysisComplete {
            return;
        }

        if let Err(err) = self.state.transition(RunStatus::Routing) {
            self.state.fail(err.to_string());
            return;
        }
        let decision = routing::decide(&self.state.detected_failures);
        self.state.record(format!(
            "Routing decision: {} ({})",
            decision.action.as_str(),
            decision.reasoning
        ));
        let action = decision.action;
        self.state.routing = Some(decision);

        match action {
            RouteAction::Heal => self.healing.execute(&mut self.state).await,
            RouteAction::Notify => self.notify(),
            RouteAction::End => {
                if let Err(err) = self.state.transition(RunStatus::Complete) {
                    self.state.fail(err.to_string());
                }
            }
        }
    }

    /// Produce the escalation summary. The transport is an external
    /// collaborator; the loop's obligation ends here.
    fn notify(&mut self) {
        let decision = self
            .state
            .routing
            .clone()
            .unwrap_or_else(|| routing::decide(&self.state.detected_failures));
        let summary = notify::build_summary(&decision, &self.state.detected_failures);

        self.state.record(format!(
            "Escalating {} failures for human review",
            summary.unhealable.len()
        ));
        self.state.current_task = Some("Escalation summary produced".to_string());
        self.state.notification = Some(summary);

        if let Err(err) = self.state.transition(RunStatus::Notify) {
            self.state.fail(err.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::RetryConfig;
    use crate::infrastructure::github::GitHubClientConfig;

    struct NullOracle;

    #[async_trait::async_trait]
    impl Oracle for NullOracle {
        async fn classify(
            &self,
            _run: &crate::domain::models::WorkflowRun,
            _logs: &str,
        ) -> crate::domain::models::ClassificationResult {
            unreachable!("oracle must not be called");
        }

        fn model(&self) -> &str {
            "null"
        }
    }

    fn control_loop(owner: &str, repo: &str) -> ControlLoop {
        let github = GitHubClient::new(GitHubClientConfig {
            token: "ghp_test".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_secs: 1,
            retry: RetryConfig {
                max_attempts: 1,
                initial_backoff_secs: 0,
                max_backoff_secs: 0,
            },
        })
        .unwrap();
        ControlLoop::new(
            "test-loop",
            RepoTarget {
                owner: owner.to_string(),
                repo: repo.to_string(),
                branch: "main".to_string(),
            },
            github,
            Arc::new(NullOracle),
        )
    }

    #[test]
    fn test_initialize_validates_target() {
        let mut cl = control_loop("", "hello");
        let err = cl.initialize().unwrap_err();
        assert!(matches!(err, DomainError::Configuration(_)));
        assert_eq!(cl.state().status, RunStatus::Error);
        assert!(cl.state().last_error.is_some());
    }

    #[test]
    fn test_initialize_installs_goals_and_sub_tasks() {
        let mut cl = control_loop("octo", "hello");
        cl.initialize().unwrap();
        assert_eq!(cl.state().status, RunStatus::Initialized);
        assert!(!cl.state().goals.is_empty());
        assert!(!cl.state().sub_tasks.is_empty());
        assert!(cl.state().monitoring_started_at.is_some());
    }

    #[tokio::test]
    async fn test_pass_on_errored_loop_is_a_no_op() {
        let mut cl = control_loop("", "hello");
        let _ = cl.initialize();
        let checks_before = cl.state().total_checks;
        cl.run_pass().await;
        assert_eq!(cl.state().status, RunStatus::Error);
        assert_eq!(cl.state().total_checks, checks_before);
    }

    #[tokio::test]
    async fn test_unreachable_platform_is_absorbed() {
        // The client points at a closed port: the monitor stage must
        // absorb the transport error into the state instead of raising.
        let mut cl = control_loop("octo", "hello");
        cl.initialize().unwrap();
        cl.run_pass().await;
        assert_eq!(cl.state().status, RunStatus::Error);
        assert!(cl.state().last_error.is_some());
    }
}
