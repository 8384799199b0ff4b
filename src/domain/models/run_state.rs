//! Run state: the single mutable record threaded through every stage.
//!
//! Exactly one stage holds the state at a time; hand-off is sequential, so
//! no field needs interior locking. `memory` is append-only and never
//! truncated; `processed_runs` only grows.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::classification::AnalysisSummary;
use super::retry_outcome::RetryReport;
use super::routing::{NotificationSummary, RoutingDecision};
use super::workflow_run::FailureRecord;
use crate::domain::errors::{DomainError, DomainResult};

/// Status of a monitoring pass in the control loop state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// State constructed, not yet validated
    #[default]
    Created,
    /// Configuration validated, ready to monitor
    Initialized,
    /// Polling the platform for failed runs
    Monitoring,
    /// Classifying detected failures through the oracle
    Analyzing,
    /// All detected failures classified
    AnalysisComplete,
    /// Computing the heal/notify decision
    Routing,
    /// Re-triggering eligible runs
    Healing,
    /// At least one retry was accepted
    HealingComplete,
    /// Retries attempted, none accepted
    HealingPartial,
    /// No retry was attempted
    HealingSkipped,
    /// Escalation summary produced for humans
    Notify,
    /// Nothing (left) to do this pass
    Complete,
    /// Unrecoverable error; automatic progression halted, state preserved
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Initialized => "initialized",
            Self::Monitoring => "monitoring",
            Self::Analyzing => "analyzing",
            Self::AnalysisComplete => "analysis_complete",
            Self::Routing => "routing",
            Self::Healing => "healing",
            Self::HealingComplete => "healing_complete",
            Self::HealingPartial => "healing_partial",
            Self::HealingSkipped => "healing_skipped",
            Self::Notify => "notify",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Terminal for one pass. Non-error terminals may re-enter
    /// `Monitoring` on the next external tick.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::HealingComplete
                | Self::HealingPartial
                | Self::HealingSkipped
                | Self::Notify
                | Self::Complete
                | Self::Error
        )
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(&self) -> Vec<RunStatus> {
        match self {
            Self::Created => vec![Self::Initialized, Self::Error],
            Self::Initialized => vec![Self::Monitoring, Self::Error],
            Self::Monitoring => vec![Self::Analyzing, Self::Complete, Self::Error],
            Self::Analyzing => vec![Self::AnalysisComplete, Self::Complete, Self::Error],
            Self::AnalysisComplete => vec![Self::Routing, Self::Error],
            Self::Routing => vec![Self::Healing, Self::Notify, Self::Complete, Self::Error],
            Self::Healing => vec![
                Self::HealingComplete,
                Self::HealingPartial,
                Self::HealingSkipped,
                Self::Error,
            ],
            // Pass terminals: the next tick re-enters monitoring.
            Self::HealingComplete
            | Self::HealingPartial
            | Self::HealingSkipped
            | Self::Notify
            | Self::Complete => vec![Self::Monitoring, Self::Error],
            Self::Error => vec![],
        }
    }

    pub fn can_transition_to(&self, new_status: Self) -> bool {
        self.valid_transitions().contains(&new_status)
    }
}

/// Repository the loop watches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoTarget {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl RepoTarget {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// The most recent absorbed error, kept for inspection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastError {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub check_number: u64,
}

/// Mutable state for one monitoring agent, owned by the control loop and
/// handed to stages exclusively, one at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub id: Uuid,
    pub name: String,
    pub role: String,
    pub status: RunStatus,
    /// Append-only ordered log of timestamped human-readable events.
    pub memory: Vec<String>,
    /// Immutable after creation.
    pub goals: Vec<String>,
    pub current_task: Option<String>,
    pub sub_tasks: Vec<String>,

    pub target: RepoTarget,
    pub max_failed_runs: usize,
    pub monitoring_interval_secs: u64,

    pub monitoring_started_at: Option<DateTime<Utc>>,
    pub total_checks: u64,
    pub last_check: Option<DateTime<Utc>>,
    pub last_failure_count: u64,

    /// Run identifiers already ingested. Monotonically non-decreasing: a
    /// run, once recorded, is never re-ingested.
    pub processed_runs: HashSet<u64>,
    /// Failures detected across the lifetime of this state.
    pub detected_failures: Vec<FailureRecord>,

    pub analysis_summary: Option<AnalysisSummary>,
    pub routing: Option<RoutingDecision>,
    pub retry_report: Option<RetryReport>,
    pub notification: Option<NotificationSummary>,
    pub last_error: Option<LastError>,

    pub last_updated: DateTime<Utc>,
}

impl RunState {
    pub fn new(name: impl Into<String>, role: impl Into<String>, target: RepoTarget) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role: role.into(),
            status: RunStatus::Created,
            memory: Vec::new(),
            goals: Vec::new(),
            current_task: None,
            sub_tasks: Vec::new(),
            target,
            max_failed_runs: 10,
            monitoring_interval_secs: 300,
            monitoring_started_at: None,
            total_checks: 0,
            last_check: None,
            last_failure_count: 0,
            processed_runs: HashSet::new(),
            detected_failures: Vec::new(),
            analysis_summary: None,
            routing: None,
            retry_report: None,
            notification: None,
            last_error: None,
            last_updated: Utc::now(),
        }
    }

    /// Append a timestamped line to the event log and refresh
    /// `last_updated`.
    pub fn record(&mut self, event: impl AsRef<str>) {
        let now = Utc::now();
        self.memory
            .push(format!("[{}] {}", now.to_rfc3339(), event.as_ref()));
        self.last_updated = now;
    }

    /// Move to a new status, enforcing the state machine.
    pub fn transition(&mut self, new_status: RunStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(new_status) {
            return Err(DomainError::InvalidStateTransition {
                from: self.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }
        self.status = new_status;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// Absorb an error: log it, remember it, halt the pass. Never panics,
    /// never propagates.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        let now = Utc::now();
        self.record(format!("ERROR: {message}"));
        self.last_error = Some(LastError {
            message,
            timestamp: now,
            check_number: self.total_checks,
        });
        self.status = RunStatus::Error;
    }

    /// Failures that have not been classified yet.
    pub fn unanalyzed_failures(&self) -> usize {
        self.detected_failures
            .iter()
            .filter(|f| f.is_unanalyzed())
            .count()
    }
}
