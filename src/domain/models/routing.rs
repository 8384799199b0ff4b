//! Routing decision model.
//!
//! The decision is a pure function of the analyzed failure set, recomputed
//! on every routing pass. The computation itself lives in
//! [`crate::services::routing`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow_run::FailureRecord;

/// Action chosen for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAction {
    /// Retry the eligible runs automatically.
    Heal,
    /// Escalate to humans with a summary.
    Notify,
    /// Nothing to do.
    End,
}

impl RouteAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heal => "heal",
            Self::Notify => "notify",
            Self::End => "end",
        }
    }
}

/// Aggregated counts behind a routing decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub action: RouteAction,
    pub total_failures: usize,
    pub healable_count: usize,
    pub flaky_count: usize,
    pub critical_count: usize,
    pub reasoning: String,
}

/// Payload handed to the (external) notification channel: the decision
/// plus the failures automation will not touch. Producing this summary is
/// where the control loop's obligation ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub decision: RoutingDecision,
    pub unhealable: Vec<FailureRecord>,
    pub generated_at: DateTime<Utc>,
}
