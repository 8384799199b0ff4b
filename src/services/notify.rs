//! Escalation summary for the notification channel.
//!
//! The transport is an external collaborator; the control loop's
//! obligation ends at producing this summary.

use chrono::Utc;

use crate::domain::models::{FailureRecord, NotificationSummary, RoutingDecision};

/// Assemble the payload for the notification channel: the decision plus
/// the failures automation will not retry.
pub fn build_summary(
    decision: &RoutingDecision,
    failures: &[FailureRecord],
) -> NotificationSummary {
    let unhealable = failures
        .iter()
        .filter(|record| {
            record
                .analysis
                .as_ref()
                .is_none_or(|analysis| !analysis.is_retry_eligible())
        })
        .cloned()
        .collect();

    NotificationSummary {
        decision: decision.clone(),
        unhealable,
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{
        ClassificationResult, ErrorCategory, RouteAction, Severity, WorkflowRun,
    };

    fn record(id: u64, category: ErrorCategory, is_flaky: bool, confidence: f64) -> FailureRecord {
        let mut analysis = ClassificationResult::parse_fallback("n/a");
        analysis.parse_error = false;
        analysis.error_category = category;
        analysis.severity = Severity::Medium;
        analysis.is_flaky = is_flaky;
        analysis.confidence_score = confidence;
        FailureRecord {
            run: WorkflowRun {
                id,
                run_number: id,
                name: "CI".to_string(),
                status: "completed".to_string(),
                conclusion: Some("failure".to_string()),
                head_branch: "main".to_string(),
                head_sha: "abc".to_string(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
                url: String::new(),
            },
            analysis: Some(analysis),
        }
    }

    #[test]
    fn test_summary_keeps_only_unhealable_records() {
        let decision = RoutingDecision {
            action: RouteAction::Notify,
            total_failures: 2,
            healable_count: 1,
            flaky_count: 1,
            critical_count: 1,
            reasoning: "Found 1 critical failures requiring human intervention".to_string(),
        };
        let failures = vec![
            record(1, ErrorCategory::TimeoutError, true, 0.9),
            record(2, ErrorCategory::BuildError, false, 0.9),
        ];

        let summary = build_summary(&decision, &failures);
        assert_eq!(summary.unhealable.len(), 1);
        assert_eq!(summary.unhealable[0].run.id, 2);
        assert_eq!(summary.decision.action, RouteAction::Notify);
    }

    #[test]
    fn test_unanalyzed_records_are_escalated() {
        let decision = RoutingDecision {
            action: RouteAction::Notify,
            total_failures: 1,
            healable_count: 0,
            flaky_count: 0,
            critical_count: 0,
            reasoning: "No clear automatic fix available, manual review needed".to_string(),
        };
        let mut failure = record(7, ErrorCategory::Unknown, false, 0.0);
        failure.analysis = None;

        let summary = build_summary(&decision, &[failure]);
        assert_eq!(summary.unhealable.len(), 1);
    }
}
