//! Routing decision: heal, notify, or end.
//!
//! A pure function over the analyzed failure set, recomputed on every
//! call. Escalation is conservative: any critical failure outranks any
//! number of healable ones in the same batch.

use tracing::info;

use crate::domain::models::{FailureRecord, RouteAction, RoutingDecision, Severity};

/// Compute the routing decision for the given analyzed failures.
///
/// Per record: a flaky failure at confidence >= 0.5 counts as both flaky
/// and healable; otherwise critical severity counts as critical; otherwise
/// a healable category at confidence >= 0.5 counts as healable and a
/// critical category counts as critical. Precedence: any critical ->
/// notify; else any healable -> heal; else notify for manual review;
/// no failures at all -> end.
pub fn decide(failures: &[FailureRecord]) -> RoutingDecision {
    if failures.is_empty() {
        info!("no failures to process");
        return RoutingDecision {
            action: RouteAction::End,
            total_failures: 0,
            healable_count: 0,
            flaky_count: 0,
            critical_count: 0,
            reasoning: "No analyzed failures to process".to_string(),
        };
    }

    let mut healable_count = 0usize;
    let mut flaky_count = 0usize;
    let mut critical_count = 0usize;

    for failure in failures {
        // A record without analysis contributes to the total only.
        let Some(analysis) = &failure.analysis else {
            continue;
        };

        if analysis.is_flaky && analysis.confidence_score >= 0.5 {
            flaky_count += 1;
            healable_count += 1;
            continue;
        }

        if analysis.severity == Severity::Critical {
            critical_count += 1;
            continue;
        }

        if analysis.error_category.is_healable() && analysis.confidence_score >= 0.5 {
            healable_count += 1;
        } else if analysis.error_category.is_critical() {
            critical_count += 1;
        }
    }

    let action = if critical_count > 0 {
        RouteAction::Notify
    } else if healable_count > 0 {
        RouteAction::Heal
    } else {
        RouteAction::Notify
    };

    let reasoning = decision_reasoning(healable_count, flaky_count, critical_count);
    info!(
        action = action.as_str(),
        healable = healable_count,
        flaky = flaky_count,
        critical = critical_count,
        "routing decision"
    );

    RoutingDecision {
        action,
        total_failures: failures.len(),
        healable_count,
        flaky_count,
        critical_count,
        reasoning,
    }
}

fn decision_reasoning(healable: usize, flaky: usize, critical: usize) -> String {
    if critical > 0 {
        format!("Found {critical} critical failures requiring human intervention")
    } else if flaky > 0 {
        format!("Found {flaky} flaky tests that can be retried")
    } else if healable > 0 {
        format!("Found {healable} healable failures (timeouts, network issues)")
    } else {
        "No clear automatic fix available, manual review needed".to_string()
    }
}
