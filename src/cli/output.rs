//! Output formatting for pass summaries.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;
use serde::Serialize;

use crate::domain::models::{RunState, RunStatus};

/// Machine-readable summary of one pass, emitted with `--json`.
#[derive(Debug, Serialize)]
pub struct PassSummary<'a> {
    pub repository: String,
    pub branch: &'a str,
    pub status: RunStatus,
    pub total_checks: u64,
    pub detected_failures: usize,
    pub analysis: Option<&'a crate::domain::models::AnalysisSummary>,
    pub routing: Option<&'a crate::domain::models::RoutingDecision>,
    pub retries: Option<&'a crate::domain::models::RetryReport>,
    pub last_error: Option<&'a str>,
}

impl<'a> PassSummary<'a> {
    pub fn from_state(state: &'a RunState) -> Self {
        Self {
            repository: state.target.full_name(),
            branch: &state.target.branch,
            status: state.status,
            total_checks: state.total_checks,
            detected_failures: state.detected_failures.len(),
            analysis: state.analysis_summary.as_ref(),
            routing: state.routing.as_ref(),
            retries: state.retry_report.as_ref(),
            last_error: state.last_error.as_ref().map(|e| e.message.as_str()),
        }
    }
}

/// Print the pass result, as JSON or a human-readable report.
pub fn print_pass(state: &RunState, json_mode: bool) {
    if json_mode {
        let summary = PassSummary::from_state(state);
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        );
    } else {
        println!("{}", render_pass(state));
    }
}

fn render_pass(state: &RunState) -> String {
    let mut out = String::new();

    let status = match state.status {
        RunStatus::Error => style(state.status.as_str()).red().bold(),
        RunStatus::Complete | RunStatus::HealingComplete => {
            style(state.status.as_str()).green().bold()
        }
        _ => style(state.status.as_str()).yellow().bold(),
    };
    out.push_str(&format!(
        "Pass #{} on {} ({}): {}\n",
        state.total_checks,
        style(state.target.full_name()).bold(),
        state.target.branch,
        status
    ));

    if let Some(last_error) = &state.last_error {
        out.push_str(&format!(
            "{} {}\n",
            style("error:").red().bold(),
            last_error.message
        ));
    }

    if state.detected_failures.is_empty() {
        out.push_str("No failures detected.\n");
        return out;
    }

    let mut table = list_table(&["RUN", "WORKFLOW", "CATEGORY", "SEVERITY", "CONF", "FLAKY"]);
    for record in &state.detected_failures {
        let (category, severity, conf, flaky) = match &record.analysis {
            Some(analysis) => (
                analysis.error_category.as_str().to_string(),
                analysis.severity.as_str().to_string(),
                format!("{:.2}", analysis.confidence_score),
                if analysis.is_flaky { "yes" } else { "no" }.to_string(),
            ),
            None => ("-".into(), "-".into(), "-".into(), "-".into()),
        };
        table.add_row(vec![
            Cell::new(format!("#{}", record.run.run_number)),
            Cell::new(&record.run.name),
            Cell::new(category),
            Cell::new(severity),
            Cell::new(conf).set_alignment(CellAlignment::Right),
            Cell::new(flaky),
        ]);
    }
    out.push_str(&format!(
        "{} detected failure(s):\n{table}\n",
        state.detected_failures.len()
    ));

    if let Some(routing) = &state.routing {
        out.push_str(&format!(
            "Decision: {} - {} (healable {}, flaky {}, critical {})\n",
            style(routing.action.as_str()).bold(),
            routing.reasoning,
            routing.healable_count,
            routing.flaky_count,
            routing.critical_count
        ));
    }

    if let Some(report) = &state.retry_report {
        out.push_str(&format!(
            "Retries: {} accepted, {} rejected, {} errored, {} skipped\n",
            style(report.successful).green(),
            report.failed,
            report.errors,
            report.skipped
        ));
        for outcome in &report.outcomes {
            out.push_str(&format!(
                "  run #{}: {} ({})\n",
                outcome.run_number,
                outcome.status.as_str(),
                outcome.reason
            ));
        }
    }

    if let Some(notification) = &state.notification {
        out.push_str(&format!(
            "Escalated {} failure(s) for human review.\n",
            notification.unhealable.len()
        ));
    }

    out
}

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).set_alignment(CellAlignment::Left)),
        );
    table
}
