//! Classification prompt construction.

use crate::domain::models::WorkflowRun;

/// System turn sent with every classification request.
pub const SYSTEM_PROMPT: &str =
    "You are an expert DevOps engineer. Always respond with valid JSON only, no markdown.";

/// Build the classification prompt for one failed run.
///
/// `logs` must already be truncated to the configured character budget.
pub fn failure_analysis_prompt(run: &WorkflowRun, logs: &str) -> String {
    format!(
        r#"You are an expert DevOps engineer analyzing GitHub Actions workflow failures.

Analyze the following workflow failure and provide a structured classification.

## Workflow Information
- Run Number: {run_number}
- Workflow Name: {workflow_name}
- Branch: {branch}
- Conclusion: {conclusion}

## Error Logs
{logs}

## Task
Analyze this failure and respond with ONLY a valid JSON object (no markdown, no explanation):

{{
  "error_category": "<category>",
  "error_type": "<specific_type>",
  "severity": "<severity_level>",
  "root_cause": "<brief_description>",
  "affected_components": ["<component1>", "<component2>"],
  "is_flaky": <true or false>,
  "confidence_score": <0.0 to 1.0>,
  "suggested_fix": "<actionable_fix>",
  "reasoning": "<your_analysis>"
}}

### Categories (choose ONE):
- test_failure: Test case failing, assertion errors
- build_error: Compilation or build issue
- dependency_error: Missing or conflicting dependencies
- infrastructure_error: CI/CD infrastructure issues
- timeout_error: Process or test timeouts
- configuration_error: Misconfiguration in workflow or code
- network_error: Network connectivity issues
- permission_error: Access or permission denied
- environment_error: Environment setup issues
- unknown: Cannot determine from logs

### Severity Level (choose ONE):
- critical: Blocks all workflows, immediate action required
- high: Major feature broken, affects multiple areas
- medium: Single feature/test broken, workaround possible
- low: Minor issue, cosmetic or non-blocking

### Flaky Detection:
Set "is_flaky" to true ONLY if:
- Random timeouts without code changes
- Race conditions evident
- Timing-dependent failures
- Environmental inconsistencies visible

### Confidence:
Rate 0.0 (very uncertain) to 1.0 (very certain).

IMPORTANT: Return ONLY the JSON object. No markdown code blocks, no extra text."#,
        run_number = run.run_number,
        workflow_name = run.name,
        branch = run.head_branch,
        conclusion = run.conclusion.as_deref().unwrap_or("failure"),
        logs = logs,
    )
}
