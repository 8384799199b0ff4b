//! Oracle response parsing with fallback.
//!
//! The oracle is asked for a bare JSON object but answers may arrive
//! wrapped in prose or fenced code blocks, or malformed outright. Parsing
//! therefore strips known fence markers, extracts the first balanced
//! `{`..`}` object, backfills missing fields with safe defaults, and on
//! outright failure returns a flagged fallback result instead of an error.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::models::{ClassificationResult, ErrorCategory, Severity};

/// Oracle output as it arrives: every field optional.
#[derive(Debug, Default, Deserialize)]
struct RawClassification {
    error_category: Option<String>,
    error_type: Option<String>,
    severity: Option<String>,
    root_cause: Option<String>,
    #[serde(default)]
    affected_components: Vec<String>,
    is_flaky: Option<bool>,
    confidence_score: Option<f64>,
    suggested_fix: Option<String>,
    reasoning: Option<String>,
}

/// Parse free-form oracle output into a classification.
///
/// Never fails: malformed input yields the parse fallback
/// (`error_category = unknown`, `confidence_score = 0.0`,
/// `parse_error = true`). Provenance fields are left for the caller.
pub fn parse_classification(text: &str) -> ClassificationResult {
    let candidate = match extract_json_object(text) {
        Some(candidate) => candidate,
        None => {
            warn!("oracle response contained no JSON object");
            return ClassificationResult::parse_fallback("no JSON object found in response");
        }
    };

    match serde_json::from_str::<RawClassification>(candidate) {
        Ok(raw) => normalize(raw),
        Err(err) => {
            warn!(error = %err, "failed to parse oracle response");
            debug!(response = text, "unparseable oracle response");
            ClassificationResult::parse_fallback(&err.to_string())
        }
    }
}

/// Locate the first balanced `{`..`}` object, after stripping fenced code
/// block markers if present.
fn extract_json_object(text: &str) -> Option<&str> {
    let mut text = text.trim();

    if let Some(idx) = text.find("```json") {
        text = &text[idx + 7..];
        if let Some(end) = text.find("```") {
            text = &text[..end];
        }
    } else if let Some(idx) = text.find("```") {
        text = &text[idx + 3..];
        if let Some(end) = text.find("```") {
            text = &text[..end];
        }
    }

    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes.iter().enumerate().skip(start) {
        if escaped {
            escaped = false;
            continue;
        }
        match byte {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Backfill missing fields with safe defaults and clamp confidence into
/// [0, 1].
fn normalize(raw: RawClassification) -> ClassificationResult {
    let error_category = raw
        .error_category
        .as_deref()
        .and_then(ErrorCategory::from_str)
        .unwrap_or(ErrorCategory::Unknown);
    let severity = raw
        .severity
        .as_deref()
        .and_then(Severity::from_str)
        .unwrap_or(Severity::Medium);

    let confidence_score = match raw.confidence_score {
        Some(score) if score.is_finite() => score.clamp(0.0, 1.0),
        _ => 0.5,
    };

    let mut result = ClassificationResult::parse_fallback("");
    result.parse_error = false;
    result.error_category = error_category;
    result.error_type = raw.error_type.unwrap_or_else(|| "unknown".to_string());
    result.severity = severity;
    result.root_cause = raw.root_cause.unwrap_or_else(|| "unknown".to_string());
    result.affected_components = raw.affected_components.into_iter().collect();
    result.is_flaky = raw.is_flaky.unwrap_or(false);
    result.confidence_score = confidence_score;
    result.suggested_fix = raw.suggested_fix.unwrap_or_default();
    result.reasoning = raw.reasoning.unwrap_or_default();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "error_category": "timeout_error",
        "error_type": "job_timeout",
        "severity": "medium",
        "root_cause": "Integration test exceeded 30 minute limit",
        "affected_components": ["integration-tests"],
        "is_flaky": true,
        "confidence_score": 0.85,
        "suggested_fix": "Re-run the workflow",
        "reasoning": "Timeout with no related code changes"
    }"#;

    #[test]
    fn test_parses_bare_object() {
        let result = parse_classification(WELL_FORMED);
        assert_eq!(result.error_category, ErrorCategory::TimeoutError);
        assert_eq!(result.severity, Severity::Medium);
        assert!(result.is_flaky);
        assert!((result.confidence_score - 0.85).abs() < 1e-9);
        assert!(!result.parse_error);
        assert!(result.is_successful());
    }

    #[test]
    fn test_strips_json_fence() {
        let fenced = format!("Here is my analysis:\n```json\n{WELL_FORMED}\n```\nHope it helps!");
        let result = parse_classification(&fenced);
        assert_eq!(result.error_category, ErrorCategory::TimeoutError);
        assert!(!result.parse_error);
    }

    #[test]
    fn test_strips_anonymous_fence() {
        let fenced = format!("```\n{WELL_FORMED}\n```");
        let result = parse_classification(&fenced);
        assert_eq!(result.error_category, ErrorCategory::TimeoutError);
    }

    #[test]
    fn test_extracts_object_from_surrounding_prose() {
        let wrapped = format!("The failure looks environmental. {WELL_FORMED} Let me know.");
        let result = parse_classification(&wrapped);
        assert_eq!(result.error_category, ErrorCategory::TimeoutError);
    }

    #[test]
    fn test_nested_braces_stay_balanced() {
        let nested = r#"{"error_category": "build_error", "reasoning": "expected `}` after block", "confidence_score": 0.7}"#;
        let result = parse_classification(nested);
        assert_eq!(result.error_category, ErrorCategory::BuildError);
        assert!((result.confidence_score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_backfills_missing_fields() {
        let sparse = r#"{"root_cause": "linker died"}"#;
        let result = parse_classification(sparse);
        assert_eq!(result.error_category, ErrorCategory::Unknown);
        assert_eq!(result.error_type, "unknown");
        assert_eq!(result.severity, Severity::Medium);
        assert!(!result.is_flaky);
        assert!((result.confidence_score - 0.5).abs() < f64::EPSILON);
        assert!(!result.parse_error);
    }

    #[test]
    fn test_unknown_category_string_maps_to_unknown() {
        let odd = r#"{"error_category": "cosmic_rays", "confidence_score": 0.9}"#;
        let result = parse_classification(odd);
        assert_eq!(result.error_category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_confidence_clamped() {
        let high = parse_classification(r#"{"confidence_score": 3.5}"#);
        assert!((high.confidence_score - 1.0).abs() < f64::EPSILON);

        let low = parse_classification(r#"{"confidence_score": -0.5}"#);
        assert!((low.confidence_score - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_malformed_input_yields_fallback() {
        for garbage in ["", "not json at all", "{\"unterminated\": ", "[]"] {
            let result = parse_classification(garbage);
            assert!(result.parse_error, "input {garbage:?} should fall back");
            assert_eq!(result.error_category, ErrorCategory::Unknown);
            assert!((result.confidence_score - 0.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let a = parse_classification("garbage");
        let b = parse_classification("garbage");
        assert_eq!(a.error_category, b.error_category);
        assert_eq!(a.parse_error, b.parse_error);
        assert!((a.confidence_score - b.confidence_score).abs() < f64::EPSILON);
    }
}
