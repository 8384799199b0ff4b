//! Failure classification domain models.
//!
//! A [`ClassificationResult`] is produced by the oracle adapter for every
//! analyzed failure, including the fallback paths: a parse failure or an
//! oracle transport failure still yields a result, flagged accordingly,
//! never an error.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed set of failure categories the oracle may assign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Test case failing, assertion errors
    TestFailure,
    /// Compilation or build issue
    BuildError,
    /// Missing or conflicting dependencies
    DependencyError,
    /// CI/CD infrastructure issues
    InfrastructureError,
    /// Process or test timeouts
    TimeoutError,
    /// Misconfiguration in workflow or code
    ConfigurationError,
    /// Network connectivity issues
    NetworkError,
    /// Access or permission denied
    PermissionError,
    /// Environment setup issues
    EnvironmentError,
    /// Cannot determine from logs
    #[default]
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TestFailure => "test_failure",
            Self::BuildError => "build_error",
            Self::DependencyError => "dependency_error",
            Self::InfrastructureError => "infrastructure_error",
            Self::TimeoutError => "timeout_error",
            Self::ConfigurationError => "configuration_error",
            Self::NetworkError => "network_error",
            Self::PermissionError => "permission_error",
            Self::EnvironmentError => "environment_error",
            Self::Unknown => "unknown",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "test_failure" => Some(Self::TestFailure),
            "build_error" => Some(Self::BuildError),
            "dependency_error" => Some(Self::DependencyError),
            "infrastructure_error" => Some(Self::InfrastructureError),
            "timeout_error" => Some(Self::TimeoutError),
            "configuration_error" => Some(Self::ConfigurationError),
            "network_error" => Some(Self::NetworkError),
            "permission_error" => Some(Self::PermissionError),
            "environment_error" => Some(Self::EnvironmentError),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Categories judged likely to succeed on a bare retry.
    pub fn is_healable(&self) -> bool {
        matches!(
            self,
            Self::TimeoutError | Self::NetworkError | Self::InfrastructureError | Self::EnvironmentError
        )
    }

    /// Categories that always warrant human escalation.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Self::BuildError | Self::DependencyError | Self::ConfigurationError
        )
    }
}

/// Severity assigned by the oracle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks all workflows, immediate action required
    Critical,
    /// Major feature broken, affects multiple areas
    High,
    /// Single feature/test broken, workaround possible
    #[default]
    Medium,
    /// Minor issue, cosmetic or non-blocking
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "critical" => Some(Self::Critical),
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Structured classification of one workflow failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub error_category: ErrorCategory,
    /// Free-text refinement of the category (e.g. `flaky_integration_test`).
    pub error_type: String,
    pub severity: Severity,
    pub root_cause: String,
    #[serde(default)]
    pub affected_components: BTreeSet<String>,
    pub is_flaky: bool,
    /// Always within [0.0, 1.0].
    pub confidence_score: f64,
    pub suggested_fix: String,
    pub reasoning: String,
    /// Set when the oracle response could not be parsed and this result is
    /// the fallback.
    #[serde(default)]
    pub parse_error: bool,
    /// Set when the oracle call itself failed (network/timeout), carrying
    /// the raw error message. Distinct from a parse failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_error: Option<String>,
    // Provenance
    pub analyzed_at: DateTime<Utc>,
    pub model: String,
    pub run_id: u64,
    pub run_number: u64,
}

impl ClassificationResult {
    /// Fallback result for oracle output that could not be parsed.
    /// A first-class output, not an exception path.
    pub fn parse_fallback(detail: &str) -> Self {
        Self {
            error_category: ErrorCategory::Unknown,
            error_type: "parse_error".to_string(),
            severity: Severity::Medium,
            root_cause: "Failed to parse oracle response".to_string(),
            affected_components: BTreeSet::new(),
            is_flaky: false,
            confidence_score: 0.0,
            suggested_fix: "Manual review required".to_string(),
            reasoning: format!("Parse error: {detail}"),
            parse_error: true,
            oracle_error: None,
            analyzed_at: Utc::now(),
            model: String::new(),
            run_id: 0,
            run_number: 0,
        }
    }

    /// Fallback result for a failed oracle call (network, timeout).
    pub fn oracle_failure(detail: &str) -> Self {
        Self {
            error_category: ErrorCategory::Unknown,
            error_type: "analysis_failed".to_string(),
            severity: Severity::Medium,
            root_cause: format!("Failed to analyze: {detail}"),
            affected_components: BTreeSet::new(),
            is_flaky: false,
            confidence_score: 0.0,
            suggested_fix: "Manual investigation required".to_string(),
            reasoning: format!("Automatic analysis failed: {detail}"),
            parse_error: false,
            oracle_error: Some(detail.to_string()),
            analyzed_at: Utc::now(),
            model: String::new(),
            run_id: 0,
            run_number: 0,
        }
    }

    /// Whether the analysis succeeded: no oracle error and not a parse
    /// fallback.
    pub fn is_successful(&self) -> bool {
        !self.parse_error && self.oracle_error.is_none()
    }

    /// Retry eligibility shared by the routing and healing stages: a flaky
    /// failure, or a healable category, at confidence >= 0.5.
    pub fn is_retry_eligible(&self) -> bool {
        (self.is_flaky && self.confidence_score >= 0.5)
            || (self.error_category.is_healable() && self.confidence_score >= 0.5)
    }
}

/// Running counters maintained by the analysis stage for one pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_analyzed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Per-category counts over successful analyses.
    pub categories: BTreeMap<ErrorCategory, usize>,
    /// Successful analyses with confidence >= 0.7.
    pub high_confidence: usize,
    /// Successful analyses flagged flaky.
    pub flaky: usize,
}

impl AnalysisSummary {
    /// Fold one classification into the counters.
    pub fn record(&mut self, analysis: &ClassificationResult) {
        self.total_analyzed += 1;
        if analysis.is_successful() {
            self.successful += 1;
            *self.categories.entry(analysis.error_category).or_insert(0) += 1;
            if analysis.confidence_score >= 0.7 {
                self.high_confidence += 1;
            }
            if analysis.is_flaky {
                self.flaky += 1;
            }
        } else {
            self.failed += 1;
        }
    }
}
