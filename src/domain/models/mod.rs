pub mod classification;
pub mod config;
pub mod retry_outcome;
pub mod routing;
pub mod run_state;
pub mod workflow_run;

pub use classification::{AnalysisSummary, ClassificationResult, ErrorCategory, Severity};
pub use config::{
    Config, GitHubConfig, LoggingConfig, MonitorConfig, OracleConfig, RetryConfig, TargetConfig,
};
pub use retry_outcome::{RetryOutcome, RetryReport, RetryStatus};
pub use routing::{NotificationSummary, RouteAction, RoutingDecision};
pub use run_state::{LastError, RepoTarget, RunState, RunStatus};
pub use workflow_run::{FailureRecord, WorkflowRun};
