//! Mender - CI failure monitor and self-healing control loop
//!
//! Mender watches a GitHub repository for failing workflow runs,
//! classifies each failure through an external reasoning model, and either
//! retries the runs judged likely to heal (failed jobs only) or produces
//! an escalation summary for humans.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Pure business logic and domain models
//! - **Service Layer** (`services`): Stage implementations and the control loop
//! - **Infrastructure Layer** (`infrastructure`): External integrations and adapters
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use mender::services::ControlLoop;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Construct clients once, inject into the loop, run passes
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AnalysisSummary, ClassificationResult, Config, ErrorCategory, FailureRecord, RepoTarget,
    RetryOutcome, RetryReport, RouteAction, RoutingDecision, RunState, RunStatus, Severity,
    WorkflowRun,
};
pub use domain::ports::Oracle;
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::github::{GitHubApiError, GitHubClient, GitHubClientConfig};
pub use infrastructure::oracle::OracleClient;
pub use services::ControlLoop;
