//! Port for the external classification oracle.

use async_trait::async_trait;

use crate::domain::models::{ClassificationResult, WorkflowRun};

/// The external reasoning service that turns raw failure context into a
/// structured classification.
///
/// Implementations are infallible by contract: a malformed response or a
/// failed call must be converted into a fallback [`ClassificationResult`]
/// (`parse_error` or `oracle_error` set), never surfaced as an error. The
/// control loop injects one instance at construction; there is no shared
/// global client.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Classify one failed run given an excerpt of its logs.
    async fn classify(&self, run: &WorkflowRun, logs: &str) -> ClassificationResult;

    /// Identity of the model answering, recorded as provenance.
    fn model(&self) -> &str;
}
