//! Domain errors for the Mender control loop.

use thiserror::Error;

/// Domain-level errors that can occur while driving a monitoring pass.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Required run configuration is missing or empty at initialization.
    /// Terminal for the pass.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
