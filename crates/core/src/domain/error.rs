// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid entry status: {0}")]
    InvalidStatus(String),

    #[error("Invalid direction: {0} (expected 'up' or 'down')")]
    InvalidDirection(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Waiting positions are not exactly {1..N}. Never repaired automatically.
    #[error("Queue integrity fault: {0}")]
    IntegrityFault(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
