// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Rejected preconditions are not errors; see `domain::Outcome`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Store-level failure (connectivity, constraint, lock timeout)
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::Database(_))
    }

    /// Positions among waiting entries are no longer exactly {1..N}
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            AppError::Domain(crate::domain::DomainError::IntegrityFault(_))
        )
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

// Note: sqlx::Error conversion is handled in the infra-sqlite crate
// by mapping to AppError::Database(String)
