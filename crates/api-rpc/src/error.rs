//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes. Rejected queue mutations
//! are not errors; they come back as `applied: false` with a reason.

use jsonrpsee::types::ErrorObjectOwned;
use tracing::{error, warn};
use waitline_core::domain::DomainError;
use waitline_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const FORBIDDEN: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const OPERATION_FAILED: i32 = 5001;
    pub const INTEGRITY_FAULT: i32 = 5003;
}

/// Message returned for every store failure; the detail stays in the log
pub const OPERATION_FAILED_MESSAGE: &str = "operation failed";

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        AppError::Forbidden(msg) => ErrorObjectOwned::owned(code::FORBIDDEN, msg, None::<()>),
        AppError::Database(detail) => {
            warn!(error = %detail, "Store operation failed");
            ErrorObjectOwned::owned(code::OPERATION_FAILED, OPERATION_FAILED_MESSAGE, None::<()>)
        }
        AppError::Domain(DomainError::IntegrityFault(detail)) => {
            error!(error = %detail, "Queue integrity fault reported to caller");
            ErrorObjectOwned::owned(
                code::INTEGRITY_FAULT,
                format!("queue integrity fault: {}", detail),
                None::<()>,
            )
        }
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Io(e) => ErrorObjectOwned::owned(code::INTERNAL_ERROR, e.to_string(), None::<()>),
        AppError::Config(msg) | AppError::Internal(msg) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_failure_detail_is_hidden() {
        let err = to_rpc_error(AppError::Database(
            "Database locked (SQLITE_BUSY): database is locked".to_string(),
        ));
        assert_eq!(err.code(), code::OPERATION_FAILED);
        assert_eq!(err.message(), OPERATION_FAILED_MESSAGE);
    }

    #[test]
    fn test_integrity_fault_has_own_code() {
        let err = to_rpc_error(AppError::Domain(DomainError::IntegrityFault(
            "duplicate waiting position 2".to_string(),
        )));
        assert_eq!(err.code(), code::INTEGRITY_FAULT);
        assert!(err.message().contains("duplicate waiting position 2"));
    }

    #[test]
    fn test_forbidden_maps_to_forbidden() {
        let err = to_rpc_error(AppError::Forbidden("staff only".to_string()));
        assert_eq!(err.code(), code::FORBIDDEN);
    }
}
