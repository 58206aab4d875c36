//! Common Error Types
//!
//! Provides unified error handling across all modules.

use thiserror::Error;

/// Root error type for the merchstore backend
#[derive(Debug, Error)]
pub enum MerchstoreError {
    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging errors
    #[error("logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Storage errors
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Service errors
    #[error("service error: {0}")]
    Service(#[from] crate::services::ServiceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MerchstoreError {
    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            MerchstoreError::Config(_) => "CONFIG_ERROR",
            MerchstoreError::Logging(_) => "LOGGING_ERROR",
            MerchstoreError::Storage(_) => "STORAGE_ERROR",
            MerchstoreError::Service(_) => "SERVICE_ERROR",
            MerchstoreError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias using MerchstoreError
pub type Result<T> = std::result::Result<T, MerchstoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageError;

    #[test]
    fn test_error_code_and_display() {
        let err = MerchstoreError::from(StorageError::Database("disk full".to_string()));
        assert_eq!(err.error_code(), "STORAGE_ERROR");
        assert!(err.to_string().contains("disk full"));
    }
}
