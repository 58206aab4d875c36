//! Domain Services
//!
//! The core business logic:
//! - `ledger` - peer-to-peer coin transfers and the split history query
//! - `purchases` - catalog purchases and holdings
//! - `users` - authentication state machine and the composed info view

pub mod ledger;
pub mod purchases;
pub mod users;

pub use ledger::LedgerService;
pub use purchases::PurchasesService;
pub use users::UserService;

use thiserror::Error;

use crate::auth::TokenError;
use crate::storage::StorageError;

/// Service-level error taxonomy.
///
/// Validation and not-found errors are raised before any mutation is
/// attempted; persistence failures always mean the in-flight unit was rolled
/// back. Retry policy belongs to the caller, never to the core.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad input, rejected before touching storage
    #[error("{0}")]
    Validation(String),

    /// Non-positive transfer amount
    #[error("amount must be positive, got {0}")]
    AmountInvalid(i64),

    /// Transfer recipient username does not resolve to an account
    #[error("recipient '{0}' not found")]
    RecipientNotFound(String),

    /// Catalog item name does not resolve to an item
    #[error("item '{0}' not found")]
    ItemNotFound(String),

    /// Account id does not resolve to an account
    #[error("account '{0}' not found")]
    AccountNotFound(String),

    /// Balance cannot cover the requested movement
    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: i64, required: i64 },

    /// Username uniqueness violation during provisioning
    #[error("username '{0}' is already taken")]
    Conflict(String),

    /// Wrong password for an existing account
    #[error("invalid credentials")]
    Unauthorized,

    /// Session token failed to decode
    #[error("invalid session token")]
    InvalidToken,

    /// Session token could not be issued
    #[error("session token error: {0}")]
    Token(#[from] TokenError),

    /// Storage fault; the in-flight unit was rolled back
    #[error("storage failure: {0}")]
    Persistence(StorageError),
}

impl ServiceError {
    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) | ServiceError::AmountInvalid(_) => "VALIDATION_ERROR",
            ServiceError::RecipientNotFound(_)
            | ServiceError::ItemNotFound(_)
            | ServiceError::AccountNotFound(_) => "NOT_FOUND",
            ServiceError::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Unauthorized => "UNAUTHORIZED",
            ServiceError::InvalidToken => "INVALID_TOKEN",
            ServiceError::Token(_) => "TOKEN_ERROR",
            ServiceError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InsufficientBalance {
                available,
                required,
            } => Self::InsufficientBalance {
                available,
                required,
            },
            StorageError::NotFound(id) => Self::AccountNotFound(id),
            StorageError::Duplicate(name) => Self::Conflict(name),
            other => Self::Persistence(other),
        }
    }
}

/// Result type alias using ServiceError
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_mapping() {
        let err: ServiceError = StorageError::InsufficientBalance {
            available: 100,
            required: 500,
        }
        .into();
        assert!(matches!(
            err,
            ServiceError::InsufficientBalance {
                available: 100,
                required: 500
            }
        ));
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");

        let err: ServiceError = StorageError::Connection("pool exhausted".to_string()).into();
        assert!(matches!(err, ServiceError::Persistence(_)));
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");
    }
}
