//! Ledger error types.
//!
//! Every ledger operation returns one of these errors. Validation variants are
//! raised before any store access; store variants abort the whole atomic unit,
//! so no partial write is ever observable.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Amount must be a positive magnitude.
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    /// A required reference field is missing or inconsistent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Transfer source and destination must differ.
    #[error("Transfer source and destination are the same account: {0}")]
    SameAccountTransfer(Uuid),

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Account is deactivated and cannot accept new transactions.
    #[error("Account {0} is inactive")]
    AccountInactive(Uuid),

    /// Balance is too low to cover the requested debit.
    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        /// Balance available on the account.
        available: Decimal,
        /// Amount the debit requested.
        requested: Decimal,
    },

    // ========== Transaction State Errors ==========
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Transaction has already been reversed.
    #[error("Transaction {0} is already voided")]
    TransactionAlreadyVoided(Uuid),

    // ========== Concurrency Errors ==========
    /// Optimistic retry budget exhausted; another writer kept winning.
    #[error("Store conflict: concurrent modification persisted after retries")]
    StoreConflict,

    // ========== Store Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::SameAccountTransfer(_) => "SAME_ACCOUNT_TRANSFER",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::TransactionAlreadyVoided(_) => "TRANSACTION_ALREADY_VOIDED",
            Self::StoreConflict => "STORE_CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - validation errors
            Self::InvalidAmount(_)
            | Self::Validation(_)
            | Self::SameAccountTransfer(_)
            | Self::AccountInactive(_)
            | Self::TransactionAlreadyVoided(_) => 400,

            // 404 Not Found
            Self::AccountNotFound(_) | Self::TransactionNotFound(_) => 404,

            // 409 Conflict - concurrency errors
            Self::StoreConflict => 409,

            // 422 Unprocessable - business rule violation
            Self::InsufficientBalance { .. } => 422,

            // 500 Internal Server Error
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            LedgerError::InvalidAmount(dec!(-5)).error_code(),
            "INVALID_AMOUNT"
        );
        assert_eq!(
            LedgerError::InsufficientBalance {
                available: dec!(50),
                requested: dec!(100),
            }
            .error_code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(LedgerError::StoreConflict.error_code(), "STORE_CONFLICT");
        assert_eq!(
            LedgerError::SameAccountTransfer(Uuid::nil()).error_code(),
            "SAME_ACCOUNT_TRANSFER"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::InvalidAmount(dec!(0)).http_status_code(), 400);
        assert_eq!(
            LedgerError::AccountNotFound(Uuid::nil()).http_status_code(),
            404
        );
        assert_eq!(LedgerError::StoreConflict.http_status_code(), 409);
        assert_eq!(
            LedgerError::InsufficientBalance {
                available: dec!(1),
                requested: dec!(2),
            }
            .http_status_code(),
            422
        );
        assert_eq!(
            LedgerError::Database("boom".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_only_conflicts_are_retryable() {
        assert!(LedgerError::StoreConflict.is_retryable());
        assert!(!LedgerError::InvalidAmount(dec!(0)).is_retryable());
        assert!(!LedgerError::AccountNotFound(Uuid::nil()).is_retryable());
        assert!(!LedgerError::Database("boom".into()).is_retryable());
    }

    #[test]
    fn test_error_display_includes_amounts() {
        let err = LedgerError::InsufficientBalance {
            available: dec!(50),
            requested: dec!(120),
        };
        let msg = err.to_string();
        assert!(msg.contains("50"));
        assert!(msg.contains("120"));
    }
}
