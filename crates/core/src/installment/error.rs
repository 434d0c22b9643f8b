//! Installment error types.

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::LedgerError;

/// Errors that can occur during installment operations.
#[derive(Debug, Error)]
pub enum InstallmentError {
    // ========== Validation Errors ==========
    /// Invalid schedule inputs or a rejected edit/delete.
    #[error("Validation error: {0}")]
    Validation(String),

    // ========== State Errors ==========
    /// All periods are paid; no further payments are permitted.
    #[error("Installment is already completed")]
    AlreadyCompleted,

    /// Installment not found.
    #[error("Installment not found: {0}")]
    NotFound(Uuid),

    // ========== Delegated Ledger Errors ==========
    /// Failure raised by the ledger debit this operation delegated to.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    // ========== Store Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl InstallmentError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::AlreadyCompleted => "INSTALLMENT_ALREADY_COMPLETED",
            Self::NotFound(_) => "INSTALLMENT_NOT_FOUND",
            Self::Ledger(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::AlreadyCompleted => 400,
            Self::NotFound(_) => 404,
            Self::Ledger(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Ledger(e) => e.is_retryable(),
            _ => false,
        }
    }
}
