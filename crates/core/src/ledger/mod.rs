//! Ledger consistency logic.
//!
//! This module implements the pure half of the ledger engine:
//! - Transaction kinds and their signed balance effects
//! - Balance arithmetic for debits, credits, reversals, and edits
//! - Validation rules applied before any store access
//! - Error types for ledger operations

pub mod balance;
pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod balance_props;

pub use balance::{credit_balance, debit_balance, edited_balance, restored_balance};
pub use error::LedgerError;
pub use types::{AccountKind, TransactionKind, TransactionStatus};
pub use validation::{validate_amount, validate_category, validate_transfer_accounts};
