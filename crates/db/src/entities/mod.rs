//! `SeaORM` entity definitions.
//!
//! `accounts`, `categories`, `transactions`, `installments` and
//! `installment_payments` live in the PostgreSQL store of record;
//! `pending_operations` lives in the device-local SQLite queue.

pub mod accounts;
pub mod categories;
pub mod installment_payments;
pub mod installments;
pub mod pending_operations;
pub mod sea_orm_active_enums;
pub mod transactions;
