//! Store layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for both stores
//! - Repository abstractions for data access
//! - Migrations for the store of record (PostgreSQL) and the
//!   device-local offline queue (SQLite)
//! - The reconciler that replays queued operations into the store of
//!   record once connectivity returns

pub mod entities;
pub mod migration;
pub mod queue_migration;
pub mod repositories;
pub mod sync;

pub use repositories::{
    AccountRepository, InstallmentRepository, LedgerRepository, QueueRepository,
};
pub use sync::{DrainReport, SyncReconciler};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to a database.
///
/// Works for both stores: pass a `postgres://` URL for the store of record
/// or a `sqlite://` URL for the offline queue.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
