//! Migrations for the device-local queue store (SQLite).
//!
//! Kept separate from [`crate::migration`] so each store only ever runs the
//! schema written for its backend.

pub use sea_orm_migration::prelude::*;

mod m20260215_000001_pending_operations;

/// Migrator for the offline queue schema.
pub struct QueueMigrator;

#[async_trait::async_trait]
impl MigratorTrait for QueueMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260215_000001_pending_operations::Migration)]
    }
}
