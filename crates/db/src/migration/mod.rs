//! Migrations for the store of record (PostgreSQL).
//!
//! Migrations are managed using sea-orm-migration. The device-local queue
//! store has its own migrator in [`crate::queue_migration`].

pub use sea_orm_migration::prelude::*;

mod m20260210_000001_initial;

/// Migrator for the primary store schema.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260210_000001_initial::Migration)]
    }
}
