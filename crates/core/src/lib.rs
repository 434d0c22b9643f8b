//! Core business logic for Kasku.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `ledger` - Balance arithmetic, transaction kinds, and mutation validation
//! - `installment` - Flat-rate amortization schedules and payment planning
//! - `offline` - Offline mutation intents and drain ordering
//! - `events` - Domain event types broadcast to observers

pub mod events;
pub mod installment;
pub mod ledger;
pub mod offline;
