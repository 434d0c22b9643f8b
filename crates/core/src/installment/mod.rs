//! Installment amortization and payment planning.
//!
//! This module implements the pure half of the installment engine:
//! - Flat-rate schedule computation (interest spread evenly over all periods)
//! - Payment planning: clamping, covered period numbers, progress updates
//! - Stored vs derived status rules
//! - Error types for installment operations
//!
//! The schedule is computed, never stored: callers recompute it from the
//! persisted inputs on every read so progress accounting always works with
//! the unrounded period amount.

pub mod error;
pub mod plan;
pub mod schedule;
pub mod status;

#[cfg(test)]
mod plan_props;
#[cfg(test)]
mod schedule_props;

pub use error::InstallmentError;
pub use plan::PaymentPlan;
pub use schedule::{Schedule, compute_schedule};
pub use status::{EffectiveStatus, InstallmentStatus, effective_status};
