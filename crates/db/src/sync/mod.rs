//! Sync between the device-local queue and the store of record.

pub mod reconciler;

pub use reconciler::{DrainReport, SyncReconciler};
