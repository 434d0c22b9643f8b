//! Installment status rules.
//!
//! Only `active` and `completed` are stored; they are facts about payment
//! progress. `overdue` is derived at read time from the due date and never
//! persisted, so a stale row can never claim an installment is overdue after
//! it was paid off.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stored installment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    /// Periods remain unpaid.
    Active,
    /// Every period is paid; terminal.
    Completed,
}

impl InstallmentStatus {
    /// Returns true if further payments are permitted.
    #[must_use]
    pub const fn accepts_payments(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Completed => "completed",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for InstallmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Unknown installment status: {s}")),
        }
    }
}

/// Status as presented to callers, including the derived overdue state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveStatus {
    /// Periods remain unpaid and the due date has not passed.
    Active,
    /// Every period is paid.
    Completed,
    /// Periods remain unpaid past the due date. Informational only; payments
    /// are still accepted.
    Overdue,
}

/// Derives the presented status from the stored status and the due date.
#[must_use]
pub fn effective_status(
    stored: InstallmentStatus,
    due_date: NaiveDate,
    today: NaiveDate,
) -> EffectiveStatus {
    match stored {
        InstallmentStatus::Completed => EffectiveStatus::Completed,
        InstallmentStatus::Active if today > due_date => EffectiveStatus::Overdue,
        InstallmentStatus::Active => EffectiveStatus::Active,
    }
}
