//! Payment planning for installment period payments.
//!
//! A plan turns a "pay N periods" request into the exact numbers the store
//! repository needs: the clamped period count, the unrounded payment amount,
//! the covered period numbers, and the progress fields after the payment.
//! Building the plan is pure; the repository applies it atomically together
//! with the ledger debit.

use rust_decimal::Decimal;

use crate::installment::error::InstallmentError;
use crate::installment::schedule::Schedule;

/// A validated, clamped payment against an installment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentPlan {
    /// Number of periods this payment covers, after clamping.
    pub periods: u32,
    /// Unrounded amount to debit: `period_amount * periods`.
    pub payment_amount: Decimal,
    /// First period number covered (previous `paid_periods + 1`).
    pub first_period: u32,
    /// Last period number covered (new `paid_periods`).
    pub last_period: u32,
    /// Progress after the payment: periods paid so far.
    pub new_paid_periods: u32,
    /// Progress after the payment: cumulative amount paid.
    pub new_total_paid: Decimal,
    /// Progress after the payment: amount still owed.
    ///
    /// Exactly zero at the terminal state. The unrounded period amount can
    /// carry a division residue, so the terminal value is pinned rather than
    /// recomputed by subtraction.
    pub new_remaining: Decimal,
    /// True when this payment pays the final period.
    pub completes: bool,
}

impl PaymentPlan {
    /// Builds the plan for paying `requested_periods` periods.
    ///
    /// `paid_periods` and `total_paid` are the installment's current progress
    /// fields; `term_count` its total period count. The requested count is
    /// clamped to the periods remaining, so "pay remaining in full" is simply
    /// a request for at least `term_count - paid_periods`.
    pub fn build(
        schedule: &Schedule,
        term_count: u32,
        paid_periods: u32,
        total_paid: Decimal,
        requested_periods: u32,
    ) -> Result<Self, InstallmentError> {
        if requested_periods == 0 {
            return Err(InstallmentError::Validation(
                "periods count must be at least 1".to_string(),
            ));
        }
        if paid_periods >= term_count {
            return Err(InstallmentError::AlreadyCompleted);
        }

        let periods = requested_periods.min(term_count - paid_periods);
        let payment_amount = schedule.payment_amount(periods);
        let new_paid_periods = paid_periods + periods;
        let new_total_paid = total_paid + payment_amount;
        let completes = new_paid_periods == term_count;
        let new_remaining = if completes {
            // Paying every period discharges the obligation exactly, even
            // when the unrounded period amount carries a division residue.
            Decimal::ZERO
        } else {
            schedule.total_with_interest - new_total_paid
        };

        Ok(Self {
            periods,
            payment_amount,
            first_period: paid_periods + 1,
            last_period: new_paid_periods,
            new_paid_periods,
            new_total_paid,
            new_remaining,
            completes,
        })
    }

    /// Period numbers covered by this payment, in order.
    #[must_use]
    pub const fn period_numbers(&self) -> std::ops::RangeInclusive<u32> {
        self.first_period..=self.last_period
    }
}
