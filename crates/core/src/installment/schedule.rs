//! Flat-rate amortization schedule computation.
//!
//! The interest model is flat-rate, NOT reducing-balance: interest is computed
//! once on the original principal and spread evenly over all periods. Changing
//! this would alter user-visible totals, so it is preserved exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::installment::error::InstallmentError;

/// A computed installment schedule.
///
/// All three fields are derived from principal, term count, and the periodic
/// rate; none of them is ever persisted. `period_amount` keeps the full
/// unrounded division result so progress accounting never drifts; rounding
/// happens only at presentation boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Interest accrued per period: `principal * rate / 100`.
    pub periodic_interest: Decimal,
    /// Total to repay: `principal + periodic_interest * term_count`.
    pub total_with_interest: Decimal,
    /// Amount due per period: `total_with_interest / term_count`, unrounded.
    pub period_amount: Decimal,
}

impl Schedule {
    /// The unrounded amount covering `periods` consecutive periods.
    #[must_use]
    pub fn payment_amount(&self, periods: u32) -> Decimal {
        self.period_amount * Decimal::from(periods)
    }
}

/// Computes the flat-rate schedule for the given inputs.
///
/// Rejects non-positive principal or term count and negative rates; a zero
/// rate is a valid interest-free plan.
pub fn compute_schedule(
    principal: Decimal,
    term_count: u32,
    periodic_rate_percent: Decimal,
) -> Result<Schedule, InstallmentError> {
    if principal <= Decimal::ZERO {
        return Err(InstallmentError::Validation(
            "principal must be positive".to_string(),
        ));
    }
    if term_count == 0 {
        return Err(InstallmentError::Validation(
            "term count must be at least 1".to_string(),
        ));
    }
    if periodic_rate_percent < Decimal::ZERO {
        return Err(InstallmentError::Validation(
            "periodic rate cannot be negative".to_string(),
        ));
    }

    let term = Decimal::from(term_count);
    let periodic_interest = principal * (periodic_rate_percent / Decimal::ONE_HUNDRED);
    let total_with_interest = principal + periodic_interest * term;
    let period_amount = total_with_interest / term;

    Ok(Schedule {
        periodic_interest,
        total_with_interest,
        period_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(1_200_000), 12, dec!(0), dec!(0), dec!(1_200_000), dec!(100_000))]
    #[case(dec!(1_200_000), 12, dec!(2), dec!(24_000), dec!(1_488_000), dec!(124_000))]
    #[case(dec!(1000), 10, dec!(2.5), dec!(25), dec!(1250), dec!(125))]
    #[case(dec!(500), 1, dec!(10), dec!(50), dec!(550), dec!(550))]
    fn test_schedule_values(
        #[case] principal: Decimal,
        #[case] term_count: u32,
        #[case] rate: Decimal,
        #[case] interest: Decimal,
        #[case] total: Decimal,
        #[case] period: Decimal,
    ) {
        let schedule = compute_schedule(principal, term_count, rate).unwrap();
        assert_eq!(schedule.periodic_interest, interest);
        assert_eq!(schedule.total_with_interest, total);
        assert_eq!(schedule.period_amount, period);
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        assert!(matches!(
            compute_schedule(dec!(0), 12, dec!(2)),
            Err(InstallmentError::Validation(_))
        ));
        assert!(matches!(
            compute_schedule(dec!(-100), 12, dec!(2)),
            Err(InstallmentError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_zero_term_count() {
        assert!(matches!(
            compute_schedule(dec!(1000), 0, dec!(2)),
            Err(InstallmentError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_negative_rate() {
        assert!(matches!(
            compute_schedule(dec!(1000), 12, dec!(-0.5)),
            Err(InstallmentError::Validation(_))
        ));
    }

    #[test]
    fn test_payment_amount_scales_with_periods() {
        let schedule = compute_schedule(dec!(1_200_000), 12, dec!(2)).unwrap();
        assert_eq!(schedule.payment_amount(1), dec!(124_000));
        assert_eq!(schedule.payment_amount(3), dec!(372_000));
        assert_eq!(schedule.payment_amount(12), dec!(1_488_000));
    }

    #[test]
    fn test_non_terminating_division_keeps_precision() {
        // 1000 / 3 has no exact decimal representation; the division result
        // carries the residue instead of being rounded to a minor unit here.
        let schedule = compute_schedule(dec!(1000), 3, dec!(0)).unwrap();
        let residue = (schedule.payment_amount(3) - dec!(1000)).abs();
        assert!(residue < dec!(0.000000000000000000001));
        assert_ne!(schedule.period_amount, dec!(333.33));
    }
}
