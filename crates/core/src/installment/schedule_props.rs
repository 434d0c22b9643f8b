//! Property tests for schedule computation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::installment::schedule::compute_schedule;

/// Strategy for realistic principals (0.01 up to 100 million, 2dp).
fn principal_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for term counts.
fn term_strategy() -> impl Strategy<Value = u32> {
    1u32..=360
}

/// Strategy for periodic rates between 0% and 30%, 2dp.
fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=3000i64).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **The schedule satisfies its defining identities**
    ///
    /// *For any* valid inputs: interest is principal scaled by the rate,
    /// the total is principal plus interest over all periods, and the period
    /// amount times the term reproduces the total (up to division residue).
    #[test]
    fn prop_schedule_identities(
        principal in principal_strategy(),
        term in term_strategy(),
        rate in rate_strategy(),
    ) {
        let schedule = compute_schedule(principal, term, rate).unwrap();
        let term_dec = Decimal::from(term);

        prop_assert_eq!(
            schedule.periodic_interest,
            principal * rate / Decimal::ONE_HUNDRED
        );
        prop_assert_eq!(
            schedule.total_with_interest,
            principal + schedule.periodic_interest * term_dec
        );

        let residue = (schedule.period_amount * term_dec - schedule.total_with_interest).abs();
        prop_assert!(residue < Decimal::new(1, 10));
    }

    /// **A zero rate is interest-free**
    ///
    /// *For any* principal and term, a 0% schedule distributes exactly the
    /// principal and accrues no interest.
    #[test]
    fn prop_zero_rate_is_interest_free(
        principal in principal_strategy(),
        term in term_strategy(),
    ) {
        let schedule = compute_schedule(principal, term, Decimal::ZERO).unwrap();
        prop_assert_eq!(schedule.periodic_interest, Decimal::ZERO);
        prop_assert_eq!(schedule.total_with_interest, principal);
    }

    /// **Totals never shrink below the principal**
    #[test]
    fn prop_total_at_least_principal(
        principal in principal_strategy(),
        term in term_strategy(),
        rate in rate_strategy(),
    ) {
        let schedule = compute_schedule(principal, term, rate).unwrap();
        prop_assert!(schedule.total_with_interest >= principal);
        prop_assert!(schedule.period_amount > Decimal::ZERO);
    }

    /// **The computation is deterministic**
    #[test]
    fn prop_schedule_deterministic(
        principal in principal_strategy(),
        term in term_strategy(),
        rate in rate_strategy(),
    ) {
        let a = compute_schedule(principal, term, rate).unwrap();
        let b = compute_schedule(principal, term, rate).unwrap();
        prop_assert_eq!(a, b);
    }

    /// **A single-period plan is one payment of the whole total**
    #[test]
    fn prop_single_period_pays_total(
        principal in principal_strategy(),
        rate in rate_strategy(),
    ) {
        let schedule = compute_schedule(principal, 1, rate).unwrap();
        prop_assert_eq!(schedule.period_amount, schedule.total_with_interest);
    }
}
