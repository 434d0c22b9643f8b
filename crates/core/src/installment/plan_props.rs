//! Property tests for payment planning.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::installment::error::InstallmentError;
use crate::installment::plan::PaymentPlan;
use crate::installment::schedule::{Schedule, compute_schedule};

/// Strategy producing a valid schedule plus its term count.
fn schedule_strategy() -> impl Strategy<Value = (Schedule, u32)> {
    (
        1i64..1_000_000_000i64,
        1u32..=60,
        0i64..=3000i64,
    )
        .prop_map(|(principal, term, rate)| {
            let schedule = compute_schedule(
                Decimal::new(principal, 2),
                term,
                Decimal::new(rate, 2),
            )
            .unwrap();
            (schedule, term)
        })
}

/// Walks a full payment sequence in chunks, returning each plan in order.
fn pay_in_chunks(schedule: &Schedule, term: u32, chunks: &[u32]) -> Vec<PaymentPlan> {
    let mut plans = Vec::new();
    let mut paid = 0u32;
    let mut total_paid = Decimal::ZERO;
    for &chunk in chunks {
        if paid >= term {
            break;
        }
        let plan = PaymentPlan::build(schedule, term, paid, total_paid, chunk).unwrap();
        paid = plan.new_paid_periods;
        total_paid = plan.new_total_paid;
        plans.push(plan);
    }
    plans
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **The payment amount is the period amount times the covered count**
    #[test]
    fn prop_payment_amount_scales(
        (schedule, term) in schedule_strategy(),
        paid in 0u32..60,
        requested in 1u32..=60,
    ) {
        prop_assume!(paid < term);

        let total_paid = schedule.payment_amount(paid);
        let plan = PaymentPlan::build(&schedule, term, paid, total_paid, requested).unwrap();
        prop_assert_eq!(plan.payment_amount, schedule.payment_amount(plan.periods));
    }

    /// **Paid periods never exceed the term count**
    ///
    /// *For any* request, the clamp keeps the new progress within the plan
    /// and the covered period numbers contiguous from the previous progress.
    #[test]
    fn prop_clamp_keeps_progress_in_bounds(
        (schedule, term) in schedule_strategy(),
        paid in 0u32..60,
        requested in 1u32..=200,
    ) {
        prop_assume!(paid < term);

        let total_paid = schedule.payment_amount(paid);
        let plan = PaymentPlan::build(&schedule, term, paid, total_paid, requested).unwrap();

        prop_assert!(plan.new_paid_periods <= term);
        prop_assert_eq!(plan.first_period, paid + 1);
        prop_assert_eq!(plan.last_period, plan.new_paid_periods);
        prop_assert_eq!(
            plan.period_numbers().count(),
            plan.periods as usize
        );
    }

    /// **A full payment sequence always terminates at completed with zero remaining**
    ///
    /// *For any* chunking of the term into payments, the final plan reports
    /// completion and a remaining amount of exactly zero.
    #[test]
    fn prop_any_chunking_completes_at_zero(
        (schedule, term) in schedule_strategy(),
        chunk_seed in prop::collection::vec(1u32..=7, 1..=80),
    ) {
        // Ensure the sequence is long enough to cover the whole term.
        let mut chunks = chunk_seed;
        chunks.push(term);

        let plans = pay_in_chunks(&schedule, term, &chunks);
        let last = plans.last().unwrap();

        prop_assert!(last.completes);
        prop_assert_eq!(last.new_paid_periods, term);
        prop_assert_eq!(last.new_remaining, Decimal::ZERO);
    }

    /// **Remaining amount strictly decreases across a payment sequence**
    #[test]
    fn prop_remaining_strictly_decreases(
        (schedule, term) in schedule_strategy(),
        chunk_seed in prop::collection::vec(1u32..=5, 1..=80),
    ) {
        let mut chunks = chunk_seed;
        chunks.push(term);

        let plans = pay_in_chunks(&schedule, term, &chunks);
        let mut previous = schedule.total_with_interest;
        for plan in &plans {
            prop_assert!(plan.new_remaining < previous);
            previous = plan.new_remaining;
        }
    }

    /// **A completed installment always rejects further payments**
    #[test]
    fn prop_completed_rejects_payment(
        (schedule, term) in schedule_strategy(),
        requested in 1u32..=10,
    ) {
        let result = PaymentPlan::build(
            &schedule,
            term,
            term,
            schedule.total_with_interest,
            requested,
        );
        prop_assert!(matches!(result, Err(InstallmentError::AlreadyCompleted)));
    }
}
