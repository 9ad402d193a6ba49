//! Property-based tests for delivery date computation
//!
//! These tests verify:
//! - Repeated calls with identical inputs agree
//! - The computed date is always strictly after the anchor
//! - Monthly arithmetic clamps instead of overflowing the target month
//! - Weekly cadences preserve the weekday

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use restock_lifecycle::next_delivery_date;
use restock_types::{Frequency, IntervalUnit};

// ============================================================================
// Strategies
// ============================================================================

/// Generate anchor dates across several decades
fn arb_anchor() -> impl Strategy<Value = NaiveDate> {
    (2000i32..2100, 1u32..=12, 1u32..=31).prop_filter_map("valid date", |(y, m, d)| {
        NaiveDate::from_ymd_opt(y, m, d)
    })
}

/// Generate every frequency shape
fn arb_frequency() -> impl Strategy<Value = Frequency> {
    prop_oneof![
        Just(Frequency::Weekly),
        Just(Frequency::BiWeekly),
        Just(Frequency::Monthly),
        (1u32..=36, arb_unit()).prop_map(|(value, unit)| Frequency::Custom { value, unit }),
    ]
}

fn arb_unit() -> impl Strategy<Value = IntervalUnit> {
    prop_oneof![
        Just(IntervalUnit::Days),
        Just(IntervalUnit::Weeks),
        Just(IntervalUnit::Months),
    ]
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.unwrap().pred_opt().unwrap().day()
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: identical inputs always produce identical outputs
    #[test]
    fn prop_deterministic(frequency in arb_frequency(), anchor in arb_anchor()) {
        let first = next_delivery_date(&frequency, anchor);
        let second = next_delivery_date(&frequency, anchor);
        prop_assert_eq!(first, second);
    }

    /// Property: the next date is strictly after the anchor
    #[test]
    fn prop_strictly_after_anchor(frequency in arb_frequency(), anchor in arb_anchor()) {
        let next = next_delivery_date(&frequency, anchor);
        prop_assert!(next > anchor);
    }

    /// Property: monthly results stay inside the target month, clamped to
    /// its length (Jan 31 -> Feb 28/29, never an out-of-range date)
    #[test]
    fn prop_monthly_clamps(anchor in arb_anchor()) {
        let next = next_delivery_date(&Frequency::Monthly, anchor);

        let expected_month = if anchor.month() == 12 { 1 } else { anchor.month() + 1 };
        prop_assert_eq!(next.month(), expected_month);

        let clamp = anchor.day().min(days_in_month(next.year(), next.month()));
        prop_assert_eq!(next.day(), clamp);
    }

    /// Property: weekly and biweekly preserve the weekday
    #[test]
    fn prop_weekly_preserves_weekday(anchor in arb_anchor()) {
        prop_assert_eq!(
            next_delivery_date(&Frequency::Weekly, anchor).weekday(),
            anchor.weekday()
        );
        prop_assert_eq!(
            next_delivery_date(&Frequency::BiWeekly, anchor).weekday(),
            anchor.weekday()
        );
    }

    /// Property: custom day intervals advance by exactly the interval
    #[test]
    fn prop_custom_days_exact(anchor in arb_anchor(), value in 1u32..=365) {
        let next = next_delivery_date(
            &Frequency::Custom { value, unit: IntervalUnit::Days },
            anchor,
        );
        prop_assert_eq!(next - anchor, chrono::Duration::days(i64::from(value)));
    }
}
