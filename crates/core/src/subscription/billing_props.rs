//! Property-based tests for the day-5 billing rule.

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use super::billing::{BILLING_DAY, renewal_end};

fn date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2040, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_end_is_on_billing_day(today in date(), end in proptest::option::of(date()), months in 1u32..36) {
        let new_end = renewal_end(today, end, months).unwrap();
        prop_assert_eq!(new_end.day(), BILLING_DAY);
    }

    #[test]
    fn prop_end_is_n_months_after_base(today in date(), end in proptest::option::of(date()), months in 1u32..36) {
        let base = end.map_or(today, |e| e.max(today));
        let new_end = renewal_end(today, end, months).unwrap();
        prop_assert_eq!(month_index(new_end) - month_index(base), i64::from(months));
    }

    /// Renewal never shortens a subscription and always lands after today.
    #[test]
    fn prop_renewal_extends(today in date(), end in proptest::option::of(date()), months in 1u32..36) {
        let new_end = renewal_end(today, end, months).unwrap();
        prop_assert!(new_end > today);
        if let Some(e) = end {
            prop_assert!(new_end > e);
        }
    }
}
