//! Property-based tests for the totals calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::totals::{
    DiscountType, LineInput, PricingParams, compute_totals, validate_line, validate_pricing,
    validate_totals,
};

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|bp| Decimal::new(bp, 2))
}

fn line() -> impl Strategy<Value = LineInput> {
    (1i32..1_000, money(), money(), percent()).prop_map(|(quantity, htg, usd, pct)| LineInput {
        quantity,
        unit_price_htg: htg,
        unit_price_usd: usd,
        discount_pct: pct,
    })
}

fn pricing() -> impl Strategy<Value = PricingParams> {
    (
        prop_oneof![Just(DiscountType::Percent), Just(DiscountType::Amount)],
        percent(),
        money(),
        percent(),
        (1i64..100_000i64).prop_map(|c| Decimal::new(c, 2)),
    )
        .prop_map(|(discount_type, pct, amount, tax_rate, exchange_rate)| PricingParams {
            discount_type,
            discount_value: match discount_type {
                DiscountType::Percent => pct,
                DiscountType::Amount => amount,
            },
            tax_rate,
            exchange_rate,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_generated_lines_are_valid(l in line()) {
        prop_assert!(validate_line(&l).is_ok());
    }

    #[test]
    fn prop_valid_inputs_yield_storable_totals(
        items in prop::collection::vec(line(), 0..12),
        params in pricing(),
    ) {
        prop_assert!(validate_pricing(&params).is_ok());
        prop_assert!(validate_totals(&compute_totals(&items, &params)).is_ok());
    }

    #[test]
    fn prop_compute_totals_is_deterministic(
        items in prop::collection::vec(line(), 0..12),
        params in pricing(),
    ) {
        prop_assert_eq!(compute_totals(&items, &params), compute_totals(&items, &params));
    }

    #[test]
    fn prop_totals_are_never_negative(
        items in prop::collection::vec(line(), 0..12),
        params in pricing(),
    ) {
        let t = compute_totals(&items, &params);
        for amount in [t.subtotal, t.discount, t.tax, t.total] {
            prop_assert!(amount.htg >= Decimal::ZERO);
            prop_assert!(amount.usd >= Decimal::ZERO);
        }
        prop_assert!(t.discount.htg <= t.subtotal.htg);
        prop_assert!(t.discount.usd <= t.subtotal.usd);
    }

    #[test]
    fn prop_amounts_have_two_decimals(
        items in prop::collection::vec(line(), 1..12),
        params in pricing(),
    ) {
        let t = compute_totals(&items, &params);
        for amount in [t.subtotal, t.discount, t.tax, t.total] {
            prop_assert!(amount.htg.scale() <= 2);
            prop_assert!(amount.usd.scale() <= 2);
        }
    }

    #[test]
    fn prop_total_is_subtotal_minus_discount_plus_tax(
        items in prop::collection::vec(line(), 0..12),
        params in pricing(),
    ) {
        let t = compute_totals(&items, &params);
        prop_assert_eq!(t.total, t.subtotal - t.discount + t.tax);
    }

    #[test]
    fn prop_item_order_does_not_matter(
        items in prop::collection::vec(line(), 0..12),
        params in pricing(),
    ) {
        let mut reversed = items.clone();
        reversed.reverse();
        prop_assert_eq!(compute_totals(&items, &params), compute_totals(&reversed, &params));
    }
}
