//! Property-based tests for payment derivation.

use plus_shared::types::{Currency, DualAmount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::payment::derive_payment_state;
use super::service::InvoiceLifecycle;
use super::types::InvoiceStatus;

fn cents() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|c| Decimal::new(c, 2))
}

fn dual() -> impl Strategy<Value = DualAmount> {
    (cents(), cents()).prop_map(|(htg, usd)| DualAmount::new(htg, usd))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// balance_due = max(0, total - paid) on both sides.
    #[test]
    fn prop_balance_is_floored_difference(
        total in dual(),
        paid in dual(),
        currency in prop_oneof![Just(Currency::Htg), Just(Currency::Usd)],
    ) {
        let state = derive_payment_state(total, paid, currency);
        prop_assert_eq!(state.balance_due.htg, (total.htg - paid.htg).max(Decimal::ZERO));
        prop_assert_eq!(state.balance_due.usd, (total.usd - paid.usd).max(Decimal::ZERO));
        prop_assert_eq!(state.amount_paid, paid);
    }

    /// Sequential payments summed in any split reach the same final state.
    #[test]
    fn prop_payment_ledger_sum_is_order_free(
        total in cents(),
        payments in prop::collection::vec(cents(), 0..8),
    ) {
        let forward: Decimal = payments.iter().copied().sum();
        let backward: Decimal = payments.iter().rev().copied().sum();
        let a = derive_payment_state(
            DualAmount::new(total, Decimal::ZERO),
            DualAmount::new(forward, Decimal::ZERO),
            Currency::Htg,
        );
        let b = derive_payment_state(
            DualAmount::new(total, Decimal::ZERO),
            DualAmount::new(backward, Decimal::ZERO),
            Currency::Htg,
        );
        prop_assert_eq!(a, b);
    }

    /// Derived status is never cancelled and only paid when nothing is owed.
    #[test]
    fn prop_derived_status(total in dual(), paid in dual()) {
        let state = derive_payment_state(total, paid, Currency::Htg);
        prop_assert_ne!(state.status, InvoiceStatus::Cancelled);
        prop_assert_eq!(
            state.status == InvoiceStatus::Paid,
            state.balance_due.htg.is_zero()
        );
        if state.status == InvoiceStatus::Paid {
            prop_assert!(InvoiceLifecycle::ensure_accepts_payment(state.status).is_err());
        }
    }
}
