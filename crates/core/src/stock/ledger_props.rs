//! Property-based tests for stock arithmetic.

use proptest::prelude::*;
use uuid::Uuid;

use super::ledger::apply_change;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// after = before + change, and never below zero.
    #[test]
    fn prop_movement_is_reconciled(before in 0i32..100_000, change in -100_000i32..100_000) {
        match apply_change(Uuid::nil(), before, change) {
            Ok(m) => {
                prop_assert_eq!(m.after, m.before + m.change);
                prop_assert!(m.after >= 0);
            }
            Err(_) => prop_assert!(before + change < 0),
        }
    }

    /// Replaying a movement history keeps the running quantity equal to the
    /// last movement's `after`.
    #[test]
    fn prop_history_replay(changes in prop::collection::vec(-50i32..50, 1..40)) {
        let mut quantity = 0;
        let mut last_after = None;
        for change in changes {
            if let Ok(m) = apply_change(Uuid::nil(), quantity, change) {
                prop_assert_eq!(m.before, quantity);
                quantity = m.after;
                last_after = Some(m.after);
            }
        }
        if let Some(after) = last_after {
            prop_assert_eq!(quantity, after);
        }
    }

    /// A sale followed by its return restores the original quantity.
    #[test]
    fn prop_sale_then_return_restores(
        (before, sold) in (1i32..10_000).prop_flat_map(|b| (Just(b), 1..=b)),
    ) {
        let sale = apply_change(Uuid::nil(), before, -sold).unwrap();
        let back = apply_change(Uuid::nil(), sale.after, sold).unwrap();
        prop_assert_eq!(back.after, before);
    }
}
