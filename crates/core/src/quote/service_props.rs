//! Property-based tests for the quote state machine.

use proptest::prelude::*;

use crate::error::BillingError;
use crate::quote::service::QuoteLifecycle;
use crate::quote::types::QuoteStatus;

fn arb_status() -> impl Strategy<Value = QuoteStatus> {
    prop_oneof![
        Just(QuoteStatus::Draft),
        Just(QuoteStatus::Sent),
        Just(QuoteStatus::Converted),
        Just(QuoteStatus::Cancelled),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Every successful operation lands on a valid transition.
    #[test]
    fn prop_successful_operations_are_valid_transitions(
        status in arb_status(),
        items in 0usize..5,
    ) {
        let results = [
            QuoteLifecycle::send(status),
            QuoteLifecycle::cancel(status),
            QuoteLifecycle::convert(status, items),
        ];
        for next in results.into_iter().flatten() {
            prop_assert!(QuoteLifecycle::is_valid_transition(status, next));
        }
    }

    /// Terminal states reject every operation with InvalidState.
    #[test]
    fn prop_terminal_states_are_immutable(
        status in prop_oneof![Just(QuoteStatus::Converted), Just(QuoteStatus::Cancelled)],
        items in 0usize..5,
    ) {
        let is_invalid_state = |r: Result<QuoteStatus, BillingError>| {
            matches!(r, Err(BillingError::InvalidState { .. }))
        };
        prop_assert!(QuoteLifecycle::ensure_editable(status).is_err());
        prop_assert!(is_invalid_state(QuoteLifecycle::send(status)));
        prop_assert!(is_invalid_state(QuoteLifecycle::cancel(status)));
        prop_assert!(is_invalid_state(QuoteLifecycle::convert(status, items)));
    }

    /// Editable quotes with items always convert.
    #[test]
    fn prop_editable_quotes_with_items_convert(
        status in prop_oneof![Just(QuoteStatus::Draft), Just(QuoteStatus::Sent)],
        items in 1usize..50,
    ) {
        prop_assert_eq!(QuoteLifecycle::convert(status, items).unwrap(), QuoteStatus::Converted);
    }

    #[test]
    fn prop_status_string_round_trip(status in arb_status()) {
        prop_assert_eq!(QuoteStatus::parse(status.as_str()), Some(status));
    }
}
