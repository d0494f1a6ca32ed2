//! Quote state transitions.
//!
//! Stateless checks: callers load the quote under a row lock, ask for the
//! target status, then persist it in the same transaction.

use crate::error::BillingError;
use crate::quote::types::QuoteStatus;

const ENTITY: &str = "quote";

/// Stateless quote state machine.
pub struct QuoteLifecycle;

impl QuoteLifecycle {
    /// Fails unless the quote may still be edited.
    pub fn ensure_editable(current: QuoteStatus) -> Result<(), BillingError> {
        if current.is_editable() {
            Ok(())
        } else {
            Err(BillingError::invalid_state(ENTITY, current, "update"))
        }
    }

    /// `draft → sent`.
    pub fn send(current: QuoteStatus) -> Result<QuoteStatus, BillingError> {
        Self::transition(current, QuoteStatus::Sent, "send")
    }

    /// `draft | sent → cancelled`. A second cancel is rejected.
    pub fn cancel(current: QuoteStatus) -> Result<QuoteStatus, BillingError> {
        Self::transition(current, QuoteStatus::Cancelled, "cancel")
    }

    /// `draft | sent → converted`, only with at least one item.
    pub fn convert(current: QuoteStatus, item_count: usize) -> Result<QuoteStatus, BillingError> {
        let next = Self::transition(current, QuoteStatus::Converted, "convert")?;
        if item_count == 0 {
            return Err(BillingError::EmptyDocument);
        }
        Ok(next)
    }

    fn transition(
        current: QuoteStatus,
        target: QuoteStatus,
        action: &'static str,
    ) -> Result<QuoteStatus, BillingError> {
        if Self::is_valid_transition(current, target) {
            Ok(target)
        } else {
            Err(BillingError::invalid_state(ENTITY, current, action))
        }
    }

    /// Valid transitions:
    /// - Draft → Sent
    /// - Draft | Sent → Converted
    /// - Draft | Sent → Cancelled
    #[must_use]
    pub const fn is_valid_transition(from: QuoteStatus, to: QuoteStatus) -> bool {
        matches!(
            (from, to),
            (QuoteStatus::Draft, QuoteStatus::Sent)
                | (
                    QuoteStatus::Draft | QuoteStatus::Sent,
                    QuoteStatus::Converted | QuoteStatus::Cancelled
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_from_draft() {
        assert_eq!(QuoteLifecycle::send(QuoteStatus::Draft).unwrap(), QuoteStatus::Sent);
    }

    #[test]
    fn test_send_twice_fails() {
        let err = QuoteLifecycle::send(QuoteStatus::Sent).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_STATE");
    }

    #[test]
    fn test_second_cancel_is_invalid_state() {
        let cancelled = QuoteLifecycle::cancel(QuoteStatus::Sent).unwrap();
        assert!(matches!(
            QuoteLifecycle::cancel(cancelled),
            Err(BillingError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_convert_empty_quote() {
        assert!(matches!(
            QuoteLifecycle::convert(QuoteStatus::Draft, 0),
            Err(BillingError::EmptyDocument)
        ));
    }

    #[test]
    fn test_convert_checks_state_before_items() {
        assert!(matches!(
            QuoteLifecycle::convert(QuoteStatus::Converted, 0),
            Err(BillingError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_update_converted_quote_fails() {
        let err = QuoteLifecycle::ensure_editable(QuoteStatus::Converted).unwrap_err();
        assert_eq!(err.to_string(), "Cannot update quote with status converted");
    }
}
