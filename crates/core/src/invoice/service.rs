//! Invoice state checks.

use crate::error::BillingError;
use crate::invoice::types::InvoiceStatus;

const ENTITY: &str = "invoice";

/// Stateless invoice state machine.
pub struct InvoiceLifecycle;

impl InvoiceLifecycle {
    /// Payments are accepted only while the invoice is unpaid or partial.
    pub fn ensure_accepts_payment(current: InvoiceStatus) -> Result<(), BillingError> {
        if current.is_open() {
            Ok(())
        } else {
            Err(BillingError::invalid_state(ENTITY, current, "add payment to"))
        }
    }

    /// `unpaid | partial → cancelled`. Paid invoices are settled and stay paid.
    pub fn cancel(current: InvoiceStatus) -> Result<InvoiceStatus, BillingError> {
        if current.is_open() {
            Ok(InvoiceStatus::Cancelled)
        } else {
            Err(BillingError::invalid_state(ENTITY, current, "cancel"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(InvoiceStatus::Unpaid, true)]
    #[case(InvoiceStatus::Partial, true)]
    #[case(InvoiceStatus::Paid, false)]
    #[case(InvoiceStatus::Cancelled, false)]
    fn test_accepts_payment(#[case] status: InvoiceStatus, #[case] accepted: bool) {
        assert_eq!(InvoiceLifecycle::ensure_accepts_payment(status).is_ok(), accepted);
    }

    #[rstest]
    #[case(InvoiceStatus::Unpaid, true)]
    #[case(InvoiceStatus::Partial, true)]
    #[case(InvoiceStatus::Paid, false)]
    #[case(InvoiceStatus::Cancelled, false)]
    fn test_cancel(#[case] status: InvoiceStatus, #[case] allowed: bool) {
        assert_eq!(InvoiceLifecycle::cancel(status).is_ok(), allowed);
    }

    #[test]
    fn test_payment_on_cancelled_message() {
        let err = InvoiceLifecycle::ensure_accepts_payment(InvoiceStatus::Cancelled).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot add payment to invoice with status cancelled"
        );
    }
}
