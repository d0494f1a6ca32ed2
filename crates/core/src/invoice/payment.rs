//! Balance and status derivation from the payment ledger.

use plus_shared::types::{Currency, DualAmount, is_storable_amount};
use rust_decimal::Decimal;

use crate::error::BillingError;
use crate::invoice::types::InvoiceStatus;

/// Result of re-reading an invoice's payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentState {
    /// Sum of all payments.
    pub amount_paid: DualAmount,
    /// `max(0, total - amount_paid)` per currency.
    pub balance_due: DualAmount,
    /// Derived status.
    pub status: InvoiceStatus,
}

/// Derives balance and status from the invoice total and the sum of its
/// payments.
///
/// The status follows the invoice's own currency: `paid` once that balance
/// reaches zero, `unpaid` while nothing has been paid, `partial` otherwise.
/// Overpayment is accepted and leaves a zero balance.
#[must_use]
pub fn derive_payment_state(
    total: DualAmount,
    amount_paid: DualAmount,
    currency: Currency,
) -> PaymentState {
    let balance_due = total.saturating_sub(amount_paid);
    let paid = amount_paid.in_currency(currency);

    let status = if balance_due.in_currency(currency) <= Decimal::ZERO {
        InvoiceStatus::Paid
    } else if paid <= Decimal::ZERO {
        InvoiceStatus::Unpaid
    } else {
        InvoiceStatus::Partial
    };

    PaymentState {
        amount_paid,
        balance_due,
        status,
    }
}

/// Payments must be strictly positive and storable as given: a sub-cent
/// amount would otherwise be recorded as zero.
pub fn validate_payment_amount(amount: Decimal) -> Result<(), BillingError> {
    if amount <= Decimal::ZERO {
        return Err(BillingError::validation(
            "payment amount must be greater than 0",
        ));
    }
    if !is_storable_amount(amount) {
        return Err(BillingError::validation(
            "payment amount must be below 1000000000000 with at most 2 decimals",
        ));
    }
    Ok(())
}

/// Validates a payment given in `currency` and derives the other side with
/// the invoice's `rate`.
pub fn convert_payment(
    amount: Decimal,
    currency: Currency,
    rate: Decimal,
) -> Result<DualAmount, BillingError> {
    validate_payment_amount(amount)?;
    let converted = DualAmount::from_single(amount, currency, rate);
    if !is_storable_amount(converted.htg) || !is_storable_amount(converted.usd) {
        return Err(BillingError::validation(
            "converted payment amount must be below 1000000000000",
        ));
    }
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn htg(total: Decimal, paid: Decimal) -> PaymentState {
        derive_payment_state(
            DualAmount::new(total, dec!(0)),
            DualAmount::new(paid, dec!(0)),
            Currency::Htg,
        )
    }

    #[test]
    fn test_full_payment() {
        let state = htg(dec!(330.00), dec!(330.00));
        assert_eq!(state.status, InvoiceStatus::Paid);
        assert_eq!(state.balance_due.htg, dec!(0));
    }

    #[test]
    fn test_partial_payment() {
        let state = htg(dec!(330.00), dec!(100.00));
        assert_eq!(state.status, InvoiceStatus::Partial);
        assert_eq!(state.balance_due.htg, dec!(230.00));
    }

    #[test]
    fn test_no_payment() {
        let state = htg(dec!(330.00), dec!(0));
        assert_eq!(state.status, InvoiceStatus::Unpaid);
        assert_eq!(state.balance_due.htg, dec!(330.00));
    }

    #[test]
    fn test_overpayment_floors_balance() {
        let state = htg(dec!(330.00), dec!(400.00));
        assert_eq!(state.status, InvoiceStatus::Paid);
        assert_eq!(state.balance_due.htg, dec!(0));
    }

    #[test]
    fn test_usd_invoice_uses_usd_side() {
        let state = derive_payment_state(
            DualAmount::new(dec!(1320), dec!(10)),
            DualAmount::new(dec!(1300), dec!(10)),
            Currency::Usd,
        );
        assert_eq!(state.status, InvoiceStatus::Paid);
        assert_eq!(state.balance_due.htg, dec!(20));
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-5))]
    #[case(dec!(0.001))]
    #[case(dec!(10.005))]
    #[case(dec!(1000000000000))]
    #[case(Decimal::from_i128_with_scale(10_i128.pow(27), 0))]
    fn test_rejected_payment_amounts(#[case] amount: Decimal) {
        assert!(matches!(
            validate_payment_amount(amount),
            Err(BillingError::Validation(_))
        ));
    }

    #[test]
    fn test_smallest_payment_is_one_cent() {
        assert!(validate_payment_amount(dec!(0.01)).is_ok());
        assert!(validate_payment_amount(dec!(0.010)).is_ok());
    }

    #[test]
    fn test_convert_payment_derives_other_side() {
        let amount = convert_payment(dec!(10), Currency::Usd, dec!(131.5)).unwrap();
        assert_eq!(amount, DualAmount::new(dec!(1315.00), dec!(10.00)));
    }

    #[test]
    fn test_convert_payment_rejects_overflowing_conversion() {
        // Valid in USD, but the HTG side no longer fits.
        let result = convert_payment(dec!(999999999999), Currency::Usd, dec!(132));
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }
}
