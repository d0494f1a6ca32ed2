//! Totals calculator.
//!
//! Pure arithmetic over `Decimal`. HTG and USD are computed side by side from
//! their own unit prices; the exchange rate only enters for fixed-amount
//! discounts, which are entered in HTG.
//!
//! Every stored amount is rounded to 2 dp, half away from zero.

use plus_shared::types::money::{has_scale_at_most, round_money};
use plus_shared::types::{DualAmount, MAX_EXCHANGE_RATE, is_storable_amount};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::BillingError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// How a document-level discount is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Percentage of the subtotal.
    #[default]
    Percent,
    /// Fixed HTG amount.
    Amount,
}

impl DiscountType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percent => "percent",
            Self::Amount => "amount",
        }
    }
}

/// One document line as entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineInput {
    /// Units sold.
    pub quantity: i32,
    /// Unit price in HTG.
    pub unit_price_htg: Decimal,
    /// Unit price in USD.
    pub unit_price_usd: Decimal,
    /// Line discount in percent.
    pub discount_pct: Decimal,
}

/// Document-level pricing parameters, frozen on the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingParams {
    /// Discount kind.
    pub discount_type: DiscountType,
    /// Discount value (percent or HTG amount).
    pub discount_value: Decimal,
    /// Tax rate in percent.
    pub tax_rate: Decimal,
    /// HTG per USD.
    pub exchange_rate: Decimal,
}

/// Document totals in both currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals.
    pub subtotal: DualAmount,
    /// Document discount.
    pub discount: DualAmount,
    /// Tax on the discounted subtotal.
    pub tax: DualAmount,
    /// `subtotal - discount + tax`.
    pub total: DualAmount,
}

/// Computes one line total in both currencies.
#[must_use]
pub fn compute_line(line: &LineInput) -> DualAmount {
    let quantity = Decimal::from(line.quantity);
    let factor = Decimal::ONE - line.discount_pct / HUNDRED;
    DualAmount::new(
        round_money(line.unit_price_htg * quantity * factor),
        round_money(line.unit_price_usd * quantity * factor),
    )
}

fn compute_discount(subtotal: DualAmount, params: &PricingParams) -> DualAmount {
    let raw = match params.discount_type {
        DiscountType::Percent => DualAmount::new(
            subtotal.htg * params.discount_value / HUNDRED,
            subtotal.usd * params.discount_value / HUNDRED,
        ),
        DiscountType::Amount => DualAmount::new(
            params.discount_value,
            if params.exchange_rate.is_zero() {
                Decimal::ZERO
            } else {
                params.discount_value / params.exchange_rate
            },
        ),
    }
    .rounded();

    DualAmount::new(raw.htg.min(subtotal.htg), raw.usd.min(subtotal.usd))
}

/// Computes subtotal, discount, tax and total for a document.
///
/// Inputs are assumed to have passed [`validate_line`] and
/// [`validate_pricing`]; [`validate_totals`] then checks the result fits
/// storage. An empty item list yields all-zero totals.
#[must_use]
pub fn compute_totals(items: &[LineInput], params: &PricingParams) -> Totals {
    let subtotal: DualAmount = items.iter().map(compute_line).sum();
    let discount = compute_discount(subtotal, params);
    let taxable = subtotal - discount;
    let tax = DualAmount::new(
        taxable.htg * params.tax_rate / HUNDRED,
        taxable.usd * params.tax_rate / HUNDRED,
    )
    .rounded();

    Totals {
        subtotal,
        discount,
        tax,
        total: (taxable + tax).rounded(),
    }
}

/// Percentages are stored as `NUMERIC(5, 2)`.
fn is_percent(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= HUNDRED && has_scale_at_most(value, 2)
}

/// Validates one line before it is priced.
///
/// Prices and percentages must be storable exactly as given, so the stored
/// line always recomputes to the stored total.
pub fn validate_line(line: &LineInput) -> Result<(), BillingError> {
    if line.quantity <= 0 {
        return Err(BillingError::validation("quantity must be greater than 0"));
    }
    if line.unit_price_htg.is_sign_negative() || line.unit_price_usd.is_sign_negative() {
        return Err(BillingError::validation("unit prices cannot be negative"));
    }
    if !is_storable_amount(line.unit_price_htg) || !is_storable_amount(line.unit_price_usd) {
        return Err(BillingError::validation(
            "unit prices must be below 1000000000000 with at most 2 decimals",
        ));
    }
    if !is_percent(line.discount_pct) {
        return Err(BillingError::validation(
            "line discount must be between 0 and 100 with at most 2 decimals",
        ));
    }
    Ok(())
}

/// Validates document-level pricing parameters.
pub fn validate_pricing(params: &PricingParams) -> Result<(), BillingError> {
    if params.discount_value < Decimal::ZERO {
        return Err(BillingError::validation("discount cannot be negative"));
    }
    if !is_storable_amount(params.discount_value) {
        return Err(BillingError::validation(
            "discount must be below 1000000000000 with at most 2 decimals",
        ));
    }
    if params.discount_type == DiscountType::Percent && params.discount_value > HUNDRED {
        return Err(BillingError::validation(
            "percent discount cannot exceed 100",
        ));
    }
    if !is_percent(params.tax_rate) {
        return Err(BillingError::validation(
            "tax rate must be between 0 and 100 with at most 2 decimals",
        ));
    }
    validate_exchange_rate(params.exchange_rate)
}

/// Exchange rates are stored as `NUMERIC(12, 4)`.
pub fn validate_exchange_rate(rate: Decimal) -> Result<(), BillingError> {
    if rate <= Decimal::ZERO {
        return Err(BillingError::validation(
            "exchange rate must be greater than 0",
        ));
    }
    if rate >= MAX_EXCHANGE_RATE || !has_scale_at_most(rate, 4) {
        return Err(BillingError::validation(
            "exchange rate must be below 100000000 with at most 4 decimals",
        ));
    }
    Ok(())
}

/// Checks that computed totals fit the money columns.
pub fn validate_totals(totals: &Totals) -> Result<(), BillingError> {
    let fits = [totals.subtotal, totals.discount, totals.tax, totals.total]
        .iter()
        .all(|amount| is_storable_amount(amount.htg) && is_storable_amount(amount.usd));
    if fits {
        Ok(())
    } else {
        Err(BillingError::validation(
            "document total must be below 1000000000000",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn params(discount_type: DiscountType, value: Decimal, tax: Decimal) -> PricingParams {
        PricingParams {
            discount_type,
            discount_value: value,
            tax_rate: tax,
            exchange_rate: dec!(132),
        }
    }

    fn line(quantity: i32, htg: Decimal, usd: Decimal, pct: Decimal) -> LineInput {
        LineInput {
            quantity,
            unit_price_htg: htg,
            unit_price_usd: usd,
            discount_pct: pct,
        }
    }

    #[test]
    fn test_single_item_with_tax() {
        let totals = compute_totals(
            &[line(3, dec!(100), dec!(0.76), dec!(0))],
            &params(DiscountType::Amount, dec!(0), dec!(10)),
        );

        assert_eq!(totals.subtotal.htg, dec!(300.00));
        assert_eq!(totals.discount.htg, dec!(0));
        assert_eq!(totals.tax.htg, dec!(30.00));
        assert_eq!(totals.total.htg, dec!(330.00));
        assert_eq!(totals.subtotal.usd, dec!(2.28));
        assert_eq!(totals.total.usd, dec!(2.51));
    }

    #[test]
    fn test_empty_items_yield_zero() {
        let totals = compute_totals(&[], &params(DiscountType::Amount, dec!(50), dec!(10)));
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_line_discount_and_rounding() {
        // 3 × 33.335 × 0.9 = 90.0045 → 90.00
        let total = compute_line(&line(3, dec!(33.335), dec!(0.255), dec!(10)));
        assert_eq!(total.htg, dec!(90.00));
        // 3 × 0.255 × 0.9 = 0.6885 → 0.69
        assert_eq!(total.usd, dec!(0.69));
    }

    #[test]
    fn test_percent_discount() {
        let totals = compute_totals(
            &[line(2, dec!(500), dec!(4), dec!(0))],
            &params(DiscountType::Percent, dec!(15), dec!(0)),
        );
        assert_eq!(totals.discount, DualAmount::new(dec!(150.00), dec!(1.20)));
        assert_eq!(totals.total, DualAmount::new(dec!(850.00), dec!(6.80)));
    }

    #[test]
    fn test_amount_discount_converts_usd_side_with_rate() {
        let totals = compute_totals(
            &[line(1, dec!(1320), dec!(10), dec!(0))],
            &params(DiscountType::Amount, dec!(264), dec!(0)),
        );
        assert_eq!(totals.discount, DualAmount::new(dec!(264), dec!(2.00)));
        assert_eq!(totals.total, DualAmount::new(dec!(1056.00), dec!(8.00)));
    }

    #[test]
    fn test_discount_is_capped_at_subtotal() {
        let totals = compute_totals(
            &[line(1, dec!(100), dec!(1), dec!(0))],
            &params(DiscountType::Amount, dec!(5000), dec!(10)),
        );
        assert_eq!(totals.discount, totals.subtotal);
        assert_eq!(totals.tax, DualAmount::ZERO);
        assert_eq!(totals.total, DualAmount::ZERO);
    }

    #[rstest]
    #[case(line(0, dec!(1), dec!(1), dec!(0)))]
    #[case(line(-2, dec!(1), dec!(1), dec!(0)))]
    #[case(line(1, dec!(-1), dec!(1), dec!(0)))]
    #[case(line(1, dec!(1), dec!(-0.01), dec!(0)))]
    #[case(line(1, dec!(1), dec!(1), dec!(100.01)))]
    #[case(line(1, dec!(1), dec!(1), dec!(-5)))]
    #[case(line(1000, Decimal::from_i128_with_scale(10_i128.pow(26), 0), dec!(1), dec!(0)))]
    #[case(line(1, dec!(1000000000000), dec!(1), dec!(0)))]
    #[case(line(1, dec!(1), dec!(1000000000000), dec!(0)))]
    #[case(line(3, dec!(33.335), dec!(1), dec!(0)))]
    #[case(line(3, dec!(1), dec!(0.255), dec!(0)))]
    #[case(line(1, dec!(1), dec!(1), dec!(12.345)))]
    fn test_invalid_lines(#[case] input: LineInput) {
        assert!(matches!(validate_line(&input), Err(BillingError::Validation(_))));
    }

    #[rstest]
    #[case(params(DiscountType::Amount, dec!(-1), dec!(10)))]
    #[case(params(DiscountType::Percent, dec!(101), dec!(10)))]
    #[case(params(DiscountType::Percent, dec!(10), dec!(100.5)))]
    #[case(params(DiscountType::Percent, dec!(10), dec!(-1)))]
    #[case(PricingParams { exchange_rate: dec!(0), ..params(DiscountType::Amount, dec!(0), dec!(10)) })]
    #[case(params(DiscountType::Amount, dec!(1000000000000), dec!(10)))]
    #[case(params(DiscountType::Amount, Decimal::from_i128_with_scale(10_i128.pow(26), 0), dec!(10)))]
    #[case(params(DiscountType::Percent, dec!(12.345), dec!(10)))]
    #[case(params(DiscountType::Percent, dec!(10), dec!(10.125)))]
    #[case(PricingParams { exchange_rate: dec!(100000000), ..params(DiscountType::Amount, dec!(0), dec!(10)) })]
    #[case(PricingParams { exchange_rate: dec!(132.12345), ..params(DiscountType::Amount, dec!(0), dec!(10)) })]
    fn test_invalid_pricing(#[case] input: PricingParams) {
        assert!(matches!(
            validate_pricing(&input),
            Err(BillingError::Validation(_))
        ));
    }

    #[test]
    fn test_largest_valid_line_computes_without_overflow() {
        let input = line(i32::MAX, dec!(999999999999.99), dec!(999999999999.99), dec!(0));
        assert!(validate_line(&input).is_ok());

        let totals = compute_totals(&[input], &params(DiscountType::Percent, dec!(0), dec!(100)));
        assert!(matches!(validate_totals(&totals), Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_ordinary_totals_are_storable() {
        let totals = compute_totals(
            &[line(3, dec!(100), dec!(0.76), dec!(0))],
            &params(DiscountType::Amount, dec!(0), dec!(10)),
        );
        assert!(validate_totals(&totals).is_ok());
    }

    #[test]
    fn test_rate_with_four_decimals_is_allowed() {
        assert!(validate_exchange_rate(dec!(131.5025)).is_ok());
    }

    #[test]
    fn test_amount_discount_above_hundred_is_allowed() {
        assert!(validate_pricing(&params(DiscountType::Amount, dec!(2500), dec!(10))).is_ok());
    }
}
