//! Quantity arithmetic for stock movements.

use uuid::Uuid;

use crate::error::BillingError;
use crate::stock::types::MovementType;

/// A computed movement, ready to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    /// Quantity before the movement.
    pub before: i32,
    /// Signed change.
    pub change: i32,
    /// Quantity after the movement.
    pub after: i32,
}

/// Applies `change` to `before`, rejecting results below zero.
pub fn apply_change(product_id: Uuid, before: i32, change: i32) -> Result<StockChange, BillingError> {
    let after = before
        .checked_add(change)
        .ok_or_else(|| BillingError::validation("stock quantity out of range"))?;
    if after < 0 {
        return Err(BillingError::NegativeStock {
            product_id,
            available: before,
            change,
        });
    }
    Ok(StockChange {
        before,
        change,
        after,
    })
}

/// Turns a manual adjustment request into a signed change.
///
/// `purchase` and `return_item` add a positive quantity, `sale` removes a
/// positive quantity, `adjustment` applies a non-zero signed quantity.
pub fn signed_change(movement_type: MovementType, quantity: i32) -> Result<i32, BillingError> {
    match movement_type {
        MovementType::Purchase | MovementType::ReturnItem if quantity > 0 => Ok(quantity),
        MovementType::Sale if quantity > 0 => Ok(-quantity),
        MovementType::Adjustment if quantity != 0 => Ok(quantity),
        MovementType::Adjustment => Err(BillingError::validation(
            "adjustment quantity cannot be zero",
        )),
        _ => Err(BillingError::validation(format!(
            "{movement_type} quantity must be greater than 0"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_sale_debit() {
        let change = apply_change(Uuid::nil(), 10, -3).unwrap();
        assert_eq!(change, StockChange { before: 10, change: -3, after: 7 });
    }

    #[test]
    fn test_debit_to_exactly_zero_is_allowed() {
        assert_eq!(apply_change(Uuid::nil(), 3, -3).unwrap().after, 0);
    }

    #[test]
    fn test_negative_stock_rejected() {
        let product = Uuid::new_v4();
        match apply_change(product, 2, -3) {
            Err(BillingError::NegativeStock {
                product_id,
                available,
                change,
            }) => {
                assert_eq!(product_id, product);
                assert_eq!(available, 2);
                assert_eq!(change, -3);
            }
            other => panic!("expected NegativeStock, got {other:?}"),
        }
    }

    #[test]
    fn test_overflow_is_validation_error() {
        assert!(matches!(
            apply_change(Uuid::nil(), i32::MAX, 1),
            Err(BillingError::Validation(_))
        ));
    }

    #[rstest]
    #[case(MovementType::Purchase, 5, Some(5))]
    #[case(MovementType::ReturnItem, 2, Some(2))]
    #[case(MovementType::Sale, 4, Some(-4))]
    #[case(MovementType::Adjustment, -7, Some(-7))]
    #[case(MovementType::Adjustment, 7, Some(7))]
    #[case(MovementType::Adjustment, 0, None)]
    #[case(MovementType::Purchase, 0, None)]
    #[case(MovementType::Sale, -4, None)]
    fn test_signed_change(
        #[case] movement_type: MovementType,
        #[case] quantity: i32,
        #[case] expected: Option<i32>,
    ) {
        assert_eq!(signed_change(movement_type, quantity).ok(), expected);
    }
}
