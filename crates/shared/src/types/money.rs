//! Currencies and dual-currency amounts.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every document carries its amounts in both HTG and USD.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Currencies supported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Haitian Gourde
    #[default]
    Htg,
    /// US Dollar
    Usd,
}

impl Currency {
    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Htg => "HTG",
            Self::Usd => "USD",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HTG" => Ok(Self::Htg),
            "USD" => Ok(Self::Usd),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

/// Exclusive bound of a stored money amount (`NUMERIC(14, 2)`): 10^12.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Exclusive bound of a stored exchange rate (`NUMERIC(12, 4)`): 10^8.
pub const MAX_EXCHANGE_RATE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Rounds a money amount to 2 dp, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `value` carries no more than `dp` significant decimal places.
#[must_use]
pub fn has_scale_at_most(value: Decimal, dp: u32) -> bool {
    value.normalize().scale() <= dp
}

/// True when `amount` fits a money column as given, with no silent rounding.
#[must_use]
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount.abs() < MAX_AMOUNT && has_scale_at_most(amount, 2)
}

/// An amount expressed in both HTG and USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DualAmount {
    /// Amount in gourdes.
    pub htg: Decimal,
    /// Amount in dollars.
    pub usd: Decimal,
}

impl DualAmount {
    /// Both sides zero.
    pub const ZERO: Self = Self {
        htg: Decimal::ZERO,
        usd: Decimal::ZERO,
    };

    /// Creates a new amount.
    #[must_use]
    pub const fn new(htg: Decimal, usd: Decimal) -> Self {
        Self { htg, usd }
    }

    /// Builds both sides from an amount given in one currency, converting the
    /// other side with `rate` (HTG per USD).
    ///
    /// The HTG side saturates instead of overflowing; check the result with
    /// [`is_storable_amount`].
    #[must_use]
    pub fn from_single(amount: Decimal, currency: Currency, rate: Decimal) -> Self {
        match currency {
            Currency::Htg => Self {
                htg: round_money(amount),
                usd: if rate.is_zero() {
                    Decimal::ZERO
                } else {
                    round_money(amount / rate)
                },
            },
            Currency::Usd => Self {
                htg: round_money(amount.saturating_mul(rate)),
                usd: round_money(amount),
            },
        }
    }

    /// Side of the amount in `currency`.
    #[must_use]
    pub const fn in_currency(&self, currency: Currency) -> Decimal {
        match currency {
            Currency::Htg => self.htg,
            Currency::Usd => self.usd,
        }
    }

    /// Both sides rounded to 2 dp.
    #[must_use]
    pub fn rounded(self) -> Self {
        Self {
            htg: round_money(self.htg),
            usd: round_money(self.usd),
        }
    }

    /// Component-wise `max(0, self - other)`.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        Self {
            htg: (self.htg - other.htg).max(Decimal::ZERO),
            usd: (self.usd - other.usd).max(Decimal::ZERO),
        }
    }
}

impl std::ops::Add for DualAmount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            htg: self.htg + rhs.htg,
            usd: self.usd + rhs.usd,
        }
    }
}

impl std::ops::Sub for DualAmount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            htg: self.htg - rhs.htg,
            usd: self.usd - rhs.usd,
        }
    }
}

impl std::iter::Sum for DualAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[rstest]
    #[case(dec!(1.005), dec!(1.01))]
    #[case(dec!(1.004), dec!(1.00))]
    #[case(dec!(-1.005), dec!(-1.01))]
    #[case(dec!(2.5), dec!(2.50))]
    fn test_round_money_half_up(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round_money(input), expected);
    }

    #[test]
    fn test_from_single_htg() {
        let amount = DualAmount::from_single(dec!(330), Currency::Htg, dec!(132));
        assert_eq!(amount.htg, dec!(330.00));
        assert_eq!(amount.usd, dec!(2.50));
    }

    #[test]
    fn test_from_single_usd() {
        let amount = DualAmount::from_single(dec!(10), Currency::Usd, dec!(131.5));
        assert_eq!(amount.htg, dec!(1315.00));
        assert_eq!(amount.usd, dec!(10.00));
    }

    #[test]
    fn test_bounds_match_columns() {
        assert_eq!(MAX_AMOUNT, dec!(1000000000000));
        assert_eq!(MAX_EXCHANGE_RATE, dec!(100000000));
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(33.34), true)]
    #[case(dec!(33.340), true)]
    #[case(dec!(999999999999.99), true)]
    #[case(dec!(33.335), false)]
    #[case(dec!(0.001), false)]
    #[case(dec!(1000000000000), false)]
    #[case(Decimal::from_i128_with_scale(10_i128.pow(26), 0), false)]
    fn test_is_storable_amount(#[case] amount: Decimal, #[case] expected: bool) {
        assert_eq!(is_storable_amount(amount), expected);
    }

    #[test]
    fn test_from_single_saturates_huge_usd_amounts() {
        let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);
        let amount = DualAmount::from_single(huge, Currency::Usd, dec!(132));
        assert_eq!(amount.htg, Decimal::MAX.round_dp(2));
        assert!(!is_storable_amount(amount.htg));
    }

    #[test]
    fn test_saturating_sub_floors_at_zero() {
        let total = DualAmount::new(dec!(100), dec!(1));
        let paid = DualAmount::new(dec!(150), dec!(0.5));
        assert_eq!(
            total.saturating_sub(paid),
            DualAmount::new(dec!(0), dec!(0.5))
        );
    }

    #[test]
    fn test_sum() {
        let total: DualAmount = [
            DualAmount::new(dec!(1), dec!(2)),
            DualAmount::new(dec!(3), dec!(4)),
        ]
        .into_iter()
        .sum();
        assert_eq!(total, DualAmount::new(dec!(4), dec!(6)));
    }

    #[test]
    fn test_currency_parse_and_display() {
        assert_eq!(Currency::from_str("htg").unwrap(), Currency::Htg);
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Usd);
        assert!(Currency::from_str("EUR").is_err());
        assert_eq!(Currency::Htg.to_string(), "HTG");
        assert_eq!(
            serde_json::to_string(&Currency::Usd).unwrap(),
            "\"USD\""
        );
    }
}
