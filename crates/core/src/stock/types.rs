//! Stock domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a product's quantity changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Goods received.
    Purchase,
    /// Goods sold on an invoice.
    Sale,
    /// Manual correction (signed).
    Adjustment,
    /// Goods returned, including invoice cancellation.
    ReturnItem,
}

impl MovementType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Sale => "sale",
            Self::Adjustment => "adjustment",
            Self::ReturnItem => "return_item",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a movement points back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// The movement was caused by an invoice (sale or cancellation).
    Invoice,
    /// Manual adjustment from the products screen.
    Manual,
    /// Opening stock recorded when the product was created.
    InitialStock,
}

impl ReferenceType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::Manual => "manual",
            Self::InitialStock => "initial_stock",
        }
    }
}
