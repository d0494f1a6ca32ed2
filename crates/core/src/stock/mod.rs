//! Stock ledger arithmetic.
//!
//! Every change to a product's on-hand quantity is a movement with a
//! before/after pair. The database layer performs the locked
//! read-modify-append; this module decides what the change is and whether it
//! is allowed.

pub mod ledger;
pub mod types;

#[cfg(test)]
mod ledger_props;

pub use ledger::{StockChange, apply_change, signed_change};
pub use types::{MovementType, ReferenceType};
