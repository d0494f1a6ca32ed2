//! Building blocks shared by quotes and invoices.
//!
//! # Modules
//!
//! - `snapshot` - Immutable client/product copies embedded in documents
//! - `sequence` - Per-tenant, year-scoped document numbering
//! - `totals` - Line, discount, tax and dual-currency rollups

pub mod sequence;
pub mod snapshot;
pub mod totals;

#[cfg(test)]
mod sequence_props;
#[cfg(test)]
mod totals_props;

pub use sequence::{DocumentCounter, DocumentType, InMemoryCounter, SequenceValue, format_number};
pub use snapshot::{ClientSnapshot, ProductSnapshot};
pub use totals::{
    DiscountType, LineInput, PricingParams, Totals, compute_line, compute_totals,
    validate_exchange_rate, validate_line, validate_pricing, validate_totals,
};
