//! Common types used across the application.

pub mod money;
pub mod pagination;

pub use money::{Currency, DualAmount, MAX_AMOUNT, MAX_EXCHANGE_RATE, is_storable_amount};
pub use pagination::{PageMeta, PageRequest, PageResponse};
