//! Quote lifecycle.
//!
//! `draft → sent → converted`, `draft | sent → cancelled`. Converted and
//! cancelled quotes are immutable.

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::QuoteLifecycle;
pub use types::QuoteStatus;
