//! Invoice lifecycle.
//!
//! `unpaid ⇄ partial → paid`, `unpaid | partial → cancelled`. Status is never
//! set directly: it is derived from the payment ledger by [`derive_payment_state`].

pub mod payment;
pub mod service;
pub mod types;

#[cfg(test)]
mod payment_props;

pub use payment::{
    PaymentState, convert_payment, derive_payment_state, validate_payment_amount,
};
pub use service::InvoiceLifecycle;
pub use types::{InvoiceStatus, PaymentMethod};
