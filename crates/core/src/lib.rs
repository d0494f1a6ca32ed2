//! Core business logic for the PLUS GROUP billing backend.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `document` - Document numbering, snapshots and totals
//! - `quote` - Quote lifecycle
//! - `invoice` - Invoice lifecycle and payment derivation
//! - `stock` - Stock movement arithmetic
//! - `subscription` - Tenant status, billing periods and plan limits
//! - `receipt` - Thermal receipt layout and PDF rendering
//! - `auth` - Password hashing and roles

pub mod auth;
pub mod document;
pub mod error;
pub mod invoice;
pub mod quote;
pub mod receipt;
pub mod stock;
pub mod subscription;

pub use error::{BillingError, BillingResult};
