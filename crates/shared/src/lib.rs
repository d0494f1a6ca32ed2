//! Shared types, errors, and configuration for the PLUS GROUP backend.
//!
//! This crate provides common types used across all other crates:
//! - Currency and dual HTG/USD amounts with decimal precision
//! - Pagination types for list endpoints
//! - The boundary error type
//! - Configuration management
//! - JWT claims and token service
//! - The business-timezone clock

pub mod auth;
pub mod clock;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{Claims, TokenKind, TokenPair};
pub use clock::BusinessClock;
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtError, JwtService};
