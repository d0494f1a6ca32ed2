//! Domain error taxonomy shared by every billing component.

use thiserror::Error;
use uuid::Uuid;

use crate::auth::PasswordError;

/// Result alias for domain operations.
pub type BillingResult<T> = Result<T, BillingError>;

/// Errors raised by quote, invoice, stock, sequence and tenant operations.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Entity absent or not owned by the caller's tenant.
    #[error("{0} not found")]
    NotFound(String),

    /// Operation illegal for the entity's current lifecycle state.
    #[error("Cannot {action} {entity} with status {status}")]
    InvalidState {
        /// Entity kind (`quote`, `invoice`, `tenant`).
        entity: &'static str,
        /// Current status.
        status: String,
        /// Attempted operation.
        action: &'static str,
    },

    /// Conversion attempted on a document without items.
    #[error("Document has no items")]
    EmptyDocument,

    /// A debit would drive a product's quantity below zero.
    #[error("Insufficient stock for product {product_id}: available {available}, change {change}")]
    NegativeStock {
        /// Product being debited.
        product_id: Uuid,
        /// Quantity on hand before the movement.
        available: i32,
        /// Signed quantity change that was rejected.
        change: i32,
    },

    /// Unique constraint violation (code, slug, email, document number).
    #[error("Duplicate: {0}")]
    DuplicateKey(String),

    /// Input failed a business validation rule.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The tenant's plan does not allow another resource of this kind.
    #[error("Plan limit reached: at most {limit} {resource}")]
    PlanLimitReached {
        /// Limited resource (`users`, `products`).
        resource: &'static str,
        /// Plan maximum.
        limit: i32,
    },

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// Role or ownership check failed.
    #[error("Access denied: {0}")]
    Forbidden(String),

    /// Storage failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Unexpected failure.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillingError {
    /// Shorthand for [`BillingError::NotFound`].
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Shorthand for [`BillingError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Shorthand for [`BillingError::InvalidState`].
    pub fn invalid_state(
        entity: &'static str,
        status: impl std::fmt::Display,
        action: &'static str,
    ) -> Self {
        Self::InvalidState {
            entity,
            status: status.to_string(),
            action,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) | Self::PlanLimitReached { .. } => 403,
            Self::NotFound(_) => 404,
            Self::InvalidState { .. } | Self::DuplicateKey(_) => 409,
            Self::EmptyDocument | Self::NegativeStock { .. } => 422,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::InvalidState { .. } => "INVALID_STATE",
            Self::EmptyDocument => "EMPTY_DOCUMENT",
            Self::NegativeStock { .. } => "NEGATIVE_STOCK",
            Self::DuplicateKey(_) => "DUPLICATE_KEY",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::PlanLimitReached { .. } => "PLAN_LIMIT_REACHED",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<PasswordError> for BillingError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(BillingError::not_found("Quote"), 404, "NOT_FOUND")]
    #[case(BillingError::invalid_state("quote", "converted", "update"), 409, "INVALID_STATE")]
    #[case(BillingError::EmptyDocument, 422, "EMPTY_DOCUMENT")]
    #[case(
        BillingError::NegativeStock { product_id: Uuid::nil(), available: 2, change: -3 },
        422,
        "NEGATIVE_STOCK"
    )]
    #[case(BillingError::DuplicateKey("code".into()), 409, "DUPLICATE_KEY")]
    #[case(BillingError::validation("bad"), 400, "VALIDATION_ERROR")]
    #[case(
        BillingError::PlanLimitReached { resource: "users", limit: 3 },
        403,
        "PLAN_LIMIT_REACHED"
    )]
    #[case(BillingError::Unauthorized(String::new()), 401, "UNAUTHORIZED")]
    #[case(BillingError::Forbidden(String::new()), 403, "FORBIDDEN")]
    #[case(BillingError::Database(String::new()), 500, "DATABASE_ERROR")]
    #[case(BillingError::Internal(String::new()), 500, "INTERNAL_ERROR")]
    fn test_status_and_code(#[case] err: BillingError, #[case] status: u16, #[case] code: &str) {
        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_messages() {
        assert_eq!(BillingError::not_found("Invoice").to_string(), "Invoice not found");
        assert_eq!(
            BillingError::invalid_state("invoice", "cancelled", "cancel").to_string(),
            "Cannot cancel invoice with status cancelled"
        );
        assert_eq!(
            BillingError::PlanLimitReached { resource: "products", limit: 50 }.to_string(),
            "Plan limit reached: at most 50 products"
        );
    }
}
