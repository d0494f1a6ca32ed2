//! Repository error type.
//!
//! Repositories mix domain failures (a lifecycle rule, a missing row) with
//! storage failures; both convert with `?`. At the boundary the error folds
//! into [`BillingError`], turning unique violations into `DuplicateKey`.

use plus_core::BillingError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors returned by repositories.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A business rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] BillingError),

    /// The database rejected the operation.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl RepoError {
    /// Shorthand for a domain `NotFound`.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::Domain(BillingError::not_found(what))
    }
}

impl From<RepoError> for BillingError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Domain(e) => e,
            RepoError::Database(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(msg)) => Self::DuplicateKey(msg),
                Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::Validation(msg),
                _ => Self::Database(e.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_pass_through() {
        let err: BillingError = RepoError::Domain(BillingError::EmptyDocument).into();
        assert!(matches!(err, BillingError::EmptyDocument));
    }

    #[test]
    fn test_plain_db_errors_become_database() {
        let err: BillingError = RepoError::Database(DbErr::Custom("boom".into())).into();
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }

    #[test]
    fn test_record_not_found_is_database_error() {
        let err: BillingError =
            RepoError::Database(DbErr::RecordNotFound("quote".into())).into();
        assert_eq!(err.status_code(), 500);
    }
}
