//! Postgres-backed document counter.

use async_trait::async_trait;
use plus_core::BillingError;
use plus_core::document::{DocumentCounter, DocumentType, SequenceValue};
use sea_orm::{ConnectionTrait, DbBackend, Statement};
use uuid::Uuid;

use crate::error::RepoError;

/// Creates the row on first use, restarts at 1 when the year changes and
/// increments otherwise. The conflicting row stays locked until the caller's
/// transaction ends, which serializes concurrent allocations.
const NEXT_NUMBER_SQL: &str = r"
INSERT INTO document_sequences (tenant_id, document_type, prefix, last_number, current_year)
VALUES ($1, $2::document_type, $3, 1, $4)
ON CONFLICT (tenant_id, document_type) DO UPDATE
SET last_number = CASE
        WHEN document_sequences.current_year = EXCLUDED.current_year
            THEN document_sequences.last_number + 1
        ELSE 1
    END,
    current_year = EXCLUDED.current_year,
    updated_at = NOW()
RETURNING prefix, last_number, current_year
";

/// [`DocumentCounter`] running on any connection or open transaction.
///
/// When `conn` is a transaction, the allocation commits or rolls back with
/// the document that uses it.
#[derive(Debug)]
pub struct PgDocumentCounter<'a, C> {
    conn: &'a C,
}

impl<'a, C> PgDocumentCounter<'a, C>
where
    C: ConnectionTrait + Send + Sync,
{
    /// Wraps a connection or transaction.
    #[must_use]
    pub const fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> DocumentCounter for PgDocumentCounter<'_, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn increment_and_get(
        &self,
        tenant_id: Uuid,
        document_type: DocumentType,
        year: i32,
    ) -> Result<SequenceValue, BillingError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            NEXT_NUMBER_SQL,
            [
                tenant_id.into(),
                document_type.as_str().into(),
                document_type.default_prefix().into(),
                year.into(),
            ],
        );

        let row = self
            .conn
            .query_one(stmt)
            .await
            .map_err(RepoError::from)?
            .ok_or_else(|| BillingError::Internal("sequence upsert returned no row".into()))?;

        let prefix: String = row.try_get("", "prefix").map_err(RepoError::from)?;
        let number: i32 = row.try_get("", "last_number").map_err(RepoError::from)?;
        let year: i32 = row.try_get("", "current_year").map_err(RepoError::from)?;

        Ok(SequenceValue {
            prefix,
            year,
            number,
        })
    }
}
