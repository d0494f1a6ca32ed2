//! Per-tenant document numbering.
//!
//! Numbers look like `DEV-2026-0042` (quotes) or `FAC-2026-0007` (invoices).
//! Each `(tenant, document type)` pair owns one counter that restarts at 1
//! when the business year changes. Storage backends implement
//! [`DocumentCounter`]; the arithmetic lives in [`advance`] so every backend
//! agrees on it.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BillingError;

/// Kinds of numbered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Quote (devis).
    Quote,
    /// Invoice (facture).
    Invoice,
}

impl DocumentType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Invoice => "invoice",
        }
    }

    /// Prefix given to a counter created on first use.
    #[must_use]
    pub const fn default_prefix(&self) -> &'static str {
        match self {
            Self::Quote => "DEV",
            Self::Invoice => "FAC",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One allocated number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceValue {
    /// Counter prefix.
    pub prefix: String,
    /// Year the number belongs to.
    pub year: i32,
    /// Position within the year, starting at 1.
    pub number: i32,
}

impl SequenceValue {
    /// Human-facing document number.
    #[must_use]
    pub fn formatted(&self) -> String {
        format_number(&self.prefix, self.year, self.number)
    }
}

/// Formats `{prefix}-{year}-{number:04}`. Numbers past 9999 simply widen.
#[must_use]
pub fn format_number(prefix: &str, year: i32, number: i32) -> String {
    format!("{prefix}-{year}-{number:04}")
}

/// Next counter value given the stored state (`None` when no row exists yet).
#[must_use]
pub const fn advance(stored: Option<(i32, i32)>, year: i32) -> i32 {
    match stored {
        Some((last_number, stored_year)) if stored_year == year => last_number + 1,
        _ => 1,
    }
}

/// Atomic "increment and read" over a per-tenant counter.
///
/// Implementations must serialize concurrent callers so that N calls for the
/// same key yield N distinct, contiguous numbers.
#[async_trait]
pub trait DocumentCounter: Send + Sync {
    /// Advances the counter for `(tenant_id, document_type)` in `year` and
    /// returns the new value.
    async fn increment_and_get(
        &self,
        tenant_id: Uuid,
        document_type: DocumentType,
        year: i32,
    ) -> Result<SequenceValue, BillingError>;

    /// Allocates and formats the next document number.
    async fn next_number(
        &self,
        tenant_id: Uuid,
        document_type: DocumentType,
        year: i32,
    ) -> Result<String, BillingError> {
        self.increment_and_get(tenant_id, document_type, year)
            .await
            .map(|value| value.formatted())
    }
}

/// Process-local counter, used by tests and tooling that has no database.
#[derive(Debug, Default)]
pub struct InMemoryCounter {
    state: Mutex<HashMap<(Uuid, DocumentType), (i32, i32)>>,
}

impl InMemoryCounter {
    /// Creates an empty counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a counter as if `last_number` had been allocated in `year`.
    pub fn seed(
        &self,
        tenant_id: Uuid,
        document_type: DocumentType,
        last_number: i32,
        year: i32,
    ) -> Result<(), BillingError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| BillingError::Internal("counter lock poisoned".to_string()))?;
        state.insert((tenant_id, document_type), (last_number, year));
        Ok(())
    }
}

#[async_trait]
impl DocumentCounter for InMemoryCounter {
    async fn increment_and_get(
        &self,
        tenant_id: Uuid,
        document_type: DocumentType,
        year: i32,
    ) -> Result<SequenceValue, BillingError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| BillingError::Internal("counter lock poisoned".to_string()))?;
        let key = (tenant_id, document_type);
        let number = advance(state.get(&key).copied(), year);
        state.insert(key, (number, year));

        Ok(SequenceValue {
            prefix: document_type.default_prefix().to_string(),
            year,
            number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("DEV", 2026, 1, "DEV-2026-0001")]
    #[case("FAC", 2026, 42, "FAC-2026-0042")]
    #[case("FAC", 2027, 12345, "FAC-2027-12345")]
    fn test_format_number(
        #[case] prefix: &str,
        #[case] year: i32,
        #[case] number: i32,
        #[case] expected: &str,
    ) {
        assert_eq!(format_number(prefix, year, number), expected);
    }

    #[rstest]
    #[case(None, 2026, 1)]
    #[case(Some((7, 2026)), 2026, 8)]
    #[case(Some((311, 2025)), 2026, 1)]
    fn test_advance(#[case] stored: Option<(i32, i32)>, #[case] year: i32, #[case] next: i32) {
        assert_eq!(advance(stored, year), next);
    }

    #[tokio::test]
    async fn test_year_rollover_restarts_at_one() {
        let counter = InMemoryCounter::new();
        let tenant = Uuid::new_v4();
        counter.seed(tenant, DocumentType::Invoice, 311, 2025).unwrap();

        let number = counter
            .next_number(tenant, DocumentType::Invoice, 2026)
            .await
            .unwrap();
        assert_eq!(number, "FAC-2026-0001");
    }

    #[tokio::test]
    async fn test_counters_are_independent_per_tenant_and_type() {
        let counter = InMemoryCounter::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(
            counter.next_number(a, DocumentType::Quote, 2026).await.unwrap(),
            "DEV-2026-0001"
        );
        assert_eq!(
            counter.next_number(a, DocumentType::Quote, 2026).await.unwrap(),
            "DEV-2026-0002"
        );
        assert_eq!(
            counter.next_number(a, DocumentType::Invoice, 2026).await.unwrap(),
            "FAC-2026-0001"
        );
        assert_eq!(
            counter.next_number(b, DocumentType::Quote, 2026).await.unwrap(),
            "DEV-2026-0001"
        );
    }
}
