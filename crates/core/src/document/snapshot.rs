//! Snapshots of clients and products taken when a document is written.
//!
//! Documents keep these copies as JSON so later edits or soft deletes of the
//! client or product never change an issued quote or invoice.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BillingError;

/// Client details as they were when the document was created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientSnapshot {
    /// Source client, absent for walk-in customers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number.
    #[serde(default)]
    pub phone: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Tax identification number.
    #[serde(default)]
    pub nif: Option<String>,
}

impl ClientSnapshot {
    /// Snapshot used when a document has no client at all.
    #[must_use]
    pub fn walk_in() -> Self {
        Self {
            name: "Client comptoir".to_string(),
            ..Self::default()
        }
    }

    /// Rejects inline snapshots without a name.
    pub fn validate(&self) -> Result<(), BillingError> {
        if self.name.trim().is_empty() {
            return Err(BillingError::validation("client name is required"));
        }
        Ok(())
    }

    /// Serializes into the JSON stored on the document row.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Reads a stored snapshot, tolerating missing optional fields.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, BillingError> {
        serde_json::from_value(value.clone())
            .map_err(|e| BillingError::Internal(format!("corrupt client snapshot: {e}")))
    }
}

/// Product details as they were when the line was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    /// Source product.
    pub id: Uuid,
    /// Tenant-scoped product code.
    pub code: String,
    /// Product name.
    pub name: String,
    /// Unit label (`pcs`, `kg`, ...).
    #[serde(default)]
    pub unit: Option<String>,
    /// Catalogue price in HTG at snapshot time.
    pub price_htg: Decimal,
    /// Catalogue price in USD at snapshot time.
    pub price_usd: Decimal,
    /// Services carry no stock.
    #[serde(default)]
    pub is_service: bool,
}

impl ProductSnapshot {
    /// Serializes into the JSON stored on the item row.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_client_snapshot_from_partial_json() {
        let json = serde_json::json!({ "name": "Boutique Lakay" });
        let snapshot = ClientSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot.name, "Boutique Lakay");
        assert_eq!(snapshot.id, None);
        assert_eq!(snapshot.email, None);
    }

    #[test]
    fn test_blank_inline_client_is_rejected() {
        let snapshot = ClientSnapshot {
            name: "  ".to_string(),
            ..ClientSnapshot::default()
        };
        assert!(matches!(snapshot.validate(), Err(BillingError::Validation(_))));
        assert!(ClientSnapshot::walk_in().validate().is_ok());
    }

    #[test]
    fn test_product_snapshot_json_keeps_prices_exact() {
        let snapshot = ProductSnapshot {
            id: Uuid::nil(),
            code: "RIZ-25".to_string(),
            name: "Riz 25 lb".to_string(),
            unit: Some("sac".to_string()),
            price_htg: dec!(1250.50),
            price_usd: dec!(9.47),
            is_service: false,
        };
        let json = snapshot.to_json();
        assert_eq!(json["price_htg"], "1250.50");
        let back: ProductSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }
}
