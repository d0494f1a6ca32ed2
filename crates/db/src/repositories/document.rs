//! Pieces shared by quote and invoice writers: tenant pricing, client and
//! product snapshots, line pricing.

use std::collections::HashMap;

use plus_core::BillingError;
use plus_core::document::{
    ClientSnapshot, DiscountType, LineInput, PricingParams, ProductSnapshot, Totals, compute_line,
    compute_totals, validate_line, validate_pricing, validate_totals,
};
use plus_shared::types::DualAmount;
use plus_shared::types::money::round_money;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use crate::entities::{clients, products, tenants};
use crate::error::{RepoError, RepoResult};

/// One requested document line.
///
/// Prices default to the product's catalogue prices. A free-text line needs a
/// description and an HTG price; its USD price defaults to the HTG price at
/// the document's exchange rate.
#[derive(Debug, Clone, Default)]
pub struct ItemInput {
    /// Catalogue product, if any.
    pub product_id: Option<Uuid>,
    /// Line text; defaults to the product name.
    pub description: Option<String>,
    /// Quantity, strictly positive.
    pub quantity: i32,
    /// Unit price in HTG.
    pub unit_price_htg: Option<Decimal>,
    /// Unit price in USD.
    pub unit_price_usd: Option<Decimal>,
    /// Line discount percentage.
    pub discount_pct: Option<Decimal>,
}

/// A line after product lookup and pricing.
#[derive(Debug, Clone)]
pub(crate) struct PricedItem {
    pub product_id: Option<Uuid>,
    pub product_snapshot: Option<serde_json::Value>,
    pub description: String,
    pub line: LineInput,
    pub total: DualAmount,
}

pub(crate) async fn load_tenant<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
) -> RepoResult<tenants::Model> {
    tenants::Entity::find_by_id(tenant_id)
        .one(conn)
        .await?
        .ok_or_else(|| RepoError::not_found("Tenant"))
}

/// Builds validated pricing parameters.
pub(crate) fn pricing(
    discount_type: DiscountType,
    discount_value: Decimal,
    tax_rate: Decimal,
    exchange_rate: Decimal,
) -> Result<PricingParams, BillingError> {
    let params = PricingParams {
        discount_type,
        discount_value,
        tax_rate,
        exchange_rate,
    };
    validate_pricing(&params)?;
    Ok(params)
}

/// Computes document totals and checks they fit storage.
pub(crate) fn document_totals(
    lines: &[LineInput],
    params: &PricingParams,
) -> Result<Totals, BillingError> {
    let totals = compute_totals(lines, params);
    validate_totals(&totals)?;
    Ok(totals)
}

/// Resolves the client snapshot for a document.
///
/// A `client_id` must name an active client of the tenant; otherwise the
/// inline snapshot is used, and with neither the walk-in placeholder.
pub(crate) async fn resolve_client<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    client_id: Option<Uuid>,
    inline: Option<ClientSnapshot>,
) -> RepoResult<(Option<Uuid>, ClientSnapshot)> {
    if let Some(id) = client_id {
        let client = clients::Entity::find_by_id(id)
            .filter(clients::Column::TenantId.eq(tenant_id))
            .filter(clients::Column::IsActive.eq(true))
            .one(conn)
            .await?
            .ok_or_else(|| RepoError::not_found("Client"))?;

        return Ok((
            Some(client.id),
            ClientSnapshot {
                id: Some(client.id),
                name: client.name,
                email: client.email,
                phone: client.phone,
                address: client.address,
                nif: client.nif,
            },
        ));
    }

    match inline {
        Some(snapshot) => {
            snapshot.validate()?;
            Ok((None, ClientSnapshot { id: None, ..snapshot }))
        }
        None => Ok((None, ClientSnapshot::walk_in())),
    }
}

/// Looks up products, snapshots them and prices every line.
pub(crate) async fn price_items<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    items: &[ItemInput],
    exchange_rate: Decimal,
) -> RepoResult<Vec<PricedItem>> {
    let ids: Vec<Uuid> = items.iter().filter_map(|i| i.product_id).collect();
    let catalogue: HashMap<Uuid, products::Model> = if ids.is_empty() {
        HashMap::new()
    } else {
        products::Entity::find()
            .filter(products::Column::TenantId.eq(tenant_id))
            .filter(products::Column::IsActive.eq(true))
            .filter(products::Column::Id.is_in(ids))
            .all(conn)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    items
        .iter()
        .map(|item| price_item(item, &catalogue, exchange_rate))
        .collect()
}

fn price_item(
    item: &ItemInput,
    catalogue: &HashMap<Uuid, products::Model>,
    exchange_rate: Decimal,
) -> RepoResult<PricedItem> {
    let discount_pct = item.discount_pct.unwrap_or(Decimal::ZERO);

    let (product_id, snapshot, description, htg, usd) = match item.product_id {
        Some(id) => {
            let product = catalogue
                .get(&id)
                .ok_or_else(|| RepoError::not_found("Product"))?;
            let snapshot = ProductSnapshot {
                id: product.id,
                code: product.code.clone(),
                name: product.name.clone(),
                unit: product.unit.clone(),
                price_htg: product.price_htg,
                price_usd: product.price_usd,
                is_service: product.is_service,
            };
            (
                Some(id),
                Some(snapshot.to_json()),
                item.description
                    .clone()
                    .unwrap_or_else(|| product.name.clone()),
                item.unit_price_htg.unwrap_or(product.price_htg),
                item.unit_price_usd.unwrap_or(product.price_usd),
            )
        }
        None => {
            let description = item
                .description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .ok_or_else(|| BillingError::validation("a line without product needs a description"))?;
            let htg = item
                .unit_price_htg
                .ok_or_else(|| BillingError::validation("a line without product needs a price"))?;
            let usd = item.unit_price_usd.unwrap_or_else(|| {
                htg.checked_div(exchange_rate)
                    .map_or(Decimal::MAX, round_money)
            });
            (None, None, description, htg, usd)
        }
    };

    let line = LineInput {
        quantity: item.quantity,
        unit_price_htg: htg,
        unit_price_usd: usd,
        discount_pct,
    };
    validate_line(&line)?;

    Ok(PricedItem {
        product_id,
        product_snapshot: snapshot,
        description,
        total: compute_line(&line),
        line,
    })
}

/// True when an item's snapshot marks a service.
pub(crate) fn is_service_snapshot(snapshot: Option<&serde_json::Value>) -> bool {
    snapshot
        .and_then(|s| s.get("is_service"))
        .and_then(serde_json::Value::as_bool)
        .unwrap_or(false)
}
