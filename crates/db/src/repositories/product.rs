//! Product catalogue repository.
//!
//! Quantities are never written here except through [`StockLedger`]: a new
//! product starts at zero and its opening stock is a `purchase` movement.

use chrono::Utc;
use plus_core::BillingError;
use plus_core::stock::{MovementType, ReferenceType};
use plus_core::subscription::{PlanResource, check_plan_limit};
use plus_shared::types::{PageRequest, PageResponse, is_storable_amount};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use super::stock::{NewMovement, StockLedger};
use super::tenant::lock_plan_of;
use crate::entities::products;
use crate::error::{RepoError, RepoResult};

/// Input for creating a product.
#[derive(Debug, Clone, Default)]
pub struct CreateProductInput {
    /// Code, unique per tenant.
    pub code: String,
    /// Name.
    pub name: String,
    /// Longer text.
    pub description: Option<String>,
    /// Unit label.
    pub unit: Option<String>,
    /// Opening stock.
    pub quantity: i32,
    /// Low-stock threshold; defaults to the configured one.
    pub min_stock: Option<i32>,
    /// Price in HTG.
    pub price_htg: Decimal,
    /// Price in USD.
    pub price_usd: Decimal,
    /// Purchase cost in HTG.
    pub cost_price_htg: Decimal,
    /// Services carry no stock.
    pub is_service: bool,
}

/// Partial product update. Quantity is not part of it.
#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    /// New code.
    pub code: Option<String>,
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New unit.
    pub unit: Option<String>,
    /// New threshold.
    pub min_stock: Option<i32>,
    /// New HTG price.
    pub price_htg: Option<Decimal>,
    /// New USD price.
    pub price_usd: Option<Decimal>,
    /// New cost.
    pub cost_price_htg: Option<Decimal>,
}

/// Filters for listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Matches code or name.
    pub search: Option<String>,
    /// Only stocked products at or under their threshold.
    pub low_stock: bool,
}

fn validate_prices(values: &[Option<Decimal>]) -> Result<(), BillingError> {
    if values.iter().flatten().any(Decimal::is_sign_negative) {
        return Err(BillingError::validation("prices cannot be negative"));
    }
    if !values.iter().flatten().all(|p| is_storable_amount(*p)) {
        return Err(BillingError::validation(
            "prices must be below 1000000000000 with at most 2 decimals",
        ));
    }
    Ok(())
}

/// Product repository.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
    default_min_stock: i32,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, default_min_stock: i32) -> Self {
        Self {
            db,
            default_min_stock,
        }
    }

    /// Creates a product, recording any opening stock as a purchase.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: CreateProductInput,
    ) -> RepoResult<products::Model> {
        if input.code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(BillingError::validation("product code and name are required").into());
        }
        if input.quantity < 0 || input.min_stock.is_some_and(|m| m < 0) {
            return Err(BillingError::validation("stock quantities cannot be negative").into());
        }
        validate_prices(&[
            Some(input.price_htg),
            Some(input.price_usd),
            Some(input.cost_price_htg),
        ])?;

        let txn = self.db.begin().await?;

        let plan = lock_plan_of(&txn, tenant_id).await?;
        let active_products = products::Entity::find()
            .filter(products::Column::TenantId.eq(tenant_id))
            .filter(products::Column::IsActive.eq(true))
            .count(&txn)
            .await?;
        check_plan_limit(
            PlanResource::Products,
            active_products,
            plan.map(|p| p.max_products),
        )?;

        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            code: Set(input.code.trim().to_string()),
            name: Set(input.name.trim().to_string()),
            description: Set(input.description),
            unit: Set(input.unit),
            quantity: Set(0),
            min_stock: Set(input.min_stock.unwrap_or(self.default_min_stock)),
            price_htg: Set(input.price_htg),
            price_usd: Set(input.price_usd),
            cost_price_htg: Set(input.cost_price_htg),
            is_service: Set(input.is_service),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let product = if input.quantity > 0 && !input.is_service {
            StockLedger::apply_in(
                &txn,
                &NewMovement {
                    tenant_id,
                    product_id: product.id,
                    movement_type: MovementType::Purchase,
                    quantity_change: input.quantity,
                    reference_id: None,
                    reference_type: Some(ReferenceType::InitialStock),
                    notes: Some("Stock initial".into()),
                    created_by: Some(user_id),
                },
            )
            .await?;
            products::Entity::find_by_id(product.id)
                .one(&txn)
                .await?
                .ok_or_else(|| RepoError::not_found("Product"))?
        } else {
            product
        };

        txn.commit().await?;

        info!(%tenant_id, product_id = %product.id, code = %product.code, "product created");

        Ok(product)
    }

    /// Lists active products by name.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<products::Model>> {
        let mut query = products::Entity::find()
            .filter(products::Column::TenantId.eq(tenant_id))
            .filter(products::Column::IsActive.eq(true));

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(products::Column::Code.contains(search))
                    .add(products::Column::Name.contains(search)),
            );
        }
        if filter.low_stock {
            query = query
                .filter(products::Column::IsService.eq(false))
                .filter(Expr::col(products::Column::Quantity).lte(Expr::col(products::Column::MinStock)));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_asc(products::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Gets an active product.
    pub async fn get(&self, tenant_id: Uuid, product_id: Uuid) -> RepoResult<products::Model> {
        products::Entity::find_by_id(product_id)
            .filter(products::Column::TenantId.eq(tenant_id))
            .filter(products::Column::IsActive.eq(true))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepoError::not_found("Product"))
    }

    /// Updates catalogue fields.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> RepoResult<products::Model> {
        validate_prices(&[input.price_htg, input.price_usd, input.cost_price_htg])?;
        if input.min_stock.is_some_and(|m| m < 0) {
            return Err(BillingError::validation("minimum stock cannot be negative").into());
        }

        let product = self.get(tenant_id, product_id).await?;
        let mut active: products::ActiveModel = product.into();

        if let Some(code) = input.code {
            active.code = Set(code.trim().to_string());
        }
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if input.description.is_some() {
            active.description = Set(input.description);
        }
        if input.unit.is_some() {
            active.unit = Set(input.unit);
        }
        if let Some(min_stock) = input.min_stock {
            active.min_stock = Set(min_stock);
        }
        if let Some(price) = input.price_htg {
            active.price_htg = Set(price);
        }
        if let Some(price) = input.price_usd {
            active.price_usd = Set(price);
        }
        if let Some(cost) = input.cost_price_htg {
            active.cost_price_htg = Set(cost);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Soft-deletes a product. Issued documents keep their snapshots.
    pub async fn deactivate(&self, tenant_id: Uuid, product_id: Uuid) -> RepoResult<()> {
        let product = self.get(tenant_id, product_id).await?;
        let mut active: products::ActiveModel = product.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());
        active.update(&self.db).await?;

        info!(%tenant_id, %product_id, "product deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_validate_prices_accepts_missing_and_zero() {
        assert!(validate_prices(&[None, Some(dec!(0)), Some(dec!(12.50))]).is_ok());
    }

    #[test]
    fn test_validate_prices_rejects_negative() {
        assert!(validate_prices(&[Some(dec!(-0.01))]).is_err());
    }

    #[test]
    fn test_validate_prices_rejects_unstorable() {
        assert!(validate_prices(&[Some(dec!(12.505))]).is_err());
        assert!(validate_prices(&[None, Some(dec!(1000000000000))]).is_err());
        assert!(validate_prices(&[Some(dec!(999999999999.99))]).is_ok());
    }
}
