//! Stock ledger: the only writer of `products.quantity`.
//!
//! Each movement locks the product row, checks the new quantity and appends
//! one `stock_movements` row carrying the before/after pair, all on the
//! caller's connection.

use chrono::Utc;
use plus_core::BillingError;
use plus_core::stock::{MovementType, ReferenceType, StockChange, apply_change, signed_change};
use plus_shared::types::{PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use crate::entities::{products, stock_movements};
use crate::error::{RepoError, RepoResult};

/// A movement to append.
#[derive(Debug, Clone)]
pub struct NewMovement {
    /// Owning tenant.
    pub tenant_id: Uuid,
    /// Product whose quantity changes.
    pub product_id: Uuid,
    /// Kind of movement.
    pub movement_type: MovementType,
    /// Signed change.
    pub quantity_change: i32,
    /// Document that caused the movement.
    pub reference_id: Option<Uuid>,
    /// What `reference_id` points at.
    pub reference_type: Option<ReferenceType>,
    /// Free text.
    pub notes: Option<String>,
    /// Acting user.
    pub created_by: Option<Uuid>,
}

/// Manual stock adjustment request.
#[derive(Debug, Clone)]
pub struct AdjustStockInput {
    /// Quantity; signed only for `adjustment`.
    pub quantity: i32,
    /// Kind of movement.
    pub movement_type: MovementType,
    /// Free text.
    pub notes: Option<String>,
}

/// Stock ledger operations.
#[derive(Debug, Clone)]
pub struct StockLedger {
    db: DatabaseConnection,
}

impl StockLedger {
    /// Creates a new stock ledger.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a movement on `conn`, which should be an open transaction.
    ///
    /// The product row stays locked until that transaction ends.
    pub async fn apply_in<C>(conn: &C, movement: &NewMovement) -> RepoResult<StockChange>
    where
        C: ConnectionTrait,
    {
        let product = products::Entity::find_by_id(movement.product_id)
            .filter(products::Column::TenantId.eq(movement.tenant_id))
            .lock_exclusive()
            .one(conn)
            .await?
            .ok_or_else(|| RepoError::not_found("Product"))?;

        let change = apply_change(product.id, product.quantity, movement.quantity_change)?;
        let now = Utc::now().into();

        let mut active: products::ActiveModel = product.into();
        active.quantity = Set(change.after);
        active.updated_at = Set(now);
        active.update(conn).await?;

        stock_movements::ActiveModel {
            id: Set(Uuid::new_v4()),
            seq: NotSet,
            tenant_id: Set(movement.tenant_id),
            product_id: Set(movement.product_id),
            movement_type: Set(movement.movement_type.into()),
            quantity_before: Set(change.before),
            quantity_change: Set(change.change),
            quantity_after: Set(change.after),
            reference_id: Set(movement.reference_id),
            reference_type: Set(movement.reference_type.map(|r| r.as_str().to_string())),
            notes: Set(movement.notes.clone()),
            created_by: Set(movement.created_by),
            created_at: Set(now),
        }
        .insert(conn)
        .await?;

        info!(
            tenant_id = %movement.tenant_id,
            product_id = %movement.product_id,
            movement_type = %movement.movement_type,
            before = change.before,
            after = change.after,
            "stock movement recorded"
        );

        Ok(change)
    }

    /// Applies a movement in its own transaction.
    pub async fn apply_movement(&self, movement: &NewMovement) -> RepoResult<StockChange> {
        let txn = self.db.begin().await?;
        let change = Self::apply_in(&txn, movement).await?;
        txn.commit().await?;
        Ok(change)
    }

    /// Manual adjustment from the stock screen.
    ///
    /// Service products and deactivated products carry no stock.
    pub async fn adjust_stock(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        user_id: Uuid,
        input: AdjustStockInput,
    ) -> RepoResult<products::Model> {
        let change = signed_change(input.movement_type, input.quantity)?;

        let txn = self.db.begin().await?;

        let product = products::Entity::find_by_id(product_id)
            .filter(products::Column::TenantId.eq(tenant_id))
            .filter(products::Column::IsActive.eq(true))
            .one(&txn)
            .await?
            .ok_or_else(|| RepoError::not_found("Product"))?;
        if product.is_service {
            return Err(BillingError::validation("service products have no stock").into());
        }

        Self::apply_in(
            &txn,
            &NewMovement {
                tenant_id,
                product_id,
                movement_type: input.movement_type,
                quantity_change: change,
                reference_id: None,
                reference_type: Some(ReferenceType::Manual),
                notes: input.notes,
                created_by: Some(user_id),
            },
        )
        .await?;

        let product = products::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| RepoError::not_found("Product"))?;

        txn.commit().await?;

        Ok(product)
    }

    /// Movement history of one product, newest first.
    pub async fn movements(
        &self,
        tenant_id: Uuid,
        product_id: Uuid,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<stock_movements::Model>> {
        let query = stock_movements::Entity::find()
            .filter(stock_movements::Column::TenantId.eq(tenant_id))
            .filter(stock_movements::Column::ProductId.eq(product_id));

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(stock_movements::Column::Seq)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Latest movement of a product, if any.
    pub async fn latest_movement(
        &self,
        product_id: Uuid,
    ) -> RepoResult<Option<stock_movements::Model>> {
        Ok(stock_movements::Entity::find()
            .filter(stock_movements::Column::ProductId.eq(product_id))
            .order_by_desc(stock_movements::Column::Seq)
            .one(&self.db)
            .await?)
    }
}
