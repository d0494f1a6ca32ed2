//! `SeaORM` Entity for invoice_items table.
//!
//! `stock_before`/`stock_after` are captured when the line is debited.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub product_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub product_snapshot: Option<Json>,
    pub description: String,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub unit_price_htg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub unit_price_usd: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub discount_pct: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_htg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_usd: Decimal,
    pub sort_order: i32,
    pub stock_before: Option<i32>,
    pub stock_after: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::invoices::Entity",
        from = "Column::InvoiceId",
        to = "super::invoices::Column::Id",
        on_delete = "Cascade"
    )]
    Invoices,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
