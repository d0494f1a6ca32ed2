//! `SeaORM` Entity for quote_items table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "quote_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quote_id: Uuid,
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
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quotes::Entity",
        from = "Column::QuoteId",
        to = "super::quotes::Column::Id",
        on_delete = "Cascade"
    )]
    Quotes,
}

impl Related<super::quotes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quotes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
