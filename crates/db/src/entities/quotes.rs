//! `SeaORM` Entity for quotes table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CurrencyCode, DiscountType, QuoteStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub quote_number: String,
    pub client_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub client_snapshot: Json,
    pub currency: CurrencyCode,
    pub discount_type: DiscountType,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub discount_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub tax_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub exchange_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub subtotal_htg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub subtotal_usd: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub discount_htg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub discount_usd: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub tax_htg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub tax_usd: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_htg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_usd: Decimal,
    pub status: QuoteStatus,
    pub notes: Option<String>,
    pub valid_until: Option<Date>,
    pub converted_at: Option<DateTimeWithTimeZone>,
    pub converted_invoice_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::quote_items::Entity")]
    QuoteItems,
}

impl Related<super::quote_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::QuoteItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
