//! `SeaORM` Entity for invoices table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{CurrencyCode, DiscountType, InvoiceStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub invoice_number: String,
    pub quote_id: Option<Uuid>,
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
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount_paid_htg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub amount_paid_usd: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub balance_due_htg: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub balance_due_usd: Decimal,
    pub status: InvoiceStatus,
    pub stock_decremented: bool,
    pub notes: Option<String>,
    pub due_date: Option<Date>,
    pub created_by: Option<Uuid>,
    pub cancelled_by: Option<Uuid>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub cancel_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::invoice_items::Entity")]
    InvoiceItems,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::invoice_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceItems.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
