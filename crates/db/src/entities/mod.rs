//! `SeaORM` entity definitions.

pub mod prelude;

pub mod clients;
pub mod document_sequences;
pub mod invoice_items;
pub mod invoices;
pub mod payments;
pub mod products;
pub mod quote_items;
pub mod quotes;
pub mod sea_orm_active_enums;
pub mod stock_movements;
pub mod subscription_plans;
pub mod tenants;
pub mod users;
