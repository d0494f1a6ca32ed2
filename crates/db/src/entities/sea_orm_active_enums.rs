//! Postgres enum types, mirrored from the domain enums in `plus-core`.

use plus_core::auth::UserRole as DomainUserRole;
use plus_core::document::{DiscountType as DomainDiscountType, DocumentType as DomainDocumentType};
use plus_core::invoice::{InvoiceStatus as DomainInvoiceStatus, PaymentMethod as DomainPaymentMethod};
use plus_core::quote::QuoteStatus as DomainQuoteStatus;
use plus_core::stock::MovementType as DomainMovementType;
use plus_core::subscription::TenantStatus as DomainTenantStatus;
use plus_shared::types::Currency;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maps a database enum onto its domain twin, both ways.
macro_rules! mirror_enum {
    ($db:ident <=> $domain:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$domain> for $db {
            fn from(value: $domain) -> Self {
                match value {
                    $($domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "tenant_status")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "suspended")]
    Suspended,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

mirror_enum!(TenantStatus <=> DomainTenantStatus { Pending, Active, Suspended, Cancelled });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "currency_code")]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    #[sea_orm(string_value = "HTG")]
    Htg,
    #[sea_orm(string_value = "USD")]
    Usd,
}

mirror_enum!(CurrencyCode <=> Currency { Htg, Usd });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "super_admin")]
    SuperAdmin,
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "user")]
    User,
}

mirror_enum!(UserRole <=> DomainUserRole { SuperAdmin, Admin, User });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "discount_type")]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    #[sea_orm(string_value = "percent")]
    Percent,
    #[sea_orm(string_value = "amount")]
    Amount,
}

mirror_enum!(DiscountType <=> DomainDiscountType { Percent, Amount });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "quote_status")]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

mirror_enum!(QuoteStatus <=> DomainQuoteStatus { Draft, Sent, Converted, Cancelled });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    #[sea_orm(string_value = "partial")]
    Partial,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

mirror_enum!(InvoiceStatus <=> DomainInvoiceStatus { Unpaid, Partial, Paid, Cancelled });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "cheque")]
    Cheque,
    #[sea_orm(string_value = "mobile_money")]
    MobileMoney,
}

mirror_enum!(PaymentMethod <=> DomainPaymentMethod { Cash, Card, BankTransfer, Cheque, MobileMoney });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_type")]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    #[sea_orm(string_value = "purchase")]
    Purchase,
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    #[sea_orm(string_value = "return_item")]
    ReturnItem,
}

mirror_enum!(MovementType <=> DomainMovementType { Purchase, Sale, Adjustment, ReturnItem });

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "document_type")]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[sea_orm(string_value = "quote")]
    Quote,
    #[sea_orm(string_value = "invoice")]
    Invoice,
}

mirror_enum!(DocumentType <=> DomainDocumentType { Quote, Invoice });
