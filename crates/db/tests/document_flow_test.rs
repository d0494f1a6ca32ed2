//! Quote → invoice → payment → cancellation against a real database.

#![allow(clippy::similar_names)]

mod common;

use plus_core::BillingError;
use plus_core::document::DiscountType;
use plus_core::invoice::{InvoiceStatus, PaymentMethod};
use plus_db::entities::{
    invoices, products, quotes,
    sea_orm_active_enums::{InvoiceStatus as DbInvoiceStatus, MovementType, QuoteStatus},
    stock_movements,
};
use plus_db::repositories::{
    CreateInvoiceInput, CreateProductInput, CreateQuoteInput, InvoiceRepository, ItemInput,
    PaymentInput, ProductRepository, QuoteRepository, UpdateQuoteInput,
};
use plus_shared::types::Currency;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

fn free_text(description: &str, quantity: i32, unit_price_htg: rust_decimal::Decimal) -> ItemInput {
    ItemInput {
        description: Some(description.into()),
        quantity,
        unit_price_htg: Some(unit_price_htg),
        ..ItemInput::default()
    }
}

fn line(product_id: Uuid, quantity: i32) -> ItemInput {
    ItemInput {
        product_id: Some(product_id),
        quantity,
        ..ItemInput::default()
    }
}

async fn quantity_of(db: &sea_orm::DatabaseConnection, product_id: Uuid) -> i32 {
    products::Entity::find_by_id(product_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .quantity
}

async fn movements_of(
    db: &sea_orm::DatabaseConnection,
    product_id: Uuid,
) -> Vec<stock_movements::Model> {
    stock_movements::Entity::find()
        .filter(stock_movements::Column::ProductId.eq(product_id))
        .order_by_asc(stock_movements::Column::Seq)
        .all(db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_quote_to_paid_invoice_scenario() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let product = common::product(&db, tenant.id, admin.id, 10, dec!(100)).await;
    let quotes_repo = QuoteRepository::new(db.clone(), common::clock());
    let invoices_repo = InvoiceRepository::new(db.clone(), common::clock());

    let quote = quotes_repo
        .create(
            tenant.id,
            admin.id,
            CreateQuoteInput {
                items: vec![line(product.id, 3)],
                ..CreateQuoteInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(quote.quote.quote_number, "DEV-2026-0001");
    assert_eq!(quote.quote.subtotal_htg, dec!(300.00));
    assert_eq!(quote.quote.tax_htg, dec!(30.00));
    assert_eq!(quote.quote.total_htg, dec!(330.00));
    assert_eq!(quote.quote.status, QuoteStatus::Draft);

    quotes_repo.send(tenant.id, quote.quote.id).await.unwrap();
    let invoice = quotes_repo
        .convert(tenant.id, quote.quote.id, admin.id)
        .await
        .unwrap();

    assert_eq!(invoice.invoice.invoice_number, "FAC-2026-0001");
    assert_eq!(invoice.invoice.total_htg, dec!(330.00));
    assert_eq!(invoice.invoice.subtotal_htg, quote.quote.subtotal_htg);
    assert_eq!(invoice.invoice.tax_usd, quote.quote.tax_usd);
    assert_eq!(invoice.invoice.balance_due_htg, dec!(330.00));
    assert_eq!(invoice.invoice.status, DbInvoiceStatus::Unpaid);
    assert!(invoice.invoice.stock_decremented);
    assert_eq!(invoice.items[0].stock_before, Some(10));
    assert_eq!(invoice.items[0].stock_after, Some(7));

    assert_eq!(quantity_of(&db, product.id).await, 7);
    let movements = movements_of(&db, product.id).await;
    let sale = movements.last().unwrap();
    assert_eq!(sale.movement_type, MovementType::Sale);
    assert_eq!(sale.quantity_change, -3);
    assert_eq!(sale.reference_id, Some(invoice.invoice.id));

    let converted = quotes::Entity::find_by_id(quote.quote.id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(converted.status, QuoteStatus::Converted);
    assert_eq!(converted.converted_invoice_id, Some(invoice.invoice.id));

    let outcome = invoices_repo
        .add_payment(
            tenant.id,
            invoice.invoice.id,
            admin.id,
            PaymentInput {
                amount: dec!(330.00),
                currency: Some(Currency::Htg),
                method: PaymentMethod::Cash,
                reference: None,
                payment_date: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.new_status, InvoiceStatus::Paid);
    assert_eq!(outcome.balance_due.htg, dec!(0.00));

    let err: BillingError = invoices_repo
        .cancel(tenant.id, invoice.invoice.id, admin.id, None)
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, BillingError::InvalidState { .. }));
}

#[tokio::test]
async fn test_cancel_restores_stock_once() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let product = common::product(&db, tenant.id, admin.id, 10, dec!(100)).await;
    let repo = InvoiceRepository::new(db.clone(), common::clock());

    let invoice = repo
        .create_direct(
            tenant.id,
            admin.id,
            CreateInvoiceInput {
                items: vec![line(product.id, 3)],
                ..CreateInvoiceInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(quantity_of(&db, product.id).await, 7);

    let cancelled = repo
        .cancel(tenant.id, invoice.invoice.id, admin.id, Some("erreur".into()))
        .await
        .unwrap();
    assert_eq!(cancelled.status, DbInvoiceStatus::Cancelled);
    assert_eq!(cancelled.cancelled_by, Some(admin.id));
    assert!(!cancelled.stock_decremented);
    assert_eq!(quantity_of(&db, product.id).await, 10);

    let restore = movements_of(&db, product.id).await.pop().unwrap();
    assert_eq!(restore.movement_type, MovementType::ReturnItem);
    assert_eq!(restore.quantity_change, 3);

    let err: BillingError = repo
        .cancel(tenant.id, invoice.invoice.id, admin.id, None)
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, BillingError::InvalidState { .. }));
    assert_eq!(quantity_of(&db, product.id).await, 10);
    assert_eq!(movements_of(&db, product.id).await.len(), 3);
}

#[tokio::test]
async fn test_conversion_rejections() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let product = common::product(&db, tenant.id, admin.id, 2, dec!(50)).await;
    let repo = QuoteRepository::new(db.clone(), common::clock());

    let empty = repo
        .create(tenant.id, admin.id, CreateQuoteInput::default())
        .await
        .unwrap();
    let err: BillingError = repo
        .convert(tenant.id, empty.quote.id, admin.id)
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, BillingError::EmptyDocument));

    let too_many = repo
        .create(
            tenant.id,
            admin.id,
            CreateQuoteInput {
                items: vec![line(product.id, 5)],
                ..CreateQuoteInput::default()
            },
        )
        .await
        .unwrap();
    let err: BillingError = repo
        .convert(tenant.id, too_many.quote.id, admin.id)
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, BillingError::NegativeStock { .. }));

    let after = repo.get(tenant.id, too_many.quote.id).await.unwrap();
    assert_eq!(after.quote.status, QuoteStatus::Draft);
    assert_eq!(quantity_of(&db, product.id).await, 2);
    let invoices = invoices::Entity::find()
        .filter(invoices::Column::TenantId.eq(tenant.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(invoices, 0);

    repo.cancel(tenant.id, too_many.quote.id).await.unwrap();
    let err: BillingError = repo
        .cancel(tenant.id, too_many.quote.id)
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, BillingError::InvalidState { .. }));
}

#[tokio::test]
async fn test_partial_payment_in_usd() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let repo = InvoiceRepository::new(db.clone(), common::clock());

    let invoice = repo
        .create_direct(
            tenant.id,
            admin.id,
            CreateInvoiceInput {
                items: vec![free_text("Installation", 1, dec!(1320))],
                ..CreateInvoiceInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(invoice.invoice.total_htg, dec!(1452.00));

    let outcome = repo
        .add_payment(
            tenant.id,
            invoice.invoice.id,
            admin.id,
            PaymentInput {
                amount: dec!(5),
                currency: Some(Currency::Usd),
                method: PaymentMethod::MobileMoney,
                reference: Some("MC-001".into()),
                payment_date: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.payment.amount_htg, dec!(660.00));
    assert_eq!(outcome.new_status, InvoiceStatus::Partial);
    assert_eq!(outcome.balance_due.htg, dec!(792.00));

    let stored = repo.get(tenant.id, invoice.invoice.id).await.unwrap();
    let payments = repo.payments(tenant.id, invoice.invoice.id).await.unwrap();
    let paid: rust_decimal::Decimal = payments.iter().map(|p| p.amount_htg).sum();
    assert_eq!(stored.invoice.amount_paid_htg, paid);
}

#[tokio::test]
async fn test_notes_only_update_keeps_totals() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let repo = QuoteRepository::new(db.clone(), common::clock());

    let err: BillingError = repo
        .create(
            tenant.id,
            admin.id,
            CreateQuoteInput {
                items: vec![free_text("Consultation", 3, dec!(33.335))],
                ..CreateQuoteInput::default()
            },
        )
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");

    let created = repo
        .create(
            tenant.id,
            admin.id,
            CreateQuoteInput {
                discount_type: DiscountType::Percent,
                discount_value: dec!(12.34),
                items: vec![free_text("Consultation", 3, dec!(33.34))],
                ..CreateQuoteInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(created.quote.subtotal_htg, dec!(100.02));

    let updated = repo
        .update(
            tenant.id,
            created.quote.id,
            UpdateQuoteInput {
                notes: Some("Valable 15 jours".into()),
                ..UpdateQuoteInput::default()
            },
        )
        .await
        .unwrap();

    let (before, after) = (&created.quote, &updated.quote);
    assert_eq!(after.notes.as_deref(), Some("Valable 15 jours"));
    assert_eq!(after.subtotal_htg, before.subtotal_htg);
    assert_eq!(after.discount_htg, before.discount_htg);
    assert_eq!(after.tax_htg, before.tax_htg);
    assert_eq!(after.total_htg, before.total_htg);
    assert_eq!(after.subtotal_usd, before.subtotal_usd);
    assert_eq!(after.total_usd, before.total_usd);
}

#[tokio::test]
async fn test_parallel_payments_all_count() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let product = common::product(&db, tenant.id, admin.id, 5, dec!(1000)).await;
    let repo = InvoiceRepository::new(db.clone(), common::clock());

    let invoice = repo
        .create_direct(
            tenant.id,
            admin.id,
            CreateInvoiceInput {
                items: vec![line(product.id, 1)],
                ..CreateInvoiceInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(invoice.invoice.total_htg, dec!(1100.00));

    let results = futures::future::join_all((0..10).map(|_| {
        repo.add_payment(
            tenant.id,
            invoice.invoice.id,
            admin.id,
            PaymentInput {
                amount: dec!(10),
                currency: Some(Currency::Htg),
                method: PaymentMethod::Cash,
                reference: None,
                payment_date: None,
                notes: None,
            },
        )
    }))
    .await;
    assert!(results.iter().all(Result::is_ok));

    let stored = repo.get(tenant.id, invoice.invoice.id).await.unwrap();
    let payments = repo.payments(tenant.id, invoice.invoice.id).await.unwrap();
    let paid: rust_decimal::Decimal = payments.iter().map(|p| p.amount_htg).sum();
    assert_eq!(payments.len(), 10);
    assert_eq!(paid, dec!(100.00));
    assert_eq!(stored.invoice.amount_paid_htg, paid);
    assert_eq!(stored.invoice.balance_due_htg, dec!(1000.00));
    assert_eq!(stored.invoice.status, DbInvoiceStatus::Partial);
}

#[tokio::test]
async fn test_invoice_without_stocked_lines_moves_no_stock() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let delivery = ProductRepository::new(db.clone(), 5)
        .create(
            tenant.id,
            admin.id,
            CreateProductInput {
                code: "SRV-LIV".into(),
                name: "Livraison".into(),
                price_htg: dec!(250),
                is_service: true,
                ..CreateProductInput::default()
            },
        )
        .await
        .unwrap();
    let repo = InvoiceRepository::new(db.clone(), common::clock());

    let invoice = repo
        .create_direct(
            tenant.id,
            admin.id,
            CreateInvoiceInput {
                items: vec![line(delivery.id, 1), free_text("Montage", 1, dec!(500))],
                ..CreateInvoiceInput::default()
            },
        )
        .await
        .unwrap();
    assert!(!invoice.invoice.stock_decremented);
    assert!(invoice.items.iter().all(|i| i.stock_after.is_none()));

    let cancelled = repo
        .cancel(tenant.id, invoice.invoice.id, admin.id, None)
        .await
        .unwrap();
    assert_eq!(cancelled.status, DbInvoiceStatus::Cancelled);

    let movements = stock_movements::Entity::find()
        .filter(stock_movements::Column::TenantId.eq(tenant.id))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(movements, 0);
}
