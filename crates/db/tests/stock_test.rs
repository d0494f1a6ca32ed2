//! Stock ledger against Postgres.

mod common;

use plus_core::BillingError;
use plus_core::stock::MovementType;
use plus_db::entities::stock_movements;
use plus_db::repositories::{AdjustStockInput, CreateProductInput, ProductRepository, StockLedger};
use plus_shared::types::PageRequest;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

#[tokio::test]
async fn test_adjustments_follow_the_ledger() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let product = common::product(&db, tenant.id, admin.id, 4, dec!(25)).await;
    let ledger = StockLedger::new(db.clone());

    let adjust = |movement_type, quantity| AdjustStockInput {
        quantity,
        movement_type,
        notes: None,
    };

    let p = ledger
        .adjust_stock(tenant.id, product.id, admin.id, adjust(MovementType::Purchase, 6))
        .await
        .unwrap();
    assert_eq!(p.quantity, 10);

    let p = ledger
        .adjust_stock(tenant.id, product.id, admin.id, adjust(MovementType::Sale, 3))
        .await
        .unwrap();
    assert_eq!(p.quantity, 7);

    let p = ledger
        .adjust_stock(tenant.id, product.id, admin.id, adjust(MovementType::Adjustment, -2))
        .await
        .unwrap();
    assert_eq!(p.quantity, 5);

    let err: BillingError = ledger
        .adjust_stock(tenant.id, product.id, admin.id, adjust(MovementType::Sale, 6))
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, BillingError::NegativeStock { available: 5, change: -6, .. }));

    let latest = ledger.latest_movement(product.id).await.unwrap().unwrap();
    assert_eq!(latest.quantity_after, 5);
    assert_eq!(latest.quantity_before + latest.quantity_change, latest.quantity_after);

    let history = ledger
        .movements(tenant.id, product.id, &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(history.meta.total, 4);
}

#[tokio::test]
async fn test_concurrent_adjustments_chain_in_insertion_order() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let product = common::product(&db, tenant.id, admin.id, 20, dec!(25)).await;
    let ledger = StockLedger::new(db.clone());

    let results = futures::future::join_all((0..10).map(|n| {
        let (movement_type, quantity) = if n % 2 == 0 {
            (MovementType::Purchase, 3)
        } else {
            (MovementType::Sale, 1)
        };
        ledger.adjust_stock(
            tenant.id,
            product.id,
            admin.id,
            AdjustStockInput {
                quantity,
                movement_type,
                notes: None,
            },
        )
    }))
    .await;
    assert!(results.iter().all(Result::is_ok));

    let history = stock_movements::Entity::find()
        .filter(stock_movements::Column::ProductId.eq(product.id))
        .order_by_asc(stock_movements::Column::Seq)
        .all(&db)
        .await
        .unwrap();
    assert_eq!(history.len(), 11);
    assert_eq!(history[0].quantity_before, 0);
    for pair in history.windows(2) {
        assert!(pair[0].seq < pair[1].seq);
        assert_eq!(pair[1].quantity_before, pair[0].quantity_after);
    }

    let latest = ledger.latest_movement(product.id).await.unwrap().unwrap();
    assert_eq!(latest.id, history[10].id);
    assert_eq!(latest.quantity_after, 30);
}

#[tokio::test]
async fn test_service_products_have_no_stock() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let service = ProductRepository::new(db.clone(), 5)
        .create(
            tenant.id,
            admin.id,
            CreateProductInput {
                code: "SRV-1".into(),
                name: "Livraison".into(),
                quantity: 3,
                price_htg: dec!(250),
                is_service: true,
                ..CreateProductInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(service.quantity, 0);

    let err: BillingError = StockLedger::new(db.clone())
        .adjust_stock(
            tenant.id,
            service.id,
            admin.id,
            AdjustStockInput {
                quantity: 1,
                movement_type: MovementType::Purchase,
                notes: None,
            },
        )
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.error_code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_code_is_duplicate_key() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, admin) = common::tenant(&db).await;
    let repo = ProductRepository::new(db.clone(), 5);
    let input = CreateProductInput {
        code: "DUP-1".into(),
        name: "Savon".into(),
        price_htg: dec!(75),
        ..CreateProductInput::default()
    };

    repo.create(tenant.id, admin.id, input.clone()).await.unwrap();
    let err: BillingError = repo
        .create(tenant.id, admin.id, input)
        .await
        .unwrap_err()
        .into();
    assert_eq!(err.error_code(), "DUPLICATE_KEY");
}
