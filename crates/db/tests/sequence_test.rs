//! Document numbering against Postgres.

mod common;

use futures::future::join_all;
use plus_core::document::{DocumentCounter, DocumentType};
use plus_db::repositories::PgDocumentCounter;
use sea_orm::{ConnectionTrait, DbBackend, Statement, TransactionTrait};

#[tokio::test]
async fn test_concurrent_allocations_are_distinct_and_contiguous() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, _) = common::tenant(&db).await;
    let tenant_id = tenant.id;

    let tasks = (0..20).map(|_| {
        let db = db.clone();
        tokio::spawn(async move {
            PgDocumentCounter::new(&db)
                .increment_and_get(tenant_id, DocumentType::Invoice, 2026)
                .await
        })
    });

    let mut numbers: Vec<i32> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap().number)
        .collect();
    numbers.sort_unstable();

    assert_eq!(numbers, (1..=20).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_new_year_restarts_numbering() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, _) = common::tenant(&db).await;

    db.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "INSERT INTO document_sequences (tenant_id, document_type, prefix, last_number, current_year) \
         VALUES ($1, 'quote', 'DEV', 57, 2025)",
        [tenant.id.into()],
    ))
    .await
    .unwrap();

    let counter = PgDocumentCounter::new(&db);
    let first = counter
        .next_number(tenant.id, DocumentType::Quote, 2026)
        .await
        .unwrap();
    let second = counter
        .next_number(tenant.id, DocumentType::Quote, 2026)
        .await
        .unwrap();

    assert_eq!(first, "DEV-2026-0001");
    assert_eq!(second, "DEV-2026-0002");
}

#[tokio::test]
async fn test_rolled_back_allocation_leaves_no_gap() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, _) = common::tenant(&db).await;

    let txn = db.begin().await.unwrap();
    let discarded = PgDocumentCounter::new(&txn)
        .next_number(tenant.id, DocumentType::Invoice, 2026)
        .await
        .unwrap();
    assert_eq!(discarded, "FAC-2026-0001");
    txn.rollback().await.unwrap();

    let kept = PgDocumentCounter::new(&db)
        .next_number(tenant.id, DocumentType::Invoice, 2026)
        .await
        .unwrap();
    assert_eq!(kept, "FAC-2026-0001");
}
