//! Tenant administration against Postgres.

mod common;

use chrono::NaiveDate;
use plus_core::BillingError;
use plus_core::auth::UserRole;
use plus_core::subscription::TenantAccess;
use plus_db::entities::sea_orm_active_enums::TenantStatus;
use plus_db::entities::products;
use plus_db::repositories::{
    CreateProductInput, CreateTenantInput, CreateUserInput, PlanInput, ProductRepository,
    TenantAction, TenantRepository, UserRepository,
};
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use uuid::Uuid;

#[tokio::test]
async fn test_plan_caps_users() {
    let Some(db) = common::connect().await else {
        return;
    };
    let tenants = TenantRepository::new(db.clone(), common::clock());
    let suffix = Uuid::new_v4().simple().to_string();

    let plan = tenants
        .create_plan(PlanInput {
            name: format!("Solo {suffix}"),
            max_users: 2,
            max_products: 50,
            price_monthly: dec!(1500),
            is_active: true,
        })
        .await
        .unwrap();

    let (tenant, _) = tenants
        .create_with_admin(CreateTenantInput {
            name: "Solo".into(),
            slug: format!("solo-{suffix}"),
            plan_id: Some(plan.id),
            months: Some(1),
            admin_email: format!("solo-{suffix}@example.com"),
            admin_password_hash: "hash".into(),
            admin_name: "Solo Admin".into(),
            ..CreateTenantInput::default()
        })
        .await
        .unwrap();

    let users = UserRepository::new(db.clone());
    let new_user = |n: u8| CreateUserInput {
        email: format!("user{n}-{suffix}@example.com"),
        password_hash: "hash".into(),
        full_name: format!("User {n}"),
        role: UserRole::User,
    };

    users.create_in_tenant(tenant.id, new_user(1)).await.unwrap();
    let err: BillingError = users
        .create_in_tenant(tenant.id, new_user(2))
        .await
        .unwrap_err()
        .into();
    assert!(matches!(err, BillingError::PlanLimitReached { limit: 2, .. }));
}

#[tokio::test]
async fn test_status_renewal_and_purge() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, _) = common::tenant(&db).await;
    let repo = TenantRepository::new(db.clone(), common::clock());

    assert_eq!(tenant.subscription_ends_at, NaiveDate::from_ymd_opt(2026, 2, 5));
    assert_eq!(repo.access(tenant.id).await.unwrap(), TenantAccess::Allowed);

    let suspended = repo.transition(tenant.id, TenantAction::Suspend).await.unwrap();
    assert_eq!(suspended.status, TenantStatus::Suspended);
    assert!(matches!(
        repo.access(tenant.id).await.unwrap(),
        TenantAccess::Inactive(_)
    ));

    let renewed = repo.renew(tenant.id, 3).await.unwrap();
    assert_eq!(renewed.status, TenantStatus::Active);
    assert_eq!(renewed.subscription_ends_at, NaiveDate::from_ymd_opt(2026, 5, 5));

    let err: BillingError = repo.purge(tenant.id).await.unwrap_err().into();
    assert!(matches!(err, BillingError::InvalidState { .. }));

    repo.transition(tenant.id, TenantAction::Cancel).await.unwrap();
    repo.purge(tenant.id).await.unwrap();
    let err: BillingError = repo.get(tenant.id).await.unwrap_err().into();
    assert_eq!(err.error_code(), "NOT_FOUND");
}

#[tokio::test]
async fn test_expired_subscription_blocks_access() {
    let Some(db) = common::connect().await else {
        return;
    };
    let (tenant, _) = common::tenant(&db).await;
    let later = TenantRepository::new(
        db.clone(),
        common::clock_on(NaiveDate::from_ymd_opt(2026, 2, 6).unwrap()),
    );

    assert!(matches!(
        later.access(tenant.id).await.unwrap(),
        TenantAccess::Expired(_)
    ));

    let on_due_day = TenantRepository::new(
        db.clone(),
        common::clock_on(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
    );
    let expiring = on_due_day.expiring_within(7).await.unwrap();
    assert!(expiring.iter().any(|t| t.id == tenant.id));
}

#[tokio::test]
async fn test_concurrent_creates_respect_plan_limits() {
    let Some(db) = common::connect().await else {
        return;
    };
    let tenants = TenantRepository::new(db.clone(), common::clock());
    let suffix = Uuid::new_v4().simple().to_string();

    let plan = tenants
        .create_plan(PlanInput {
            name: format!("Mini {suffix}"),
            max_users: 3,
            max_products: 3,
            price_monthly: dec!(500),
            is_active: true,
        })
        .await
        .unwrap();
    let (tenant, admin) = tenants
        .create_with_admin(CreateTenantInput {
            name: "Mini".into(),
            slug: format!("mini-{suffix}"),
            plan_id: Some(plan.id),
            months: Some(1),
            admin_email: format!("mini-{suffix}@example.com"),
            admin_password_hash: "hash".into(),
            admin_name: "Mini Admin".into(),
            ..CreateTenantInput::default()
        })
        .await
        .unwrap();

    let catalogue = ProductRepository::new(db.clone(), 5);
    let created = futures::future::join_all((0..8).map(|n| {
        catalogue.create(
            tenant.id,
            admin.id,
            CreateProductInput {
                code: format!("MINI-{n}"),
                name: format!("Article {n}"),
                price_htg: dec!(100),
                price_usd: dec!(1),
                ..CreateProductInput::default()
            },
        )
    }))
    .await;
    let rejected = created
        .into_iter()
        .filter_map(Result::err)
        .map(BillingError::from)
        .collect::<Vec<_>>();
    assert_eq!(rejected.len(), 5);
    assert!(
        rejected
            .iter()
            .all(|e| matches!(e, BillingError::PlanLimitReached { limit: 3, .. }))
    );
    let active = products::Entity::find()
        .filter(products::Column::TenantId.eq(tenant.id))
        .filter(products::Column::IsActive.eq(true))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(active, 3);

    let users = UserRepository::new(db.clone());
    let created = futures::future::join_all((0..6).map(|n| {
        users.create_in_tenant(
            tenant.id,
            CreateUserInput {
                email: format!("mini{n}-{suffix}@example.com"),
                password_hash: "hash".into(),
                full_name: format!("Mini {n}"),
                role: UserRole::User,
            },
        )
    }))
    .await;
    assert_eq!(created.iter().filter(|r| r.is_ok()).count(), 2);
}
