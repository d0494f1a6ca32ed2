//! First-run bootstrap for a fresh deployment.
//!
//! Seeds the default subscription plans and the platform super-admin. Every
//! step checks for existing rows first, so running it twice is harmless.
//!
//! Refuses to run unless `bootstrap.enabled` is set (`PLUS__BOOTSTRAP__ENABLED=true`).
//! Usage: cargo run --bin bootstrap

use anyhow::{Context, bail};
use plus_core::auth::hash_password;
use plus_db::repositories::PlanInput;
use plus_db::{TenantRepository, UserRepository, connect};
use plus_shared::{AppConfig, BusinessClock};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Name, user cap, product cap, monthly price in HTG.
const DEFAULT_PLANS: [(&str, i32, i32, Decimal); 3] = [
    ("Basic", 2, 100, dec!(1500)),
    ("Pro", 5, 1000, dec!(3500)),
    ("Enterprise", 20, 10_000, dec!(7500)),
];

const MIN_PASSWORD_LEN: usize = 12;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plus=debug,bootstrap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    if !config.bootstrap.enabled {
        bail!("bootstrap is disabled; set PLUS__BOOTSTRAP__ENABLED=true to seed this database");
    }

    let clock = BusinessClock::new(&config.business.timezone)?;
    let db = connect(&config.database)
        .await
        .context("failed to connect to database")?;

    seed_plans(&TenantRepository::new(db.clone(), clock)).await?;
    seed_super_admin(&db, &config).await?;

    info!("bootstrap complete");
    Ok(())
}

async fn seed_plans(tenants: &TenantRepository) -> anyhow::Result<()> {
    for (name, max_users, max_products, price_monthly) in DEFAULT_PLANS {
        if tenants.find_plan_by_name(name).await?.is_some() {
            info!(plan = name, "plan already exists, skipping");
            continue;
        }
        tenants
            .create_plan(PlanInput {
                name: name.to_string(),
                max_users,
                max_products,
                price_monthly,
                is_active: true,
            })
            .await?;
    }
    Ok(())
}

async fn seed_super_admin(db: &DatabaseConnection, config: &AppConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (
        config.bootstrap.admin_email.as_deref(),
        config.bootstrap.admin_password.as_deref(),
    ) else {
        warn!("bootstrap.admin_email or bootstrap.admin_password not set; no super admin seeded");
        return Ok(());
    };

    let users = UserRepository::new(db.clone());
    if users.email_exists(email).await? {
        info!(%email, "super admin already exists, skipping");
        return Ok(());
    }
    if password.len() < MIN_PASSWORD_LEN {
        bail!("bootstrap.admin_password must be at least {MIN_PASSWORD_LEN} characters");
    }

    let hash = hash_password(password)?;
    let user = users
        .create_super_admin(email, &hash, &config.bootstrap.admin_name)
        .await?;
    info!(user_id = %user.id, %email, "super admin seeded");
    Ok(())
}
