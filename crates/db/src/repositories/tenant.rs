//! Tenants, subscription plans and tenant settings.

use chrono::Utc;
use plus_core::BillingError;
use plus_core::document::validate_exchange_rate;
use plus_core::receipt::PaperWidth;
use plus_core::subscription::{
    TenantAccess, TenantLifecycle, TenantStatus, evaluate_access, is_expiring_within, renewal_end,
};
use plus_shared::BusinessClock;
use plus_shared::types::money::has_scale_at_most;
use plus_shared::types::{Currency, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    ModelTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::{
    sea_orm_active_enums::{CurrencyCode, TenantStatus as DbTenantStatus, UserRole},
    subscription_plans, tenants, users,
};
use crate::error::{RepoError, RepoResult};

const DEFAULT_EXCHANGE_RATE: Decimal = Decimal::from_parts(132, 0, 0, false, 0);
const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
const DEFAULT_RECEIPT_WIDTH_MM: i32 = 80;
/// `NUMERIC(12, 2)`: 10^10.
const MAX_PLAN_PRICE: Decimal = Decimal::from_parts(0x540B_E400, 2, 0, false, 0);

/// Subscription plan fields.
#[derive(Debug, Clone)]
pub struct PlanInput {
    /// Unique name.
    pub name: String,
    /// Maximum tenant users.
    pub max_users: i32,
    /// Maximum active products.
    pub max_products: i32,
    /// Monthly price in HTG.
    pub price_monthly: Decimal,
    /// Offered to new tenants.
    pub is_active: bool,
}

/// Partial plan update.
#[derive(Debug, Clone, Default)]
pub struct UpdatePlanInput {
    /// New name.
    pub name: Option<String>,
    /// New user cap.
    pub max_users: Option<i32>,
    /// New product cap.
    pub max_products: Option<i32>,
    /// New price.
    pub price_monthly: Option<Decimal>,
    /// New availability.
    pub is_active: Option<bool>,
}

/// A new tenant and its first administrator.
#[derive(Debug, Clone, Default)]
pub struct CreateTenantInput {
    /// Business name.
    pub name: String,
    /// URL-safe unique handle.
    pub slug: String,
    /// Subscription plan.
    pub plan_id: Option<Uuid>,
    /// Months paid up front; the tenant stays pending without them.
    pub months: Option<u32>,
    /// Default document currency.
    pub default_currency: Option<Currency>,
    /// Address.
    pub address: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Tax identification number.
    pub nif: Option<String>,
    /// First admin's login.
    pub admin_email: String,
    /// First admin's Argon2 hash.
    pub admin_password_hash: String,
    /// First admin's name.
    pub admin_name: String,
}

/// Tenant-editable settings.
#[derive(Debug, Clone, Default)]
pub struct TenantSettingsInput {
    /// Business name.
    pub name: Option<String>,
    /// Tax rate, percent.
    pub tax_rate: Option<Decimal>,
    /// HTG per USD.
    pub exchange_rate: Option<Decimal>,
    /// Default document currency.
    pub default_currency: Option<Currency>,
    /// Address.
    pub address: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Tax identification number.
    pub nif: Option<String>,
    /// Receipt footer text.
    pub receipt_footer: Option<String>,
    /// Receipt paper width (80 or 57).
    pub receipt_width_mm: Option<i32>,
}

/// Admin status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TenantAction {
    /// `pending | suspended → active`.
    Activate,
    /// `active | pending → suspended`.
    Suspend,
    /// `* → cancelled`.
    Cancel,
}

fn validate_slug(slug: &str) -> Result<(), BillingError> {
    let valid = !slug.is_empty()
        && slug.len() <= 60
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !slug.starts_with('-')
        && !slug.ends_with('-');
    if valid {
        Ok(())
    } else {
        Err(BillingError::validation(
            "slug must be lowercase letters, digits and inner dashes",
        ))
    }
}

fn validate_settings(input: &TenantSettingsInput) -> Result<(), BillingError> {
    if input.tax_rate.is_some_and(|r| {
        r < Decimal::ZERO || r > Decimal::ONE_HUNDRED || !has_scale_at_most(r, 2)
    }) {
        return Err(BillingError::validation(
            "tax rate must be between 0 and 100 with at most 2 decimals",
        ));
    }
    if let Some(rate) = input.exchange_rate {
        validate_exchange_rate(rate)?;
    }
    Ok(())
}

fn validate_plan(max_users: i32, max_products: i32, price: Decimal) -> Result<(), BillingError> {
    if max_users < 1 || max_products < 0 || price < Decimal::ZERO {
        return Err(BillingError::validation(
            "plan limits and price must be positive",
        ));
    }
    if price >= MAX_PLAN_PRICE || !has_scale_at_most(price, 2) {
        return Err(BillingError::validation(
            "plan price must be below 10000000000 with at most 2 decimals",
        ));
    }
    Ok(())
}

/// The tenant's plan, if it has one.
///
/// Locks the tenant row until `conn` commits, so plan-limit checks of one
/// tenant run one at a time between their count and their insert.
pub(crate) async fn lock_plan_of<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
) -> RepoResult<Option<subscription_plans::Model>> {
    let tenant = tenants::Entity::find_by_id(tenant_id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| RepoError::not_found("Tenant"))?;
    Ok(tenant
        .find_related(subscription_plans::Entity)
        .one(conn)
        .await?)
}

/// Tenant and plan repository.
#[derive(Debug, Clone)]
pub struct TenantRepository {
    db: DatabaseConnection,
    clock: BusinessClock,
}

impl TenantRepository {
    /// Creates a new tenant repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, clock: BusinessClock) -> Self {
        Self { db, clock }
    }

    /// Lists plans by price.
    pub async fn list_plans(&self) -> RepoResult<Vec<subscription_plans::Model>> {
        Ok(subscription_plans::Entity::find()
            .order_by_asc(subscription_plans::Column::PriceMonthly)
            .all(&self.db)
            .await?)
    }

    /// Finds a plan by its unique name.
    pub async fn find_plan_by_name(
        &self,
        name: &str,
    ) -> RepoResult<Option<subscription_plans::Model>> {
        Ok(subscription_plans::Entity::find()
            .filter(subscription_plans::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    /// Creates a plan.
    pub async fn create_plan(&self, input: PlanInput) -> RepoResult<subscription_plans::Model> {
        validate_plan(input.max_users, input.max_products, input.price_monthly)?;

        let now = Utc::now().into();
        let plan = subscription_plans::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            max_users: Set(input.max_users),
            max_products: Set(input.max_products),
            price_monthly: Set(input.price_monthly),
            is_active: Set(input.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(plan_id = %plan.id, name = %plan.name, "plan created");
        Ok(plan)
    }

    /// Updates a plan.
    pub async fn update_plan(
        &self,
        plan_id: Uuid,
        input: UpdatePlanInput,
    ) -> RepoResult<subscription_plans::Model> {
        let plan = subscription_plans::Entity::find_by_id(plan_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| RepoError::not_found("Plan"))?;
        validate_plan(
            input.max_users.unwrap_or(plan.max_users),
            input.max_products.unwrap_or(plan.max_products),
            input.price_monthly.unwrap_or(plan.price_monthly),
        )?;

        let mut active: subscription_plans::ActiveModel = plan.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(max_users) = input.max_users {
            active.max_users = Set(max_users);
        }
        if let Some(max_products) = input.max_products {
            active.max_products = Set(max_products);
        }
        if let Some(price) = input.price_monthly {
            active.price_monthly = Set(price);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Creates a tenant together with its first admin user.
    ///
    /// With `months`, the tenant starts active with a subscription ending on
    /// the billing day; otherwise it waits in `pending`.
    pub async fn create_with_admin(
        &self,
        input: CreateTenantInput,
    ) -> RepoResult<(tenants::Model, users::Model)> {
        validate_slug(&input.slug)?;
        if input.name.trim().is_empty() {
            return Err(BillingError::validation("tenant name is required").into());
        }

        let (status, ends_at) = match input.months {
            Some(months) => (
                DbTenantStatus::Active,
                Some(renewal_end(self.clock.today(), None, months)?),
            ),
            None => (DbTenantStatus::Pending, None),
        };

        let txn = self.db.begin().await?;

        if let Some(plan_id) = input.plan_id {
            subscription_plans::Entity::find_by_id(plan_id)
                .one(&txn)
                .await?
                .ok_or_else(|| RepoError::not_found("Plan"))?;
        }

        let now = Utc::now().into();
        let tenant = tenants::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            slug: Set(input.slug),
            status: Set(status),
            plan_id: Set(input.plan_id),
            subscription_ends_at: Set(ends_at),
            default_currency: Set(input
                .default_currency
                .map_or(CurrencyCode::Htg, CurrencyCode::from)),
            exchange_rate: Set(DEFAULT_EXCHANGE_RATE),
            tax_rate: Set(DEFAULT_TAX_RATE),
            address: Set(input.address),
            phone: Set(input.phone),
            email: Set(input.email),
            nif: Set(input.nif),
            receipt_footer: Set(None),
            receipt_width_mm: Set(DEFAULT_RECEIPT_WIDTH_MM),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let admin = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(Some(tenant.id)),
            email: Set(input.admin_email.trim().to_lowercase()),
            password_hash: Set(input.admin_password_hash),
            full_name: Set(input.admin_name),
            role: Set(UserRole::Admin),
            is_active: Set(true),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(tenant_id = %tenant.id, slug = %tenant.slug, status = ?tenant.status, "tenant created");

        Ok((tenant, admin))
    }

    /// Lists tenants by name.
    pub async fn list(
        &self,
        status: Option<TenantStatus>,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<tenants::Model>> {
        let mut query = tenants::Entity::find();
        if let Some(status) = status {
            query = query.filter(tenants::Column::Status.eq(DbTenantStatus::from(status)));
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_asc(tenants::Column::Name)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Gets a tenant.
    pub async fn get(&self, tenant_id: Uuid) -> RepoResult<tenants::Model> {
        tenants::Entity::find_by_id(tenant_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| RepoError::not_found("Tenant"))
    }

    /// Evaluates whether the tenant may use the application today.
    pub async fn access(&self, tenant_id: Uuid) -> RepoResult<TenantAccess> {
        let tenant = self.get(tenant_id).await?;
        Ok(evaluate_access(
            tenant.status.into(),
            tenant.subscription_ends_at,
            self.clock.today(),
        ))
    }

    /// Updates tenant-editable settings.
    pub async fn update_settings(
        &self,
        tenant_id: Uuid,
        input: TenantSettingsInput,
    ) -> RepoResult<tenants::Model> {
        validate_settings(&input)?;
        let width = input
            .receipt_width_mm
            .map(PaperWidth::from_mm)
            .transpose()?;

        let tenant = self.get(tenant_id).await?;
        let mut active: tenants::ActiveModel = tenant.into();

        if let Some(name) = input.name.filter(|n| !n.trim().is_empty()) {
            active.name = Set(name.trim().to_string());
        }
        if let Some(rate) = input.tax_rate {
            active.tax_rate = Set(rate);
        }
        if let Some(rate) = input.exchange_rate {
            active.exchange_rate = Set(rate);
        }
        if let Some(currency) = input.default_currency {
            active.default_currency = Set(currency.into());
        }
        if input.address.is_some() {
            active.address = Set(input.address);
        }
        if input.phone.is_some() {
            active.phone = Set(input.phone);
        }
        if input.email.is_some() {
            active.email = Set(input.email);
        }
        if input.nif.is_some() {
            active.nif = Set(input.nif);
        }
        if input.receipt_footer.is_some() {
            active.receipt_footer = Set(input.receipt_footer);
        }
        if let Some(width) = width {
            active.receipt_width_mm = Set(width.mm());
        }
        active.updated_at = Set(Utc::now().into());

        let tenant = active.update(&self.db).await?;
        info!(%tenant_id, "tenant settings updated");
        Ok(tenant)
    }

    /// Applies an admin status transition.
    pub async fn transition(
        &self,
        tenant_id: Uuid,
        action: TenantAction,
    ) -> RepoResult<tenants::Model> {
        let tenant = self.get(tenant_id).await?;
        let current: TenantStatus = tenant.status.into();
        let next = match action {
            TenantAction::Activate => TenantLifecycle::activate(current)?,
            TenantAction::Suspend => TenantLifecycle::suspend(current)?,
            TenantAction::Cancel => TenantLifecycle::cancel(current)?,
        };

        let mut active: tenants::ActiveModel = tenant.into();
        active.status = Set(next.into());
        active.updated_at = Set(Utc::now().into());
        let tenant = active.update(&self.db).await?;

        info!(%tenant_id, from = %current, to = %next, "tenant status changed");
        Ok(tenant)
    }

    /// Extends the subscription by `months` using the day-5 billing rule and
    /// reactivates the tenant.
    pub async fn renew(&self, tenant_id: Uuid, months: u32) -> RepoResult<tenants::Model> {
        let tenant = self.get(tenant_id).await?;
        let next = TenantLifecycle::renew(tenant.status.into())?;
        let ends_at = renewal_end(self.clock.today(), tenant.subscription_ends_at, months)?;

        let mut active: tenants::ActiveModel = tenant.into();
        active.status = Set(next.into());
        active.subscription_ends_at = Set(Some(ends_at));
        active.updated_at = Set(Utc::now().into());
        let tenant = active.update(&self.db).await?;

        info!(%tenant_id, months, %ends_at, "subscription renewed");
        Ok(tenant)
    }

    /// Hard-deletes a cancelled tenant and everything it owns.
    pub async fn purge(&self, tenant_id: Uuid) -> RepoResult<()> {
        let tenant = self.get(tenant_id).await?;
        TenantLifecycle::ensure_purgeable(tenant.status.into())?;

        tenants::Entity::delete_by_id(tenant_id)
            .exec(&self.db)
            .await?;

        warn!(%tenant_id, slug = %tenant.slug, "tenant purged");
        Ok(())
    }

    /// Active tenants whose subscription ends within `days` days.
    ///
    /// Notification delivery is not wired; callers only list them.
    pub async fn expiring_within(&self, days: u64) -> RepoResult<Vec<tenants::Model>> {
        let today = self.clock.today();
        let tenants = tenants::Entity::find()
            .filter(tenants::Column::Status.eq(DbTenantStatus::Active))
            .filter(tenants::Column::SubscriptionEndsAt.is_not_null())
            .order_by_asc(tenants::Column::SubscriptionEndsAt)
            .all(&self.db)
            .await?;

        Ok(tenants
            .into_iter()
            .filter(|t| {
                t.subscription_ends_at
                    .is_some_and(|end| is_expiring_within(end, today, days))
            })
            .collect())
    }
}
