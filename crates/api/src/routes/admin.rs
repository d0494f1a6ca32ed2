//! Super-admin panel: plans, tenants and subscriptions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use plus_core::auth::hash_password;
use plus_core::subscription::TenantStatus;
use plus_db::entities::{subscription_plans, tenants, users};
use plus_db::repositories::{CreateTenantInput, PlanInput, TenantAction, UpdatePlanInput};
use plus_shared::types::{Currency, PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;

const DEFAULT_EXPIRY_WINDOW_DAYS: u64 = 7;

/// New subscription plan.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlanRequest {
    /// Unique name.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// User cap.
    #[validate(range(min = 1))]
    pub max_users: i32,
    /// Active product cap.
    #[validate(range(min = 0))]
    pub max_products: i32,
    /// Monthly price in HTG.
    pub price_monthly: Decimal,
    /// Offered to new tenants.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

const fn default_true() -> bool {
    true
}

/// Partial plan update.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePlanRequest {
    /// New name.
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    /// New user cap.
    #[validate(range(min = 1))]
    pub max_users: Option<i32>,
    /// New product cap.
    #[validate(range(min = 0))]
    pub max_products: Option<i32>,
    /// New price.
    pub price_monthly: Option<Decimal>,
    /// New availability.
    pub is_active: Option<bool>,
}

/// New tenant with its first administrator.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTenantRequest {
    /// Business name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// URL-safe handle.
    #[validate(length(min = 1, max = 60))]
    pub slug: String,
    /// Plan; unlimited without one.
    pub plan_id: Option<Uuid>,
    /// Months paid up front; the tenant stays pending without them.
    #[validate(range(min = 1, max = 120))]
    pub months: Option<u32>,
    /// Default document currency.
    pub default_currency: Option<Currency>,
    /// Address.
    pub address: Option<String>,
    /// Phone.
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    /// Contact email.
    #[validate(email)]
    pub email: Option<String>,
    /// Tax identification number.
    #[validate(length(max = 50))]
    pub nif: Option<String>,
    /// First admin's login.
    #[validate(email)]
    pub admin_email: String,
    /// First admin's password.
    #[validate(length(min = 8, max = 128))]
    pub admin_password: String,
    /// First admin's name.
    #[validate(length(min = 1, max = 200))]
    pub admin_name: String,
}

/// Created tenant and admin.
#[derive(Debug, Serialize)]
pub struct CreateTenantResponse {
    /// The tenant.
    pub tenant: tenants::Model,
    /// Its first administrator.
    pub admin: users::Model,
}

/// Subscription extension.
#[derive(Debug, Deserialize, Validate)]
pub struct RenewRequest {
    /// Months to add.
    #[validate(range(min = 1, max = 120))]
    pub months: u32,
}

/// Tenant list filter.
#[derive(Debug, Default, Deserialize)]
pub struct TenantQuery {
    /// Lifecycle status.
    pub status: Option<TenantStatus>,
}

/// Expiry window.
#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    /// Days ahead, inclusive.
    pub days: Option<u64>,
}

/// Creates the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/plans", get(list_plans).post(create_plan))
        .route("/admin/plans/{id}", put(update_plan))
        .route("/admin/tenants", get(list_tenants).post(create_tenant))
        .route("/admin/tenants/expiring", get(expiring_tenants))
        .route("/admin/tenants/{id}", get(get_tenant).delete(purge_tenant))
        .route("/admin/tenants/{id}/activate", post(activate_tenant))
        .route("/admin/tenants/{id}/suspend", post(suspend_tenant))
        .route("/admin/tenants/{id}/cancel", post(cancel_tenant))
        .route("/admin/tenants/{id}/renew", post(renew_tenant))
}

/// GET /admin/plans
async fn list_plans(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<subscription_plans::Model>>> {
    Ok(Json(state.tenants().list_plans().await?))
}

/// POST /admin/plans
async fn create_plan(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreatePlanRequest>,
) -> ApiResult<(StatusCode, Json<subscription_plans::Model>)> {
    let plan = state
        .tenants()
        .create_plan(PlanInput {
            name: payload.name,
            max_users: payload.max_users,
            max_products: payload.max_products,
            price_monthly: payload.price_monthly,
            is_active: payload.is_active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(plan)))
}

/// PUT /admin/plans/{id}
async fn update_plan(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdatePlanRequest>,
) -> ApiResult<Json<subscription_plans::Model>> {
    let plan = state
        .tenants()
        .update_plan(
            id,
            UpdatePlanInput {
                name: payload.name,
                max_users: payload.max_users,
                max_products: payload.max_products,
                price_monthly: payload.price_monthly,
                is_active: payload.is_active,
            },
        )
        .await?;
    Ok(Json(plan))
}

/// GET /admin/tenants
async fn list_tenants(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
    Query(query): Query<TenantQuery>,
) -> ApiResult<Json<PageResponse<tenants::Model>>> {
    Ok(Json(state.tenants().list(query.status, &page).await?))
}

/// POST /admin/tenants
async fn create_tenant(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTenantRequest>,
) -> ApiResult<(StatusCode, Json<CreateTenantResponse>)> {
    let input = CreateTenantInput {
        name: payload.name,
        slug: payload.slug,
        plan_id: payload.plan_id,
        months: payload.months,
        default_currency: payload.default_currency,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        nif: payload.nif,
        admin_email: payload.admin_email,
        admin_password_hash: hash_password(&payload.admin_password)?,
        admin_name: payload.admin_name,
    };
    let (tenant, admin) = state.tenants().create_with_admin(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateTenantResponse { tenant, admin }),
    ))
}

/// GET /admin/tenants/expiring?days=N - Stand-in for renewal reminders.
async fn expiring_tenants(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> ApiResult<Json<Vec<tenants::Model>>> {
    let days = query.days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);
    Ok(Json(state.tenants().expiring_within(days).await?))
}

/// GET /admin/tenants/{id}
async fn get_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<tenants::Model>> {
    Ok(Json(state.tenants().get(id).await?))
}

/// DELETE /admin/tenants/{id} - Only cancelled tenants can be purged.
async fn purge_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.tenants().purge(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn transition(
    state: &AppState,
    id: Uuid,
    action: TenantAction,
) -> ApiResult<Json<tenants::Model>> {
    Ok(Json(state.tenants().transition(id, action).await?))
}

/// POST /admin/tenants/{id}/activate
async fn activate_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<tenants::Model>> {
    transition(&state, id, TenantAction::Activate).await
}

/// POST /admin/tenants/{id}/suspend
async fn suspend_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<tenants::Model>> {
    transition(&state, id, TenantAction::Suspend).await
}

/// POST /admin/tenants/{id}/cancel
async fn cancel_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<tenants::Model>> {
    transition(&state, id, TenantAction::Cancel).await
}

/// POST /admin/tenants/{id}/renew
async fn renew_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RenewRequest>,
) -> ApiResult<Json<tenants::Model>> {
    Ok(Json(state.tenants().renew(id, payload.months).await?))
}
