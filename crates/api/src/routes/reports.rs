//! Read-only reports.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{Datelike, NaiveDate};
use plus_core::BillingError;
use plus_db::entities::products;
use plus_db::repositories::{DashboardSummary, TopProduct};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::AuthUser;

const DEFAULT_TOP_LIMIT: u64 = 10;

/// Reporting period; defaults to the current month up to today.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// First day, inclusive.
    pub from: Option<NaiveDate>,
    /// Last day, inclusive.
    pub to: Option<NaiveDate>,
    /// Rows for ranked reports.
    pub limit: Option<u64>,
}

fn resolve_period(
    today: NaiveDate,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), BillingError> {
    let to = to.unwrap_or(today);
    let from = from.unwrap_or_else(|| to.with_day(1).unwrap_or(to));
    if from > to {
        return Err(BillingError::validation("`from` must not be after `to`"));
    }
    Ok((from, to))
}

/// Creates the report router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/dashboard", get(dashboard))
        .route("/reports/top-products", get(top_products))
        .route("/reports/low-stock", get(low_stock))
}

/// GET /reports/dashboard
async fn dashboard(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<DashboardSummary>> {
    let (from, to) = resolve_period(state.clock.today(), query.from, query.to)?;
    let summary = state
        .reports()
        .dashboard(auth.tenant_id()?, from, to)
        .await?;
    Ok(Json(summary))
}

/// GET /reports/top-products
async fn top_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<Vec<TopProduct>>> {
    let (from, to) = resolve_period(state.clock.today(), query.from, query.to)?;
    let rows = state
        .reports()
        .top_products(
            auth.tenant_id()?,
            from,
            to,
            query.limit.unwrap_or(DEFAULT_TOP_LIMIT),
        )
        .await?;
    Ok(Json(rows))
}

/// GET /reports/low-stock
async fn low_stock(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<products::Model>>> {
    let rows = state.reports().low_stock(auth.tenant_id()?).await?;
    Ok(Json(rows))
}
