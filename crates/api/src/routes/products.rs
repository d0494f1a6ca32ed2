//! Product catalogue and stock routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use plus_core::stock::MovementType;
use plus_db::entities::{products, stock_movements};
use plus_db::repositories::{
    AdjustStockInput, CreateProductInput, ProductFilter, UpdateProductInput,
};
use plus_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// New product.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    /// Code, unique per tenant.
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    /// Name.
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Longer text.
    pub description: Option<String>,
    /// Unit label (`pcs`, `kg`, ...).
    #[validate(length(max = 20))]
    pub unit: Option<String>,
    /// Opening stock, recorded as a purchase movement.
    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i32,
    /// Low-stock threshold.
    #[validate(range(min = 0))]
    pub min_stock: Option<i32>,
    /// Price in HTG.
    pub price_htg: Decimal,
    /// Price in USD.
    #[serde(default)]
    pub price_usd: Decimal,
    /// Purchase cost in HTG.
    #[serde(default)]
    pub cost_price_htg: Decimal,
    /// Services carry no stock.
    #[serde(default)]
    pub is_service: bool,
}

impl From<CreateProductRequest> for CreateProductInput {
    fn from(req: CreateProductRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            description: req.description,
            unit: req.unit,
            quantity: req.quantity,
            min_stock: req.min_stock,
            price_htg: req.price_htg,
            price_usd: req.price_usd,
            cost_price_htg: req.cost_price_htg,
            is_service: req.is_service,
        }
    }
}

/// Partial product update. Stock only moves through adjustments.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    /// New code.
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    /// New name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New unit.
    #[validate(length(max = 20))]
    pub unit: Option<String>,
    /// New threshold.
    #[validate(range(min = 0))]
    pub min_stock: Option<i32>,
    /// New HTG price.
    pub price_htg: Option<Decimal>,
    /// New USD price.
    pub price_usd: Option<Decimal>,
    /// New cost.
    pub cost_price_htg: Option<Decimal>,
}

impl From<UpdateProductRequest> for UpdateProductInput {
    fn from(req: UpdateProductRequest) -> Self {
        Self {
            code: req.code,
            name: req.name,
            description: req.description,
            unit: req.unit,
            min_stock: req.min_stock,
            price_htg: req.price_htg,
            price_usd: req.price_usd,
            cost_price_htg: req.cost_price_htg,
        }
    }
}

/// Manual stock movement.
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustStockRequest {
    /// Units; only `adjustment` accepts a negative value.
    pub quantity: i32,
    /// Movement kind.
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Free text.
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Product list filter.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    /// Matches code or name.
    pub search: Option<String>,
    /// Only products at or under their threshold.
    #[serde(default)]
    pub low_stock: bool,
}

/// Creates the product router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/products/{id}/adjust-stock", post(adjust_stock))
        .route("/products/{id}/movements", get(list_movements))
}

/// GET /products
async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<Json<PageResponse<products::Model>>> {
    let filter = ProductFilter {
        search: query.search,
        low_stock: query.low_stock,
    };
    let products = state
        .products()
        .list(auth.tenant_id()?, &filter, &page)
        .await?;
    Ok(Json(products))
}

/// POST /products
async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<products::Model>)> {
    auth.require_admin()?;
    let product = state
        .products()
        .create(auth.tenant_id()?, auth.user_id(), payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// GET /products/{id}
async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<products::Model>> {
    let product = state.products().get(auth.tenant_id()?, id).await?;
    Ok(Json(product))
}

/// PUT /products/{id}
async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateProductRequest>,
) -> ApiResult<Json<products::Model>> {
    auth.require_admin()?;
    let product = state
        .products()
        .update(auth.tenant_id()?, id, payload.into())
        .await?;
    Ok(Json(product))
}

/// DELETE /products/{id} - Soft delete.
async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    auth.require_admin()?;
    state.products().deactivate(auth.tenant_id()?, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/adjust-stock
async fn adjust_stock(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AdjustStockRequest>,
) -> ApiResult<Json<products::Model>> {
    auth.require_admin()?;
    let input = AdjustStockInput {
        quantity: payload.quantity,
        movement_type: payload.movement_type,
        notes: payload.notes,
    };
    let product = state
        .stock()
        .adjust_stock(auth.tenant_id()?, id, auth.user_id(), input)
        .await?;
    Ok(Json(product))
}

/// GET /products/{id}/movements
async fn list_movements(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<stock_movements::Model>>> {
    let movements = state
        .stock()
        .movements(auth.tenant_id()?, id, &page)
        .await?;
    Ok(Json(movements))
}
