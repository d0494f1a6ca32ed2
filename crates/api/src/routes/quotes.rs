//! Quote routes: drafting, sending, cancelling and conversion to an invoice.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::NaiveDate;
use plus_core::document::{ClientSnapshot, DiscountType};
use plus_core::quote::QuoteStatus;
use plus_db::entities::quotes;
use plus_db::repositories::{
    CreateQuoteInput, InvoiceWithItems, ItemInput, QuoteFilter, QuoteWithItems, UpdateQuoteInput,
};
use plus_shared::types::{Currency, PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::error::ApiResult;
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// One document line as sent by the client.
///
/// With a `product_id` the description and prices default to the catalogue;
/// without one the line is free text and needs a description and an HTG
/// price.
#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ItemRequest {
    /// Catalogue product.
    pub product_id: Option<Uuid>,
    /// Line label.
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    /// Units.
    #[validate(range(min = 1))]
    pub quantity: i32,
    /// Unit price override in HTG.
    pub unit_price_htg: Option<Decimal>,
    /// Unit price override in USD.
    pub unit_price_usd: Option<Decimal>,
    /// Line discount in percent.
    pub discount_pct: Option<Decimal>,
}

impl From<ItemRequest> for ItemInput {
    fn from(req: ItemRequest) -> Self {
        Self {
            product_id: req.product_id,
            description: req.description,
            quantity: req.quantity,
            unit_price_htg: req.unit_price_htg,
            unit_price_usd: req.unit_price_usd,
            discount_pct: req.discount_pct,
        }
    }
}

pub(crate) fn into_items(items: Vec<ItemRequest>) -> Vec<ItemInput> {
    items.into_iter().map(ItemInput::from).collect()
}

/// New quote.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuoteRequest {
    /// Registered client.
    pub client_id: Option<Uuid>,
    /// Inline client for one-off customers.
    pub client: Option<ClientSnapshot>,
    /// Document currency; defaults to the tenant's.
    pub currency: Option<Currency>,
    /// How `discount_value` is read.
    #[serde(default)]
    pub discount_type: DiscountType,
    /// Document-level discount.
    #[serde(default)]
    pub discount_value: Decimal,
    /// Free text.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Offer expiry.
    pub valid_until: Option<NaiveDate>,
    /// Lines.
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<ItemRequest>,
}

/// Draft edit. `items`, when present, replaces every line.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuoteRequest {
    /// Registered client.
    pub client_id: Option<Uuid>,
    /// Inline client.
    pub client: Option<ClientSnapshot>,
    /// Document currency.
    pub currency: Option<Currency>,
    /// Discount kind.
    pub discount_type: Option<DiscountType>,
    /// Discount value.
    pub discount_value: Option<Decimal>,
    /// Free text.
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    /// Offer expiry.
    pub valid_until: Option<NaiveDate>,
    /// Replacement lines.
    #[validate(nested)]
    pub items: Option<Vec<ItemRequest>>,
}

/// Quote list filter.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteQuery {
    /// Lifecycle status.
    pub status: Option<QuoteStatus>,
    /// Registered client.
    pub client_id: Option<Uuid>,
    /// Matches the number or the client name.
    pub search: Option<String>,
}

/// Creates the quote router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/quotes", get(list_quotes).post(create_quote))
        .route("/quotes/{id}", get(get_quote).put(update_quote))
        .route("/quotes/{id}/send", post(send_quote))
        .route("/quotes/{id}/cancel", post(cancel_quote))
        .route("/quotes/{id}/convert", post(convert_quote))
}

/// GET /quotes
async fn list_quotes(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<QuoteQuery>,
) -> ApiResult<Json<PageResponse<quotes::Model>>> {
    let filter = QuoteFilter {
        status: query.status,
        client_id: query.client_id,
        search: query.search,
    };
    let quotes = state.quotes().list(auth.tenant_id()?, &filter, &page).await?;
    Ok(Json(quotes))
}

/// POST /quotes
async fn create_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateQuoteRequest>,
) -> ApiResult<(StatusCode, Json<QuoteWithItems>)> {
    let input = CreateQuoteInput {
        client_id: payload.client_id,
        client: payload.client,
        currency: payload.currency,
        discount_type: payload.discount_type,
        discount_value: payload.discount_value,
        notes: payload.notes,
        valid_until: payload.valid_until,
        items: into_items(payload.items),
    };
    let quote = state
        .quotes()
        .create(auth.tenant_id()?, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

/// GET /quotes/{id}
async fn get_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<QuoteWithItems>> {
    let quote = state.quotes().get(auth.tenant_id()?, id).await?;
    Ok(Json(quote))
}

/// PUT /quotes/{id}
async fn update_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateQuoteRequest>,
) -> ApiResult<Json<QuoteWithItems>> {
    let input = UpdateQuoteInput {
        client_id: payload.client_id,
        client: payload.client,
        currency: payload.currency,
        discount_type: payload.discount_type,
        discount_value: payload.discount_value,
        notes: payload.notes,
        valid_until: payload.valid_until,
        items: payload.items.map(into_items),
    };
    let quote = state.quotes().update(auth.tenant_id()?, id, input).await?;
    Ok(Json(quote))
}

/// POST /quotes/{id}/send
async fn send_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<quotes::Model>> {
    let quote = state.quotes().send(auth.tenant_id()?, id).await?;
    Ok(Json(quote))
}

/// POST /quotes/{id}/cancel
async fn cancel_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<quotes::Model>> {
    auth.require_admin()?;
    let quote = state.quotes().cancel(auth.tenant_id()?, id).await?;
    Ok(Json(quote))
}

/// POST /quotes/{id}/convert - Turns the quote into an invoice and debits stock.
async fn convert_quote(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<InvoiceWithItems>)> {
    let invoice = state
        .quotes()
        .convert(auth.tenant_id()?, id, auth.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}
