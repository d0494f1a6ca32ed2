//! Invoice routes: direct sales, payments, cancellation and receipts.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use plus_core::BillingError;
use plus_core::document::{ClientSnapshot, DiscountType};
use plus_core::invoice::{InvoiceStatus, PaymentMethod};
use plus_core::receipt::render_receipt;
use plus_db::entities::{invoices, payments};
use plus_db::repositories::{
    CreateInvoiceInput, InvoiceFilter, InvoiceWithItems, PaymentInput, PaymentOutcome,
};
use plus_shared::types::{Currency, PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::quotes::{ItemRequest, into_items};
use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::middleware::AuthUser;

/// Direct sale without a prior quote.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    /// Registered client.
    pub client_id: Option<Uuid>,
    /// Inline client; walk-in when neither is given.
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
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Lines.
    #[validate(length(min = 1), nested)]
    pub items: Vec<ItemRequest>,
}

/// Payment against an invoice.
#[derive(Debug, Deserialize, Validate)]
pub struct PaymentRequest {
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Currency paid in; defaults to the invoice's.
    pub currency: Option<Currency>,
    /// Means of payment.
    pub method: PaymentMethod,
    /// Cheque number, transfer id, ...
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    /// Defaults to today in the business timezone.
    pub payment_date: Option<NaiveDate>,
    /// Free text.
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Cancellation details.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CancelRequest {
    /// Why the invoice was voided.
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

/// Invoice list filter.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceQuery {
    /// Payment status.
    pub status: Option<InvoiceStatus>,
    /// Registered client.
    pub client_id: Option<Uuid>,
    /// Matches the number or the client name.
    pub search: Option<String>,
}

/// Receipt options.
#[derive(Debug, Default, Deserialize)]
pub struct ReceiptQuery {
    /// Paper width in millimetres (80 or 57); defaults to the tenant setting.
    pub width: Option<i32>,
}

/// Creates the invoice router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/{id}", get(get_invoice))
        .route(
            "/invoices/{id}/payments",
            get(list_payments).post(add_payment),
        )
        .route("/invoices/{id}/cancel", post(cancel_invoice))
        .route("/invoices/{id}/receipt", get(receipt))
}

/// GET /invoices
async fn list_invoices(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(page): Query<PageRequest>,
    Query(query): Query<InvoiceQuery>,
) -> ApiResult<Json<PageResponse<invoices::Model>>> {
    let filter = InvoiceFilter {
        status: query.status,
        client_id: query.client_id,
        search: query.search,
    };
    let invoices = state
        .invoices()
        .list(auth.tenant_id()?, &filter, &page)
        .await?;
    Ok(Json(invoices))
}

/// POST /invoices - Direct sale; stock is debited immediately.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<InvoiceWithItems>)> {
    let input = CreateInvoiceInput {
        client_id: payload.client_id,
        client: payload.client,
        currency: payload.currency,
        discount_type: payload.discount_type,
        discount_value: payload.discount_value,
        notes: payload.notes,
        due_date: payload.due_date,
        items: into_items(payload.items),
    };
    let invoice = state
        .invoices()
        .create_direct(auth.tenant_id()?, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET /invoices/{id}
async fn get_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<InvoiceWithItems>> {
    let invoice = state.invoices().get(auth.tenant_id()?, id).await?;
    Ok(Json(invoice))
}

/// GET /invoices/{id}/payments
async fn list_payments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<payments::Model>>> {
    let payments = state.invoices().payments(auth.tenant_id()?, id).await?;
    Ok(Json(payments))
}

/// POST /invoices/{id}/payments
async fn add_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<PaymentOutcome>)> {
    let input = PaymentInput {
        amount: payload.amount,
        currency: payload.currency,
        method: payload.method,
        reference: payload.reference,
        payment_date: payload.payment_date,
        notes: payload.notes,
    };
    let outcome = state
        .invoices()
        .add_payment(auth.tenant_id()?, id, auth.user_id(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /invoices/{id}/cancel - Voids an unpaid invoice and returns its stock.
async fn cancel_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CancelRequest>,
) -> ApiResult<Json<invoices::Model>> {
    auth.require_admin()?;
    let invoice = state
        .invoices()
        .cancel(auth.tenant_id()?, id, auth.user_id(), payload.reason)
        .await?;
    Ok(Json(invoice))
}

/// GET /invoices/{id}/receipt?width=80|57 - Thermal receipt as PDF.
async fn receipt(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<ReceiptQuery>,
) -> ApiResult<Response> {
    let (view, paper) = state
        .invoices()
        .receipt(auth.tenant_id()?, id, query.width)
        .await?;
    let filename = format!("{}.pdf", view.invoice_number);

    let pdf = tokio::task::spawn_blocking(move || render_receipt(&view, paper))
        .await
        .map_err(|e| ApiError::Domain(BillingError::Internal(e.to_string())))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}
