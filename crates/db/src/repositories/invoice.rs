//! Invoice repository: direct sales, payments, cancellation and receipts.

use chrono::{NaiveDate, Utc};
use plus_core::BillingError;
use plus_core::document::{ClientSnapshot, DiscountType, DocumentCounter, DocumentType, Totals};
use plus_core::invoice::{
    InvoiceLifecycle, InvoiceStatus, PaymentMethod, convert_payment, derive_payment_state,
    validate_payment_amount,
};
use plus_core::receipt::{PaperWidth, ReceiptItem, ReceiptView};
use plus_core::stock::{MovementType, ReferenceType};
use plus_shared::BusinessClock;
use plus_shared::types::{Currency, DualAmount, PageRequest, PageResponse, is_storable_amount};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::document::{self, ItemInput, PricedItem};
use super::sequence::PgDocumentCounter;
use super::stock::{NewMovement, StockLedger};
use crate::entities::{
    invoice_items, invoices, payments,
    sea_orm_active_enums::{CurrencyCode, InvoiceStatus as DbInvoiceStatus},
};
use crate::error::{RepoError, RepoResult};

/// Input for a counter sale without a quote.
#[derive(Debug, Clone, Default)]
pub struct CreateInvoiceInput {
    /// Registered client.
    pub client_id: Option<Uuid>,
    /// Inline client details when `client_id` is absent.
    pub client: Option<ClientSnapshot>,
    /// Document currency; defaults to the tenant's.
    pub currency: Option<Currency>,
    /// Discount kind.
    pub discount_type: DiscountType,
    /// Discount value.
    pub discount_value: Decimal,
    /// Free text.
    pub notes: Option<String>,
    /// Payment due date.
    pub due_date: Option<NaiveDate>,
    /// Lines.
    pub items: Vec<ItemInput>,
}

/// Filters for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Only this status.
    pub status: Option<InvoiceStatus>,
    /// Only this client.
    pub client_id: Option<Uuid>,
    /// Matches the invoice number or client name.
    pub search: Option<String>,
}

/// A payment to record.
#[derive(Debug, Clone)]
pub struct PaymentInput {
    /// Amount in `currency`.
    pub amount: Decimal,
    /// Currency of `amount`; defaults to the invoice currency.
    pub currency: Option<Currency>,
    /// Payment method.
    pub method: PaymentMethod,
    /// External reference (cheque number, wallet transaction id).
    pub reference: Option<String>,
    /// Defaults to today in the business timezone.
    pub payment_date: Option<NaiveDate>,
    /// Free text.
    pub notes: Option<String>,
}

/// Result of recording a payment.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentOutcome {
    /// The stored payment.
    pub payment: payments::Model,
    /// Invoice status after the payment.
    pub new_status: InvoiceStatus,
    /// Remaining balance in both currencies.
    pub balance_due: DualAmount,
}

/// Invoice header with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceWithItems {
    /// Header.
    #[serde(flatten)]
    pub invoice: invoices::Model,
    /// Lines in display order.
    pub items: Vec<invoice_items::Model>,
}

/// One line of an invoice about to be written.
#[derive(Debug, Clone)]
pub(crate) struct DraftItem {
    pub product_id: Option<Uuid>,
    pub product_snapshot: Option<serde_json::Value>,
    pub description: String,
    pub quantity: i32,
    pub unit_price: DualAmount,
    pub discount_pct: Decimal,
    pub total: DualAmount,
}

impl From<PricedItem> for DraftItem {
    fn from(item: PricedItem) -> Self {
        Self {
            product_id: item.product_id,
            product_snapshot: item.product_snapshot,
            description: item.description,
            quantity: item.line.quantity,
            unit_price: DualAmount::new(item.line.unit_price_htg, item.line.unit_price_usd),
            discount_pct: item.line.discount_pct,
            total: item.total,
        }
    }
}

/// Everything needed to write an invoice, whatever its origin.
#[derive(Debug, Clone)]
pub(crate) struct InvoiceDraft {
    pub tenant_id: Uuid,
    pub quote_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub client_snapshot: serde_json::Value,
    pub currency: CurrencyCode,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub tax_rate: Decimal,
    pub exchange_rate: Decimal,
    pub totals: Totals,
    pub notes: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub created_by: Uuid,
    pub items: Vec<DraftItem>,
}

/// Numbers, inserts and debits an invoice on `conn`.
///
/// Every non-service line with a product is debited through the stock
/// ledger; a debit that would go negative fails the whole write.
/// `stock_decremented` is set only when at least one line was debited.
pub(crate) async fn write_invoice<C>(
    conn: &C,
    draft: InvoiceDraft,
    year: i32,
) -> RepoResult<InvoiceWithItems>
where
    C: ConnectionTrait + Send + Sync,
{
    let number = PgDocumentCounter::new(conn)
        .next_number(draft.tenant_id, DocumentType::Invoice, year)
        .await?;

    let now = Utc::now().into();
    let invoice_id = Uuid::new_v4();
    let totals = draft.totals;
    let state = derive_payment_state(totals.total, DualAmount::ZERO, draft.currency.into());

    let invoice = invoices::ActiveModel {
        id: Set(invoice_id),
        tenant_id: Set(draft.tenant_id),
        invoice_number: Set(number),
        quote_id: Set(draft.quote_id),
        client_id: Set(draft.client_id),
        client_snapshot: Set(draft.client_snapshot),
        currency: Set(draft.currency),
        discount_type: Set(draft.discount_type.into()),
        discount_value: Set(draft.discount_value),
        tax_rate: Set(draft.tax_rate),
        exchange_rate: Set(draft.exchange_rate),
        subtotal_htg: Set(totals.subtotal.htg),
        subtotal_usd: Set(totals.subtotal.usd),
        discount_htg: Set(totals.discount.htg),
        discount_usd: Set(totals.discount.usd),
        tax_htg: Set(totals.tax.htg),
        tax_usd: Set(totals.tax.usd),
        total_htg: Set(totals.total.htg),
        total_usd: Set(totals.total.usd),
        amount_paid_htg: Set(Decimal::ZERO),
        amount_paid_usd: Set(Decimal::ZERO),
        balance_due_htg: Set(state.balance_due.htg),
        balance_due_usd: Set(state.balance_due.usd),
        status: Set(state.status.into()),
        stock_decremented: Set(false),
        notes: Set(draft.notes),
        due_date: Set(draft.due_date),
        created_by: Set(Some(draft.created_by)),
        cancelled_by: Set(None),
        cancelled_at: Set(None),
        cancel_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    let mut items = Vec::with_capacity(draft.items.len());
    for (position, item) in draft.items.into_iter().enumerate() {
        let debit = item.product_id.filter(|_| {
            !document::is_service_snapshot(item.product_snapshot.as_ref())
        });

        let stock = match debit {
            Some(product_id) => Some(
                StockLedger::apply_in(
                    conn,
                    &NewMovement {
                        tenant_id: draft.tenant_id,
                        product_id,
                        movement_type: MovementType::Sale,
                        quantity_change: -item.quantity,
                        reference_id: Some(invoice_id),
                        reference_type: Some(ReferenceType::Invoice),
                        notes: Some(invoice.invoice_number.clone()),
                        created_by: Some(draft.created_by),
                    },
                )
                .await?,
            ),
            None => None,
        };

        let row = invoice_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            product_id: Set(item.product_id),
            product_snapshot: Set(item.product_snapshot),
            description: Set(item.description),
            quantity: Set(item.quantity),
            unit_price_htg: Set(item.unit_price.htg),
            unit_price_usd: Set(item.unit_price.usd),
            discount_pct: Set(item.discount_pct),
            total_htg: Set(item.total.htg),
            total_usd: Set(item.total.usd),
            sort_order: Set(i32::try_from(position).unwrap_or(i32::MAX)),
            stock_before: Set(stock.map(|s| s.before)),
            stock_after: Set(stock.map(|s| s.after)),
        }
        .insert(conn)
        .await?;
        items.push(row);
    }

    let invoice = if items.iter().any(|i| i.stock_after.is_some()) {
        let mut active: invoices::ActiveModel = invoice.into();
        active.stock_decremented = Set(true);
        active.update(conn).await?
    } else {
        invoice
    };

    info!(
        tenant_id = %invoice.tenant_id,
        invoice_id = %invoice.id,
        invoice_number = %invoice.invoice_number,
        total_htg = %invoice.total_htg,
        "invoice written"
    );

    Ok(InvoiceWithItems { invoice, items })
}

/// Invoice repository.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    clock: BusinessClock,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, clock: BusinessClock) -> Self {
        Self { db, clock }
    }

    /// Creates an invoice directly (counter sale).
    pub async fn create_direct(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: CreateInvoiceInput,
    ) -> RepoResult<InvoiceWithItems> {
        if input.items.is_empty() {
            return Err(BillingError::EmptyDocument.into());
        }

        let txn = self.db.begin().await?;

        let tenant = document::load_tenant(&txn, tenant_id).await?;
        let params = document::pricing(
            input.discount_type,
            input.discount_value,
            tenant.tax_rate,
            tenant.exchange_rate,
        )?;
        let (client_id, client) =
            document::resolve_client(&txn, tenant_id, input.client_id, input.client).await?;
        let priced = document::price_items(&txn, tenant_id, &input.items, params.exchange_rate).await?;
        let lines: Vec<_> = priced.iter().map(|p| p.line).collect();
        let totals = document::document_totals(&lines, &params)?;

        let draft = InvoiceDraft {
            tenant_id,
            quote_id: None,
            client_id,
            client_snapshot: client.to_json(),
            currency: input
                .currency
                .map_or(tenant.default_currency, CurrencyCode::from),
            discount_type: params.discount_type,
            discount_value: params.discount_value,
            tax_rate: params.tax_rate,
            exchange_rate: params.exchange_rate,
            totals,
            notes: input.notes,
            due_date: input.due_date,
            created_by: user_id,
            items: priced.into_iter().map(DraftItem::from).collect(),
        };

        let invoice = write_invoice(&txn, draft, self.clock.year()).await?;
        txn.commit().await?;

        Ok(invoice)
    }

    /// Lists invoices, newest first.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &InvoiceFilter,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<invoices::Model>> {
        let mut query = invoices::Entity::find().filter(invoices::Column::TenantId.eq(tenant_id));

        if let Some(status) = filter.status {
            query = query.filter(invoices::Column::Status.eq(DbInvoiceStatus::from(status)));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(invoices::Column::ClientId.eq(client_id));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(invoices::Column::InvoiceNumber.contains(search))
                    .add(sea_orm::sea_query::Expr::cust_with_values(
                        "client_snapshot->>'name' ILIKE $1",
                        [format!("%{search}%")],
                    )),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(invoices::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Gets an invoice with its lines.
    pub async fn get(&self, tenant_id: Uuid, invoice_id: Uuid) -> RepoResult<InvoiceWithItems> {
        let invoice = invoices::Entity::find_by_id(invoice_id)
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepoError::not_found("Invoice"))?;

        let items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(invoice.id))
            .order_by_asc(invoice_items::Column::SortOrder)
            .all(&self.db)
            .await?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Records a payment and re-derives balance and status from the ledger.
    pub async fn add_payment(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
        user_id: Uuid,
        input: PaymentInput,
    ) -> RepoResult<PaymentOutcome> {
        validate_payment_amount(input.amount)?;

        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(invoice_id)
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| RepoError::not_found("Invoice"))?;
        InvoiceLifecycle::ensure_accepts_payment(invoice.status.into())?;

        let invoice_currency: Currency = invoice.currency.into();
        let currency = input.currency.unwrap_or(invoice_currency);
        let amount = convert_payment(input.amount, currency, invoice.exchange_rate)?;

        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            invoice_id: Set(invoice_id),
            amount_htg: Set(amount.htg),
            amount_usd: Set(amount.usd),
            currency: Set(currency.into()),
            method: Set(input.method.into()),
            reference: Set(input.reference),
            payment_date: Set(input.payment_date.unwrap_or_else(|| self.clock.today())),
            notes: Set(input.notes),
            created_by: Set(Some(user_id)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        let paid: DualAmount = payments::Entity::find()
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .all(&txn)
            .await?
            .iter()
            .map(|p| DualAmount::new(p.amount_htg, p.amount_usd))
            .sum();
        if !is_storable_amount(paid.htg) || !is_storable_amount(paid.usd) {
            return Err(BillingError::validation(
                "amount paid must stay below 1000000000000",
            )
            .into());
        }

        let total = DualAmount::new(invoice.total_htg, invoice.total_usd);
        let state = derive_payment_state(total, paid, invoice_currency);

        let mut active: invoices::ActiveModel = invoice.into();
        active.amount_paid_htg = Set(state.amount_paid.htg);
        active.amount_paid_usd = Set(state.amount_paid.usd);
        active.balance_due_htg = Set(state.balance_due.htg);
        active.balance_due_usd = Set(state.balance_due.usd);
        active.status = Set(state.status.into());
        active.updated_at = Set(Utc::now().into());
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            %tenant_id,
            %invoice_id,
            amount = %input.amount,
            %currency,
            status = %state.status,
            "payment recorded"
        );

        Ok(PaymentOutcome {
            payment,
            new_status: state.status,
            balance_due: state.balance_due,
        })
    }

    /// Payment history of an invoice, oldest first.
    pub async fn payments(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
    ) -> RepoResult<Vec<payments::Model>> {
        Ok(payments::Entity::find()
            .filter(payments::Column::TenantId.eq(tenant_id))
            .filter(payments::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payments::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Cancels an open invoice, crediting debited stock back in the same
    /// transaction.
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
        user_id: Uuid,
        reason: Option<String>,
    ) -> RepoResult<invoices::Model> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(invoice_id)
            .filter(invoices::Column::TenantId.eq(tenant_id))
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| RepoError::not_found("Invoice"))?;
        let status = InvoiceLifecycle::cancel(invoice.status.into())?;

        if invoice.stock_decremented {
            let items = invoice_items::Entity::find()
                .filter(invoice_items::Column::InvoiceId.eq(invoice.id))
                .order_by_asc(invoice_items::Column::SortOrder)
                .all(&txn)
                .await?;

            for item in items.iter().filter(|i| i.stock_after.is_some()) {
                let Some(product_id) = item.product_id else {
                    continue;
                };
                StockLedger::apply_in(
                    &txn,
                    &NewMovement {
                        tenant_id,
                        product_id,
                        movement_type: MovementType::ReturnItem,
                        quantity_change: item.quantity,
                        reference_id: Some(invoice.id),
                        reference_type: Some(ReferenceType::Invoice),
                        notes: Some(format!("Annulation {}", invoice.invoice_number)),
                        created_by: Some(user_id),
                    },
                )
                .await?;
            }
        }

        let now = Utc::now().into();
        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(status.into());
        active.stock_decremented = Set(false);
        active.cancelled_by = Set(Some(user_id));
        active.cancelled_at = Set(Some(now));
        active.cancel_reason = Set(reason);
        active.updated_at = Set(now);
        let invoice = active.update(&txn).await?;

        txn.commit().await?;

        info!(%tenant_id, %invoice_id, %user_id, "invoice cancelled");

        Ok(invoice)
    }

    /// Builds the thermal receipt for an invoice.
    ///
    /// `width_mm` overrides the tenant's configured paper width.
    pub async fn receipt(
        &self,
        tenant_id: Uuid,
        invoice_id: Uuid,
        width_mm: Option<i32>,
    ) -> RepoResult<(ReceiptView, PaperWidth)> {
        let tenant = document::load_tenant(&self.db, tenant_id).await?;
        let InvoiceWithItems { invoice, items } = self.get(tenant_id, invoice_id).await?;
        let paper = PaperWidth::from_mm(width_mm.unwrap_or(tenant.receipt_width_mm))?;

        let currency: Currency = invoice.currency.into();
        let pick = |htg: Decimal, usd: Decimal| DualAmount::new(htg, usd).in_currency(currency);
        let client = ClientSnapshot::from_json(&invoice.client_snapshot)?;

        let view = ReceiptView {
            tenant_name: tenant.name,
            tenant_address: tenant.address,
            tenant_phone: tenant.phone,
            tenant_nif: tenant.nif,
            invoice_number: invoice.invoice_number.clone(),
            issued_at: invoice
                .created_at
                .with_timezone(&self.clock.timezone())
                .naive_local(),
            client_name: client.name,
            currency,
            items: items
                .iter()
                .map(|item| ReceiptItem {
                    description: item.description.clone(),
                    quantity: item.quantity,
                    unit_price: pick(item.unit_price_htg, item.unit_price_usd),
                    total: pick(item.total_htg, item.total_usd),
                })
                .collect(),
            subtotal: pick(invoice.subtotal_htg, invoice.subtotal_usd),
            discount: pick(invoice.discount_htg, invoice.discount_usd),
            tax_rate: invoice.tax_rate,
            tax: pick(invoice.tax_htg, invoice.tax_usd),
            total: pick(invoice.total_htg, invoice.total_usd),
            amount_paid: pick(invoice.amount_paid_htg, invoice.amount_paid_usd),
            balance_due: pick(invoice.balance_due_htg, invoice.balance_due_usd),
            footer: tenant.receipt_footer,
        };

        Ok((view, paper))
    }
}
