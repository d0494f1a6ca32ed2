//! Quote repository.

use chrono::{NaiveDate, Utc};
use plus_core::BillingError;
use plus_core::document::{
    ClientSnapshot, DiscountType, DocumentCounter, DocumentType, LineInput, PricingParams, Totals,
};
use plus_core::quote::{QuoteLifecycle, QuoteStatus};
use plus_shared::BusinessClock;
use plus_shared::types::{Currency, DualAmount, PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::document::{self, ItemInput, PricedItem};
use super::invoice::{DraftItem, InvoiceDraft, InvoiceWithItems, write_invoice};
use super::sequence::PgDocumentCounter;
use crate::entities::{
    quote_items, quotes,
    sea_orm_active_enums::{CurrencyCode, QuoteStatus as DbQuoteStatus},
};
use crate::error::{RepoError, RepoResult};

/// Input for creating a quote.
#[derive(Debug, Clone, Default)]
pub struct CreateQuoteInput {
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
    /// Offer expiry.
    pub valid_until: Option<NaiveDate>,
    /// Lines.
    pub items: Vec<ItemInput>,
}

/// Partial update of a draft or sent quote. `items` replaces all lines.
#[derive(Debug, Clone, Default)]
pub struct UpdateQuoteInput {
    /// New registered client.
    pub client_id: Option<Uuid>,
    /// New inline client.
    pub client: Option<ClientSnapshot>,
    /// New currency.
    pub currency: Option<Currency>,
    /// New discount kind.
    pub discount_type: Option<DiscountType>,
    /// New discount value.
    pub discount_value: Option<Decimal>,
    /// New notes.
    pub notes: Option<String>,
    /// New expiry.
    pub valid_until: Option<NaiveDate>,
    /// Replacement lines.
    pub items: Option<Vec<ItemInput>>,
}

/// Filters for listing quotes.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// Only this status.
    pub status: Option<QuoteStatus>,
    /// Only this client.
    pub client_id: Option<Uuid>,
    /// Matches the quote number or client name.
    pub search: Option<String>,
}

/// Quote header with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteWithItems {
    /// Header.
    #[serde(flatten)]
    pub quote: quotes::Model,
    /// Lines in display order.
    pub items: Vec<quote_items::Model>,
}

/// Quote repository.
#[derive(Debug, Clone)]
pub struct QuoteRepository {
    db: DatabaseConnection,
    clock: BusinessClock,
}

impl QuoteRepository {
    /// Creates a new quote repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, clock: BusinessClock) -> Self {
        Self { db, clock }
    }

    /// Creates a draft quote priced with the tenant's current tax and
    /// exchange rates.
    pub async fn create(
        &self,
        tenant_id: Uuid,
        user_id: Uuid,
        input: CreateQuoteInput,
    ) -> RepoResult<QuoteWithItems> {
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
        let totals = totals_of(&priced, &params)?;

        let number = PgDocumentCounter::new(&txn)
            .next_number(tenant_id, DocumentType::Quote, self.clock.year())
            .await?;

        let now = Utc::now().into();
        let quote = quotes::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(tenant_id),
            quote_number: Set(number),
            client_id: Set(client_id),
            client_snapshot: Set(client.to_json()),
            currency: Set(input
                .currency
                .map_or(tenant.default_currency, CurrencyCode::from)),
            discount_type: Set(params.discount_type.into()),
            discount_value: Set(params.discount_value),
            tax_rate: Set(params.tax_rate),
            exchange_rate: Set(params.exchange_rate),
            subtotal_htg: Set(totals.subtotal.htg),
            subtotal_usd: Set(totals.subtotal.usd),
            discount_htg: Set(totals.discount.htg),
            discount_usd: Set(totals.discount.usd),
            tax_htg: Set(totals.tax.htg),
            tax_usd: Set(totals.tax.usd),
            total_htg: Set(totals.total.htg),
            total_usd: Set(totals.total.usd),
            status: Set(DbQuoteStatus::Draft),
            notes: Set(input.notes),
            valid_until: Set(input.valid_until),
            converted_at: Set(None),
            converted_invoice_id: Set(None),
            created_by: Set(Some(user_id)),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let items = insert_items(&txn, quote.id, priced).await?;
        txn.commit().await?;

        info!(
            %tenant_id,
            quote_id = %quote.id,
            quote_number = %quote.quote_number,
            "quote created"
        );

        Ok(QuoteWithItems { quote, items })
    }

    /// Lists quotes, newest first.
    pub async fn list(
        &self,
        tenant_id: Uuid,
        filter: &QuoteFilter,
        page: &PageRequest,
    ) -> RepoResult<PageResponse<quotes::Model>> {
        let mut query = quotes::Entity::find().filter(quotes::Column::TenantId.eq(tenant_id));

        if let Some(status) = filter.status {
            query = query.filter(quotes::Column::Status.eq(DbQuoteStatus::from(status)));
        }
        if let Some(client_id) = filter.client_id {
            query = query.filter(quotes::Column::ClientId.eq(client_id));
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(quotes::Column::QuoteNumber.contains(search))
                    .add(sea_orm::sea_query::Expr::cust_with_values(
                        "client_snapshot->>'name' ILIKE $1",
                        [format!("%{search}%")],
                    )),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let data = query
            .order_by_desc(quotes::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Gets a quote with its lines.
    pub async fn get(&self, tenant_id: Uuid, quote_id: Uuid) -> RepoResult<QuoteWithItems> {
        let quote = quotes::Entity::find_by_id(quote_id)
            .filter(quotes::Column::TenantId.eq(tenant_id))
            .one(&self.db)
            .await?
            .ok_or_else(|| RepoError::not_found("Quote"))?;
        let items = load_items(&self.db, quote.id).await?;

        Ok(QuoteWithItems { quote, items })
    }

    /// Updates a draft or sent quote and recomputes its totals.
    ///
    /// Tax and exchange rates stay those stored when the quote was created.
    pub async fn update(
        &self,
        tenant_id: Uuid,
        quote_id: Uuid,
        input: UpdateQuoteInput,
    ) -> RepoResult<QuoteWithItems> {
        let txn = self.db.begin().await?;

        let quote = lock_quote(&txn, tenant_id, quote_id).await?;
        QuoteLifecycle::ensure_editable(quote.status.into())?;

        let params = document::pricing(
            input.discount_type.unwrap_or_else(|| quote.discount_type.into()),
            input.discount_value.unwrap_or(quote.discount_value),
            quote.tax_rate,
            quote.exchange_rate,
        )?;

        let (items, totals) = match input.items {
            Some(new_items) => {
                let priced =
                    document::price_items(&txn, tenant_id, &new_items, params.exchange_rate).await?;
                let totals = totals_of(&priced, &params)?;
                quote_items::Entity::delete_many()
                    .filter(quote_items::Column::QuoteId.eq(quote.id))
                    .exec(&txn)
                    .await?;
                (insert_items(&txn, quote.id, priced).await?, totals)
            }
            None => {
                let items = load_items(&txn, quote.id).await?;
                let lines: Vec<LineInput> = items.iter().map(line_of).collect();
                (items, document::document_totals(&lines, &params)?)
            }
        };

        let mut active: quotes::ActiveModel = quote.clone().into();
        if input.client_id.is_some() || input.client.is_some() {
            let (client_id, client) =
                document::resolve_client(&txn, tenant_id, input.client_id, input.client).await?;
            active.client_id = Set(client_id);
            active.client_snapshot = Set(client.to_json());
        }
        if let Some(currency) = input.currency {
            active.currency = Set(currency.into());
        }
        if input.notes.is_some() {
            active.notes = Set(input.notes);
        }
        if input.valid_until.is_some() {
            active.valid_until = Set(input.valid_until);
        }
        active.discount_type = Set(params.discount_type.into());
        active.discount_value = Set(params.discount_value);
        set_totals(&mut active, &totals);
        active.updated_at = Set(Utc::now().into());
        let quote = active.update(&txn).await?;

        txn.commit().await?;

        info!(%tenant_id, %quote_id, "quote updated");

        Ok(QuoteWithItems { quote, items })
    }

    /// `draft → sent`.
    pub async fn send(&self, tenant_id: Uuid, quote_id: Uuid) -> RepoResult<quotes::Model> {
        self.transition(tenant_id, quote_id, QuoteLifecycle::send).await
    }

    /// `draft | sent → cancelled`.
    pub async fn cancel(&self, tenant_id: Uuid, quote_id: Uuid) -> RepoResult<quotes::Model> {
        self.transition(tenant_id, quote_id, QuoteLifecycle::cancel).await
    }

    async fn transition(
        &self,
        tenant_id: Uuid,
        quote_id: Uuid,
        step: fn(QuoteStatus) -> Result<QuoteStatus, BillingError>,
    ) -> RepoResult<quotes::Model> {
        let txn = self.db.begin().await?;

        let quote = lock_quote(&txn, tenant_id, quote_id).await?;
        let next = step(quote.status.into())?;

        let mut active: quotes::ActiveModel = quote.into();
        active.status = Set(next.into());
        active.updated_at = Set(Utc::now().into());
        let quote = active.update(&txn).await?;

        txn.commit().await?;

        info!(%tenant_id, %quote_id, status = %next, "quote status changed");

        Ok(quote)
    }

    /// Converts a quote into an invoice.
    ///
    /// Number allocation, invoice and item inserts, every stock debit and the
    /// quote update share one transaction: a line that would drive stock
    /// negative leaves nothing behind.
    pub async fn convert(
        &self,
        tenant_id: Uuid,
        quote_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<InvoiceWithItems> {
        let txn = self.db.begin().await?;

        let quote = lock_quote(&txn, tenant_id, quote_id).await?;
        let items = load_items(&txn, quote.id).await?;
        let next = QuoteLifecycle::convert(quote.status.into(), items.len())?;

        let draft = InvoiceDraft {
            tenant_id,
            quote_id: Some(quote.id),
            client_id: quote.client_id,
            client_snapshot: quote.client_snapshot.clone(),
            currency: quote.currency,
            discount_type: quote.discount_type.into(),
            discount_value: quote.discount_value,
            tax_rate: quote.tax_rate,
            exchange_rate: quote.exchange_rate,
            totals: stored_totals(&quote),
            notes: quote.notes.clone(),
            due_date: None,
            created_by: user_id,
            items: items.into_iter().map(draft_item).collect(),
        };
        let invoice = write_invoice(&txn, draft, self.clock.year()).await?;

        let now = Utc::now().into();
        let mut active: quotes::ActiveModel = quote.into();
        active.status = Set(next.into());
        active.converted_at = Set(Some(now));
        active.converted_invoice_id = Set(Some(invoice.invoice.id));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            %tenant_id,
            %quote_id,
            invoice_id = %invoice.invoice.id,
            invoice_number = %invoice.invoice.invoice_number,
            "quote converted"
        );

        Ok(invoice)
    }
}

async fn lock_quote(
    txn: &DatabaseTransaction,
    tenant_id: Uuid,
    quote_id: Uuid,
) -> RepoResult<quotes::Model> {
    quotes::Entity::find_by_id(quote_id)
        .filter(quotes::Column::TenantId.eq(tenant_id))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or_else(|| RepoError::not_found("Quote"))
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    quote_id: Uuid,
) -> RepoResult<Vec<quote_items::Model>> {
    Ok(quote_items::Entity::find()
        .filter(quote_items::Column::QuoteId.eq(quote_id))
        .order_by_asc(quote_items::Column::SortOrder)
        .all(conn)
        .await?)
}

async fn insert_items(
    txn: &DatabaseTransaction,
    quote_id: Uuid,
    priced: Vec<PricedItem>,
) -> RepoResult<Vec<quote_items::Model>> {
    let mut items = Vec::with_capacity(priced.len());
    for (position, item) in priced.into_iter().enumerate() {
        let row = quote_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            quote_id: Set(quote_id),
            product_id: Set(item.product_id),
            product_snapshot: Set(item.product_snapshot),
            description: Set(item.description),
            quantity: Set(item.line.quantity),
            unit_price_htg: Set(item.line.unit_price_htg),
            unit_price_usd: Set(item.line.unit_price_usd),
            discount_pct: Set(item.line.discount_pct),
            total_htg: Set(item.total.htg),
            total_usd: Set(item.total.usd),
            sort_order: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        }
        .insert(txn)
        .await?;
        items.push(row);
    }
    Ok(items)
}

fn totals_of(priced: &[PricedItem], params: &PricingParams) -> Result<Totals, BillingError> {
    let lines: Vec<LineInput> = priced.iter().map(|p| p.line).collect();
    document::document_totals(&lines, params)
}

fn line_of(item: &quote_items::Model) -> LineInput {
    LineInput {
        quantity: item.quantity,
        unit_price_htg: item.unit_price_htg,
        unit_price_usd: item.unit_price_usd,
        discount_pct: item.discount_pct,
    }
}

fn set_totals(active: &mut quotes::ActiveModel, totals: &Totals) {
    active.subtotal_htg = Set(totals.subtotal.htg);
    active.subtotal_usd = Set(totals.subtotal.usd);
    active.discount_htg = Set(totals.discount.htg);
    active.discount_usd = Set(totals.discount.usd);
    active.tax_htg = Set(totals.tax.htg);
    active.tax_usd = Set(totals.tax.usd);
    active.total_htg = Set(totals.total.htg);
    active.total_usd = Set(totals.total.usd);
}

/// Totals exactly as stored on the quote; conversion copies, never recomputes.
fn stored_totals(quote: &quotes::Model) -> Totals {
    Totals {
        subtotal: DualAmount::new(quote.subtotal_htg, quote.subtotal_usd),
        discount: DualAmount::new(quote.discount_htg, quote.discount_usd),
        tax: DualAmount::new(quote.tax_htg, quote.tax_usd),
        total: DualAmount::new(quote.total_htg, quote.total_usd),
    }
}

fn draft_item(item: quote_items::Model) -> DraftItem {
    DraftItem {
        product_id: item.product_id,
        product_snapshot: item.product_snapshot,
        description: item.description,
        quantity: item.quantity,
        unit_price: DualAmount::new(item.unit_price_htg, item.unit_price_usd),
        discount_pct: item.discount_pct,
        total: DualAmount::new(item.total_htg, item.total_usd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, htg: Decimal) -> quote_items::Model {
        quote_items::Model {
            id: Uuid::new_v4(),
            quote_id: Uuid::new_v4(),
            product_id: None,
            product_snapshot: None,
            description: "Service".into(),
            quantity,
            unit_price_htg: htg,
            unit_price_usd: dec!(0),
            discount_pct: dec!(0),
            total_htg: htg * Decimal::from(quantity),
            total_usd: dec!(0),
            sort_order: 0,
        }
    }

    #[test]
    fn test_line_of_keeps_prices() {
        let line = line_of(&item(3, dec!(100)));
        assert_eq!(line.quantity, 3);
        assert_eq!(line.unit_price_htg, dec!(100));
    }

    #[test]
    fn test_draft_item_copies_totals() {
        let draft = draft_item(item(2, dec!(50)));
        assert_eq!(draft.total, DualAmount::new(dec!(100), dec!(0)));
        assert_eq!(draft.quantity, 2);
    }
}
