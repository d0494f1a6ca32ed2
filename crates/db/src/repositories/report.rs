//! Dashboard and stock reports.
//!
//! Date ranges are inclusive and evaluated in the business timezone.

use chrono::NaiveDate;
use plus_shared::BusinessClock;
use plus_shared::types::DualAmount;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Statement,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::products;
use crate::error::RepoResult;

const INVOICE_SUMMARY_SQL: &str = r"
SELECT
    COUNT(*) AS invoice_count,
    COALESCE(SUM(total_htg), 0) AS total_htg,
    COALESCE(SUM(total_usd), 0) AS total_usd
FROM invoices
WHERE tenant_id = $1
  AND status <> 'cancelled'
  AND (created_at AT TIME ZONE $2)::date BETWEEN $3 AND $4
";

const COLLECTED_SQL: &str = r"
SELECT
    COALESCE(SUM(p.amount_htg), 0) AS total_htg,
    COALESCE(SUM(p.amount_usd), 0) AS total_usd
FROM payments p
JOIN invoices i ON i.id = p.invoice_id
WHERE p.tenant_id = $1
  AND i.status <> 'cancelled'
  AND p.payment_date BETWEEN $2 AND $3
";

const OUTSTANDING_SQL: &str = r"
SELECT
    COALESCE(SUM(balance_due_htg), 0) AS total_htg,
    COALESCE(SUM(balance_due_usd), 0) AS total_usd
FROM invoices
WHERE tenant_id = $1
  AND status IN ('unpaid', 'partial')
";

const COUNTS_SQL: &str = r"
SELECT
    (SELECT COUNT(*) FROM quotes
      WHERE tenant_id = $1 AND status IN ('draft', 'sent')) AS open_quotes,
    (SELECT COUNT(*) FROM products
      WHERE tenant_id = $1 AND is_active AND NOT is_service
        AND quantity <= min_stock) AS low_stock_count
";

const TOP_PRODUCTS_SQL: &str = r"
SELECT
    ii.product_id,
    MAX(ii.description) AS name,
    SUM(ii.quantity)::BIGINT AS quantity_sold,
    SUM(ii.total_htg) AS revenue_htg,
    SUM(ii.total_usd) AS revenue_usd
FROM invoice_items ii
JOIN invoices i ON i.id = ii.invoice_id
WHERE i.tenant_id = $1
  AND i.status <> 'cancelled'
  AND ii.product_id IS NOT NULL
  AND (i.created_at AT TIME ZONE $2)::date BETWEEN $3 AND $4
GROUP BY ii.product_id
ORDER BY quantity_sold DESC, revenue_htg DESC
LIMIT $5
";

/// Dashboard figures for a period.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// First day, inclusive.
    pub from: NaiveDate,
    /// Last day, inclusive.
    pub to: NaiveDate,
    /// Non-cancelled invoices issued in the period.
    pub invoice_count: i64,
    /// Their total.
    pub invoiced: DualAmount,
    /// Payments received in the period.
    pub collected: DualAmount,
    /// Balance still due on open invoices, all periods.
    pub outstanding: DualAmount,
    /// Draft and sent quotes.
    pub open_quotes: i64,
    /// Stocked products at or under their threshold.
    pub low_stock_count: i64,
}

/// Best seller row.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct TopProduct {
    /// Product.
    pub product_id: Uuid,
    /// Line text as sold.
    pub name: String,
    /// Units sold.
    pub quantity_sold: i64,
    /// Revenue in HTG.
    pub revenue_htg: Decimal,
    /// Revenue in USD.
    pub revenue_usd: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct InvoiceSummaryRow {
    invoice_count: i64,
    total_htg: Decimal,
    total_usd: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct AmountRow {
    total_htg: Decimal,
    total_usd: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct CountsRow {
    open_quotes: i64,
    low_stock_count: i64,
}

impl From<AmountRow> for DualAmount {
    fn from(row: AmountRow) -> Self {
        Self::new(row.total_htg, row.total_usd)
    }
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
    clock: BusinessClock,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, clock: BusinessClock) -> Self {
        Self { db, clock }
    }

    fn stmt(sql: &str, values: Vec<sea_orm::Value>) -> Statement {
        Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
    }

    /// Dashboard summary over `[from, to]`.
    pub async fn dashboard(
        &self,
        tenant_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepoResult<DashboardSummary> {
        let tz = self.clock.timezone().name().to_string();

        let invoices = InvoiceSummaryRow::find_by_statement(Self::stmt(
            INVOICE_SUMMARY_SQL,
            vec![tenant_id.into(), tz.into(), from.into(), to.into()],
        ))
        .one(&self.db)
        .await?;

        let collected = AmountRow::find_by_statement(Self::stmt(
            COLLECTED_SQL,
            vec![tenant_id.into(), from.into(), to.into()],
        ))
        .one(&self.db)
        .await?;

        let outstanding = AmountRow::find_by_statement(Self::stmt(
            OUTSTANDING_SQL,
            vec![tenant_id.into()],
        ))
        .one(&self.db)
        .await?;

        let counts = CountsRow::find_by_statement(Self::stmt(COUNTS_SQL, vec![tenant_id.into()]))
            .one(&self.db)
            .await?;

        Ok(DashboardSummary {
            from,
            to,
            invoice_count: invoices.as_ref().map_or(0, |r| r.invoice_count),
            invoiced: invoices.map_or(DualAmount::ZERO, |r| {
                DualAmount::new(r.total_htg, r.total_usd)
            }),
            collected: collected.map_or(DualAmount::ZERO, DualAmount::from),
            outstanding: outstanding.map_or(DualAmount::ZERO, DualAmount::from),
            open_quotes: counts.as_ref().map_or(0, |c| c.open_quotes),
            low_stock_count: counts.map_or(0, |c| c.low_stock_count),
        })
    }

    /// Best sellers by quantity over `[from, to]`.
    pub async fn top_products(
        &self,
        tenant_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
        limit: u64,
    ) -> RepoResult<Vec<TopProduct>> {
        let tz = self.clock.timezone().name().to_string();
        let limit = i64::try_from(limit.clamp(1, 100)).unwrap_or(10);

        Ok(TopProduct::find_by_statement(Self::stmt(
            TOP_PRODUCTS_SQL,
            vec![
                tenant_id.into(),
                tz.into(),
                from.into(),
                to.into(),
                limit.into(),
            ],
        ))
        .all(&self.db)
        .await?)
    }

    /// Stocked products at or under their threshold, emptiest first.
    pub async fn low_stock(&self, tenant_id: Uuid) -> RepoResult<Vec<products::Model>> {
        Ok(products::Entity::find()
            .filter(products::Column::TenantId.eq(tenant_id))
            .filter(products::Column::IsActive.eq(true))
            .filter(products::Column::IsService.eq(false))
            .filter(Expr::col(products::Column::Quantity).lte(Expr::col(products::Column::MinStock)))
            .order_by_asc(products::Column::Quantity)
            .all(&self.db)
            .await?)
    }
}
