//! Initial billing schema.
//!
//! Creates enums, tenant and catalogue tables, documents, the stock ledger and
//! document sequences.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: PLATFORM (plans, tenants, users)
        // ============================================================
        db.execute_unprepared(SUBSCRIPTION_PLANS_SQL).await?;
        db.execute_unprepared(TENANTS_SQL).await?;
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 3: CATALOGUE & STOCK LEDGER
        // ============================================================
        db.execute_unprepared(CLIENTS_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(STOCK_MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 4: DOCUMENTS
        // ============================================================
        db.execute_unprepared(DOCUMENT_SEQUENCES_SQL).await?;
        db.execute_unprepared(QUOTES_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE tenant_status AS ENUM ('pending', 'active', 'suspended', 'cancelled');
CREATE TYPE currency_code AS ENUM ('HTG', 'USD');
CREATE TYPE user_role AS ENUM ('super_admin', 'admin', 'user');
CREATE TYPE discount_type AS ENUM ('percent', 'amount');
CREATE TYPE quote_status AS ENUM ('draft', 'sent', 'converted', 'cancelled');
CREATE TYPE invoice_status AS ENUM ('unpaid', 'partial', 'paid', 'cancelled');
CREATE TYPE payment_method AS ENUM ('cash', 'card', 'bank_transfer', 'cheque', 'mobile_money');
CREATE TYPE movement_type AS ENUM ('purchase', 'sale', 'adjustment', 'return_item');
CREATE TYPE document_type AS ENUM ('quote', 'invoice');
";

const SUBSCRIPTION_PLANS_SQL: &str = r"
CREATE TABLE subscription_plans (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name            VARCHAR(100) NOT NULL UNIQUE,
    max_users       INTEGER NOT NULL CHECK (max_users > 0),
    max_products    INTEGER NOT NULL CHECK (max_products > 0),
    price_monthly   NUMERIC(12, 2) NOT NULL DEFAULT 0 CHECK (price_monthly >= 0),
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const TENANTS_SQL: &str = r"
CREATE TABLE tenants (
    id                      UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name                    VARCHAR(255) NOT NULL,
    slug                    VARCHAR(100) NOT NULL UNIQUE,
    status                  tenant_status NOT NULL DEFAULT 'pending',
    plan_id                 UUID REFERENCES subscription_plans(id) ON DELETE SET NULL,
    subscription_ends_at    DATE,
    default_currency        currency_code NOT NULL DEFAULT 'HTG',
    exchange_rate           NUMERIC(12, 4) NOT NULL DEFAULT 132 CHECK (exchange_rate > 0),
    tax_rate                NUMERIC(5, 2) NOT NULL DEFAULT 10 CHECK (tax_rate >= 0 AND tax_rate <= 100),
    address                 TEXT,
    phone                   VARCHAR(50),
    email                   VARCHAR(255),
    nif                     VARCHAR(50),
    receipt_footer          TEXT,
    receipt_width_mm        INTEGER NOT NULL DEFAULT 80 CHECK (receipt_width_mm IN (80, 57)),
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_tenants_subscription_ends_at ON tenants(subscription_ends_at);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id       UUID REFERENCES tenants(id) ON DELETE CASCADE,
    email           VARCHAR(255) NOT NULL UNIQUE,
    password_hash   VARCHAR(255) NOT NULL,
    full_name       VARCHAR(255) NOT NULL,
    role            user_role NOT NULL DEFAULT 'user',
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    last_login_at   TIMESTAMPTZ,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_users_tenant_scope CHECK ((role = 'super_admin') = (tenant_id IS NULL))
);

CREATE INDEX idx_users_tenant ON users(tenant_id);
";

const CLIENTS_SQL: &str = r"
CREATE TABLE clients (
    id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id           UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    name                VARCHAR(255) NOT NULL,
    email               VARCHAR(255),
    phone               VARCHAR(50),
    address             TEXT,
    nif                 VARCHAR(50),
    preferred_currency  currency_code NOT NULL DEFAULT 'HTG',
    is_active           BOOLEAN NOT NULL DEFAULT TRUE,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_clients_tenant_name ON clients(tenant_id, name);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id       UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    code            VARCHAR(50) NOT NULL,
    name            VARCHAR(255) NOT NULL,
    description     TEXT,
    unit            VARCHAR(20),
    quantity        INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
    min_stock       INTEGER NOT NULL DEFAULT 0 CHECK (min_stock >= 0),
    price_htg       NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (price_htg >= 0),
    price_usd       NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (price_usd >= 0),
    cost_price_htg  NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (cost_price_htg >= 0),
    is_service      BOOLEAN NOT NULL DEFAULT FALSE,
    is_active       BOOLEAN NOT NULL DEFAULT TRUE,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_products_tenant_code UNIQUE (tenant_id, code)
);
";

const STOCK_MOVEMENTS_SQL: &str = r"
CREATE TABLE stock_movements (
    id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id           UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    product_id          UUID NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    movement_type       movement_type NOT NULL,
    quantity_before     INTEGER NOT NULL,
    quantity_change     INTEGER NOT NULL CHECK (quantity_change <> 0),
    quantity_after      INTEGER NOT NULL CHECK (quantity_after >= 0),
    reference_id        UUID,
    reference_type      VARCHAR(50),
    notes               TEXT,
    created_by          UUID REFERENCES users(id) ON DELETE SET NULL,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp(),

    CONSTRAINT chk_stock_movements_reconciled
        CHECK (quantity_after = quantity_before + quantity_change)
);

CREATE INDEX idx_stock_movements_product ON stock_movements(product_id, created_at);
CREATE INDEX idx_stock_movements_reference ON stock_movements(reference_id);
";

const DOCUMENT_SEQUENCES_SQL: &str = r"
CREATE TABLE document_sequences (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id       UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    document_type   document_type NOT NULL,
    prefix          VARCHAR(10) NOT NULL,
    last_number     INTEGER NOT NULL CHECK (last_number > 0),
    current_year    INTEGER NOT NULL,
    updated_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_document_sequences_tenant_type UNIQUE (tenant_id, document_type)
);
";

const QUOTES_SQL: &str = r"
CREATE TABLE quotes (
    id                      UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id               UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    quote_number            VARCHAR(30) NOT NULL,
    client_id               UUID REFERENCES clients(id) ON DELETE SET NULL,
    client_snapshot         JSONB NOT NULL,
    currency                currency_code NOT NULL,
    discount_type           discount_type NOT NULL DEFAULT 'percent',
    discount_value          NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (discount_value >= 0),
    tax_rate                NUMERIC(5, 2) NOT NULL,
    exchange_rate           NUMERIC(12, 4) NOT NULL CHECK (exchange_rate > 0),
    subtotal_htg            NUMERIC(14, 2) NOT NULL DEFAULT 0,
    subtotal_usd            NUMERIC(14, 2) NOT NULL DEFAULT 0,
    discount_htg            NUMERIC(14, 2) NOT NULL DEFAULT 0,
    discount_usd            NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_htg                 NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_usd                 NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_htg               NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_usd               NUMERIC(14, 2) NOT NULL DEFAULT 0,
    status                  quote_status NOT NULL DEFAULT 'draft',
    notes                   TEXT,
    valid_until             DATE,
    converted_at            TIMESTAMPTZ,
    converted_invoice_id    UUID,
    created_by              UUID REFERENCES users(id) ON DELETE SET NULL,
    created_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at              TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_quotes_tenant_number UNIQUE (tenant_id, quote_number)
);

CREATE INDEX idx_quotes_tenant_status ON quotes(tenant_id, status);

CREATE TABLE quote_items (
    id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    quote_id            UUID NOT NULL REFERENCES quotes(id) ON DELETE CASCADE,
    product_id          UUID REFERENCES products(id) ON DELETE SET NULL,
    product_snapshot    JSONB,
    description         TEXT NOT NULL,
    quantity            INTEGER NOT NULL CHECK (quantity > 0),
    unit_price_htg      NUMERIC(14, 2) NOT NULL CHECK (unit_price_htg >= 0),
    unit_price_usd      NUMERIC(14, 2) NOT NULL CHECK (unit_price_usd >= 0),
    discount_pct        NUMERIC(5, 2) NOT NULL DEFAULT 0 CHECK (discount_pct >= 0 AND discount_pct <= 100),
    total_htg           NUMERIC(14, 2) NOT NULL,
    total_usd           NUMERIC(14, 2) NOT NULL,
    sort_order          INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX idx_quote_items_quote ON quote_items(quote_id, sort_order);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id           UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    invoice_number      VARCHAR(30) NOT NULL,
    quote_id            UUID REFERENCES quotes(id) ON DELETE SET NULL,
    client_id           UUID REFERENCES clients(id) ON DELETE SET NULL,
    client_snapshot     JSONB NOT NULL,
    currency            currency_code NOT NULL,
    discount_type       discount_type NOT NULL DEFAULT 'percent',
    discount_value      NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (discount_value >= 0),
    tax_rate            NUMERIC(5, 2) NOT NULL,
    exchange_rate       NUMERIC(12, 4) NOT NULL CHECK (exchange_rate > 0),
    subtotal_htg        NUMERIC(14, 2) NOT NULL DEFAULT 0,
    subtotal_usd        NUMERIC(14, 2) NOT NULL DEFAULT 0,
    discount_htg        NUMERIC(14, 2) NOT NULL DEFAULT 0,
    discount_usd        NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_htg             NUMERIC(14, 2) NOT NULL DEFAULT 0,
    tax_usd             NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_htg           NUMERIC(14, 2) NOT NULL DEFAULT 0,
    total_usd           NUMERIC(14, 2) NOT NULL DEFAULT 0,
    amount_paid_htg     NUMERIC(14, 2) NOT NULL DEFAULT 0,
    amount_paid_usd     NUMERIC(14, 2) NOT NULL DEFAULT 0,
    balance_due_htg     NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (balance_due_htg >= 0),
    balance_due_usd     NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (balance_due_usd >= 0),
    status              invoice_status NOT NULL DEFAULT 'unpaid',
    stock_decremented   BOOLEAN NOT NULL DEFAULT FALSE,
    notes               TEXT,
    due_date            DATE,
    created_by          UUID REFERENCES users(id) ON DELETE SET NULL,
    cancelled_by        UUID REFERENCES users(id) ON DELETE SET NULL,
    cancelled_at        TIMESTAMPTZ,
    cancel_reason       TEXT,
    created_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at          TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_invoices_tenant_number UNIQUE (tenant_id, invoice_number)
);

CREATE INDEX idx_invoices_tenant_status ON invoices(tenant_id, status);
CREATE INDEX idx_invoices_tenant_created ON invoices(tenant_id, created_at);

ALTER TABLE quotes
    ADD CONSTRAINT fk_quotes_converted_invoice
    FOREIGN KEY (converted_invoice_id) REFERENCES invoices(id) ON DELETE SET NULL;

CREATE TABLE invoice_items (
    id                  UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    invoice_id          UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    product_id          UUID REFERENCES products(id) ON DELETE SET NULL,
    product_snapshot    JSONB,
    description         TEXT NOT NULL,
    quantity            INTEGER NOT NULL CHECK (quantity > 0),
    unit_price_htg      NUMERIC(14, 2) NOT NULL CHECK (unit_price_htg >= 0),
    unit_price_usd      NUMERIC(14, 2) NOT NULL CHECK (unit_price_usd >= 0),
    discount_pct        NUMERIC(5, 2) NOT NULL DEFAULT 0 CHECK (discount_pct >= 0 AND discount_pct <= 100),
    total_htg           NUMERIC(14, 2) NOT NULL,
    total_usd           NUMERIC(14, 2) NOT NULL,
    sort_order          INTEGER NOT NULL DEFAULT 0,
    stock_before        INTEGER,
    stock_after         INTEGER
);

CREATE INDEX idx_invoice_items_invoice ON invoice_items(invoice_id, sort_order);
CREATE INDEX idx_invoice_items_product ON invoice_items(product_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id              UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    tenant_id       UUID NOT NULL REFERENCES tenants(id) ON DELETE CASCADE,
    invoice_id      UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    amount_htg      NUMERIC(14, 2) NOT NULL CHECK (amount_htg >= 0),
    amount_usd      NUMERIC(14, 2) NOT NULL CHECK (amount_usd >= 0),
    currency        currency_code NOT NULL,
    method          payment_method NOT NULL,
    reference       VARCHAR(100),
    payment_date    DATE NOT NULL,
    notes           TEXT,
    created_by      UUID REFERENCES users(id) ON DELETE SET NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payments_invoice ON payments(invoice_id);
CREATE INDEX idx_payments_tenant_date ON payments(tenant_id, payment_date);
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS payments;
ALTER TABLE IF EXISTS quotes DROP CONSTRAINT IF EXISTS fk_quotes_converted_invoice;
DROP TABLE IF EXISTS invoice_items;
DROP TABLE IF EXISTS invoices;
DROP TABLE IF EXISTS quote_items;
DROP TABLE IF EXISTS quotes;
DROP TABLE IF EXISTS document_sequences;
DROP TABLE IF EXISTS stock_movements;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS clients;
DROP TABLE IF EXISTS users;
DROP TABLE IF EXISTS tenants;
DROP TABLE IF EXISTS subscription_plans;
DROP TYPE IF EXISTS document_type;
DROP TYPE IF EXISTS movement_type;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS quote_status;
DROP TYPE IF EXISTS discount_type;
DROP TYPE IF EXISTS user_role;
DROP TYPE IF EXISTS currency_code;
DROP TYPE IF EXISTS tenant_status;
";
