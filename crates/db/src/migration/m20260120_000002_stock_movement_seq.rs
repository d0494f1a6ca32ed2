//! Gives stock movements a strict insertion order.
//!
//! `created_at` can tie within one microsecond; `seq` never does. Existing rows
//! are numbered in `created_at` order.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(ADD_SEQ_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(DROP_SEQ_SQL).await?;
        Ok(())
    }
}

const ADD_SEQ_SQL: &str = r"
ALTER TABLE stock_movements ADD COLUMN seq BIGINT;
CREATE SEQUENCE stock_movements_seq_seq OWNED BY stock_movements.seq;

UPDATE stock_movements m
SET seq = ordered.n
FROM (
    SELECT id, ROW_NUMBER() OVER (ORDER BY created_at, id) AS n
    FROM stock_movements
) ordered
WHERE m.id = ordered.id;

SELECT setval(
    'stock_movements_seq_seq',
    COALESCE((SELECT MAX(seq) FROM stock_movements), 0) + 1,
    false
);

ALTER TABLE stock_movements
    ALTER COLUMN seq SET DEFAULT nextval('stock_movements_seq_seq'),
    ALTER COLUMN seq SET NOT NULL,
    ADD CONSTRAINT uq_stock_movements_seq UNIQUE (seq);

DROP INDEX idx_stock_movements_product;
CREATE INDEX idx_stock_movements_product ON stock_movements(product_id, seq);
";

const DROP_SEQ_SQL: &str = r"
DROP INDEX idx_stock_movements_product;
ALTER TABLE stock_movements DROP COLUMN seq;
CREATE INDEX idx_stock_movements_product ON stock_movements(product_id, created_at);
";
