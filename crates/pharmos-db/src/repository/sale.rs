//! # Sale Repository
//!
//! The sale transaction and sale reads.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      create_sale(lines, created_by)                     │
//! │                                                                         │
//! │  validate_sale_lines ── empty / qty ≤ 0 / qty > 999 → InvalidInput     │
//! │       │                   (no connection taken yet)                     │
//! │       ▼                                                                 │
//! │  BEGIN ─────────────────────────────────────────────┐ sale_timeout     │
//! │       │                                             │ bound            │
//! │       ▼                                             │                  │
//! │  for each line, in request order:                   │                  │
//! │     conditional decrement ── RETURNING price, name  │                  │
//! │       ├── NotFound / InsufficientStock ─► drop tx ─►│ ROLLBACK         │
//! │       ▼                                             │                  │
//! │  total = Σ qty × price_at_sale (checked)            │                  │
//! │       ▼                                             │                  │
//! │  INSERT sales, INSERT sale_lines                    │                  │
//! │       ▼                                             │                  │
//! │  COMMIT ◄───────────────────────────────────────────┘                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first statement inside the transaction is a write, so the connection
//! takes SQLite's write lock up front and a concurrent sale waits for it
//! (bounded by the busy timeout) instead of working from a stale snapshot.
//! Prices come from the rows the decrements touched, never from the caller.

use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::item::decrement_stock_in;
use pharmos_core::validation::validate_sale_lines;
use pharmos_core::{CoreError, Money, Sale, SaleLine, SaleLineRequest};

const SALE_LINE_COLUMNS: &str =
    "id, sale_id, item_id, name_snapshot, quantity, price_at_sale_cents";

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    timeout: Duration,
}

impl SaleRepository {
    /// Creates a new SaleRepository whose transactions are bounded by `timeout`.
    pub fn new(pool: SqlitePool, timeout: Duration) -> Self {
        SaleRepository { pool, timeout }
    }

    /// Records a multi-line sale and deducts stock, all or nothing.
    ///
    /// ## Errors
    /// - `InvalidInput` (validation) before any storage access
    /// - `ItemNotFound` / `InsufficientStock` for the first failing line
    /// - `Timeout` when the transaction exceeds its bound
    ///
    /// On any error no sale row exists and every item's stock is unchanged.
    pub async fn create_sale(
        &self,
        lines: &[SaleLineRequest],
        created_by: &str,
    ) -> DbResult<Sale> {
        validate_sale_lines(lines)?;

        debug!(lines = lines.len(), created_by = %created_by, "Creating sale");

        let result = tokio::time::timeout(self.timeout, self.run_sale(lines, created_by)).await;

        match result {
            Ok(Ok(sale)) => {
                info!(
                    sale_id = %sale.id,
                    total_cents = sale.total_cents,
                    lines = sale.lines.len(),
                    "Sale committed"
                );
                Ok(sale)
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Sale rejected");
                Err(err)
            }
            Err(_) => {
                // The dropped future dropped the transaction, which rolls back
                warn!(timeout = ?self.timeout, "Sale transaction timed out");
                Err(DbError::Timeout(self.timeout))
            }
        }
    }

    async fn run_sale(&self, lines: &[SaleLineRequest], created_by: &str) -> DbResult<Sale> {
        let mut tx: Transaction<'_, Sqlite> = self.pool.begin().await?;

        let sale_id = Uuid::new_v4().to_string();
        let mut sale_lines = Vec::with_capacity(lines.len());
        let mut total = Money::zero();

        for request in lines {
            let row = decrement_stock_in(&mut tx, &request.item_id, request.quantity).await?;

            let line = SaleLine {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                item_id: Some(row.id),
                name_snapshot: row.name,
                quantity: request.quantity,
                price_at_sale_cents: row.price_sell_cents,
            };

            total = line
                .price_at_sale()
                .checked_mul_quantity(line.quantity)
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(|| DbError::Internal("sale total overflows".to_string()))?;

            sale_lines.push(line);
        }

        let sale = Sale {
            id: sale_id,
            created_at: Utc::now(),
            total_cents: total.cents(),
            created_by: created_by.to_string(),
            lines: sale_lines,
        };

        sqlx::query("INSERT INTO sales (id, created_at, total_cents, created_by) VALUES (?, ?, ?, ?)")
            .bind(&sale.id)
            .bind(sale.created_at)
            .bind(sale.total_cents)
            .bind(&sale.created_by)
            .execute(&mut *tx)
            .await?;

        for (position, line) in sale.lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_lines (
                    id, sale_id, item_id, position, name_snapshot, quantity, price_at_sale_cents
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&line.id)
            .bind(&line.sale_id)
            .bind(&line.item_id)
            .bind(position as i64)
            .bind(&line.name_snapshot)
            .bind(line.quantity)
            .bind(line.price_at_sale_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(sale)
    }

    /// Gets a sale with its lines, or `SaleNotFound`.
    pub async fn get(&self, id: &str) -> DbResult<Sale> {
        debug!(id = %id, "Getting sale");

        let mut sale = sqlx::query_as::<_, Sale>(
            "SELECT id, created_at, total_cents, created_by FROM sales WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::from(CoreError::SaleNotFound(id.to_string())))?;

        sale.lines = self.get_lines(&sale.id).await?;
        Ok(sale)
    }

    /// Lists all sales newest first, each with its lines.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let mut sales = sqlx::query_as::<_, Sale>(
            "SELECT id, created_at, total_cents, created_by FROM sales \
             ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let lines = sqlx::query_as::<_, SaleLine>(&format!(
            "SELECT {SALE_LINE_COLUMNS} FROM sale_lines ORDER BY sale_id, position"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut by_sale: HashMap<String, Vec<SaleLine>> = HashMap::new();
        for line in lines {
            by_sale.entry(line.sale_id.clone()).or_default().push(line);
        }
        for sale in &mut sales {
            sale.lines = by_sale.remove(&sale.id).unwrap_or_default();
        }

        debug!(count = sales.len(), "Listed sales");
        Ok(sales)
    }

    /// Gets the lines of a sale in the order they were rung up.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(&format!(
            "SELECT {SALE_LINE_COLUMNS} FROM sale_lines WHERE sale_id = ? ORDER BY position"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Counts all sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
