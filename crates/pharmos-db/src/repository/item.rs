//! # Item Repository
//!
//! The item catalog: reads, administrative CRUD and the atomic stock
//! decrement used by the sale transaction.
//!
//! ## Atomic Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE items SET stock = stock - :qty                                 │
//! │   WHERE id = :id AND stock >= :qty                                     │
//! │  RETURNING id, name, price_sell_cents, stock                           │
//! │       │                                                                 │
//! │       ├── 1 row  → decremented; price and name come from the same row  │
//! │       │                                                                 │
//! │       └── 0 rows → SELECT stock WHERE id = :id                         │
//! │                     ├── no row  → NotFound                             │
//! │                     └── row     → InsufficientStock { available }      │
//! │                                                                         │
//! │  Check and write are one statement: two sales reading stock=5 can      │
//! │  never both take 5.                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use pharmos_core::validation::{validate_new_item, validate_quantity};
use pharmos_core::{CoreError, Item, ItemPatch, NewItem, StatusPolicy, ValidationError};

const ITEM_COLUMNS: &str = "id, name, description, price_buy_cents, price_sell_cents, stock, \
                            expire_date, category, barcode, created_at, updated_at";

/// The row touched by a successful conditional decrement.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StockDecrement {
    pub id: String,
    pub name: String,
    pub price_sell_cents: i64,
    /// Stock left after the decrement.
    pub stock: i64,
}

/// Repository for item catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ItemRepository::new(pool);
///
/// let item = repo.get("uuid-here").await?;
/// let pos_items = repo.list_sellable(today, &StatusPolicy::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ItemRepository {
    pool: SqlitePool,
}

impl ItemRepository {
    /// Creates a new ItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ItemRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets an item by id, or `NotFound`.
    pub async fn get(&self, id: &str) -> DbResult<Item> {
        self.find(id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(id.to_string()).into())
    }

    /// Gets an item by id if it exists.
    pub async fn find(&self, id: &str) -> DbResult<Option<Item>> {
        debug!(id = %id, "Getting item");

        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists all items ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY name COLLATE NOCASE, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = items.len(), "Listed items");
        Ok(items)
    }

    /// Lists the items the POS may offer: status `Valid` under `policy`.
    pub async fn list_sellable(
        &self,
        today: NaiveDate,
        policy: &StatusPolicy,
    ) -> DbResult<Vec<Item>> {
        let items = self
            .list()
            .await?
            .into_iter()
            .filter(|item| policy.classify_item(item, today).is_sellable())
            .collect::<Vec<_>>();

        debug!(count = items.len(), %today, "Listed sellable items");
        Ok(items)
    }

    /// Counts all items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Creates an item after validating every field.
    pub async fn create(&self, new: &NewItem) -> DbResult<Item> {
        let new = new.normalized();
        validate_new_item(&new)?;

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            description: new.description.clone(),
            price_buy_cents: new.price_buy_cents,
            price_sell_cents: new.price_sell_cents,
            stock: new.stock,
            expire_date: new.expire_date,
            category: new.category.clone(),
            barcode: new.barcode.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Creating item");

        sqlx::query(
            r#"
            INSERT INTO items (
                id, name, description, price_buy_cents, price_sell_cents, stock,
                expire_date, category, barcode, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_buy_cents)
        .bind(item.price_sell_cents)
        .bind(item.stock)
        .bind(item.expire_date)
        .bind(&item.category)
        .bind(&item.barcode)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| barcode_conflict(e.into(), item.barcode.as_deref()))?;

        Ok(item)
    }

    /// Applies a partial update and returns the merged item.
    ///
    /// The first statement is a write, so the row is locked against
    /// concurrent sales between reading the current values and writing the
    /// merged ones.
    pub async fn update(&self, id: &str, patch: &ItemPatch) -> DbResult<Item> {
        debug!(id = %id, "Updating item");

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Item>(&format!(
            "UPDATE items SET updated_at = ? WHERE id = ? RETURNING {ITEM_COLUMNS}"
        ))
        .bind(now)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::from(CoreError::ItemNotFound(id.to_string())))?;

        let merged = patch.merge_into(&current).normalized();
        validate_new_item(&merged)?;

        let barcode = merged.barcode.clone();
        let item = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items SET
                name = ?, description = ?, price_buy_cents = ?, price_sell_cents = ?,
                stock = ?, expire_date = ?, category = ?, barcode = ?, updated_at = ?
            WHERE id = ?
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(&merged.name)
        .bind(&merged.description)
        .bind(merged.price_buy_cents)
        .bind(merged.price_sell_cents)
        .bind(merged.stock)
        .bind(merged.expire_date)
        .bind(&merged.category)
        .bind(&barcode)
        .bind(now)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| barcode_conflict(e.into(), barcode.as_deref()))?;

        tx.commit().await?;
        Ok(item)
    }

    /// Deletes an item. Sale lines that referenced it keep their snapshot.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ItemNotFound(id.to_string()).into());
        }

        Ok(())
    }

    /// Atomically takes `quantity` units from stock, on its own connection.
    pub async fn decrement_stock(&self, id: &str, quantity: i64) -> DbResult<StockDecrement> {
        let mut conn = self.pool.acquire().await?;
        decrement_stock_in(&mut conn, id, quantity).await
    }
}

/// Conditional decrement on an already-acquired connection or open
/// transaction. This is the only stock-mutating path the sale transaction
/// uses.
pub async fn decrement_stock_in(
    conn: &mut SqliteConnection,
    id: &str,
    quantity: i64,
) -> DbResult<StockDecrement> {
    validate_quantity(quantity)?;

    let decremented = sqlx::query_as::<_, StockDecrement>(
        r#"
        UPDATE items SET stock = stock - ?1, updated_at = ?2
        WHERE id = ?3 AND stock >= ?1
        RETURNING id, name, price_sell_cents, stock
        "#,
    )
    .bind(quantity)
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(row) = decremented {
        debug!(id = %id, quantity, remaining = row.stock, "Decremented stock");
        return Ok(row);
    }

    // Zero rows: tell a missing item apart from a short one
    let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM items WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    match available {
        None => Err(CoreError::ItemNotFound(id.to_string()).into()),
        Some(available) => Err(CoreError::InsufficientStock {
            item_id: id.to_string(),
            available,
            requested: quantity,
        }
        .into()),
    }
}

fn barcode_conflict(err: DbError, barcode: Option<&str>) -> DbError {
    if err.is_unique_violation_on("barcode") {
        ValidationError::Duplicate {
            field: "barcode".to_string(),
            value: barcode.unwrap_or_default().to_string(),
        }
        .into()
    } else {
        err
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
