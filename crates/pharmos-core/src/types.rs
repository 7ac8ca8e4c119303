//! # Domain Types
//!
//! Core domain types used throughout Pharmos.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Item       │   │      Sale       │   │    SaleLine     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name           │   │  created_at     │   │  sale_id (FK)   │       │
//! │  │  price_sell     │   │  total_cents    │   │  item_id (FK?)  │       │
//! │  │  stock ≥ 0      │   │  created_by     │   │  name_snapshot  │       │
//! │  │  expire_date    │   │  lines ─────────┼──►│  price_at_sale  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │      User       │   │ SaleLineRequest │  (what the POS submits)      │
//! │  │  id, name       │   │  item_id        │                              │
//! │  │  email, role    │   │  quantity       │  no price: server-resolved   │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A sale line freezes the item's name and selling price at the moment of
//! sale. Repricing or deleting the item later never changes a recorded sale.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::access::Role;
use crate::money::Money;

// =============================================================================
// Item
// =============================================================================

/// One inventory SKU.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown on the POS and on receipts.
    pub name: String,

    pub description: Option<String>,

    /// Purchase price in cents.
    pub price_buy_cents: i64,

    /// Selling price in cents. Snapshotted onto each sale line.
    pub price_sell_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    #[ts(as = "String")]
    pub expire_date: NaiveDate,

    pub category: Option<String>,

    /// Barcode (EAN-13 etc.), unique when present.
    pub barcode: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price_buy_cents: i64,
    pub price_sell_cents: i64,
    pub stock: i64,
    #[ts(as = "String")]
    pub expire_date: NaiveDate,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
}

impl NewItem {
    /// Trims text fields; blank optional fields become `None`.
    ///
    /// Forms post empty strings for fields left blank.
    pub fn normalized(&self) -> NewItem {
        fn optional(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        NewItem {
            name: self.name.trim().to_string(),
            description: optional(&self.description),
            category: optional(&self.category),
            barcode: optional(&self.barcode),
            ..self.clone()
        }
    }
}

/// Partial update of an item. Absent fields keep their current value.
///
/// For `description`, `category` and `barcode` an empty string clears the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_buy_cents: Option<i64>,
    pub price_sell_cents: Option<i64>,
    pub stock: Option<i64>,
    #[ts(as = "Option<String>")]
    pub expire_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub barcode: Option<String>,
}

impl ItemPatch {
    /// Applies the patch to a copy of `item`, producing the merged fields.
    ///
    /// The result goes through the same validation as a new item.
    pub fn merge_into(&self, item: &Item) -> NewItem {
        fn clearable(patch: &Option<String>, current: &Option<String>) -> Option<String> {
            match patch {
                Some(value) if value.trim().is_empty() => None,
                Some(value) => Some(value.clone()),
                None => current.clone(),
            }
        }

        NewItem {
            name: self.name.clone().unwrap_or_else(|| item.name.clone()),
            description: clearable(&self.description, &item.description),
            price_buy_cents: self.price_buy_cents.unwrap_or(item.price_buy_cents),
            price_sell_cents: self.price_sell_cents.unwrap_or(item.price_sell_cents),
            stock: self.stock.unwrap_or(item.stock),
            expire_date: self.expire_date.unwrap_or(item.expire_date),
            category: clearable(&self.category, &item.category),
            barcode: clearable(&self.barcode, &item.barcode),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable record of a completed multi-line sale.
///
/// `total_cents == Σ(line.quantity × line.price_at_sale_cents)` at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub total_cents: i64,
    /// Id of the user who rang up the sale.
    pub created_by: String,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub lines: Vec<SaleLine>,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Recomputes the total from the lines.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(SaleLine::line_total).sum()
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// One item within a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    /// `None` once the referenced item has been deleted.
    pub item_id: Option<String>,
    /// Item name at time of sale (frozen).
    pub name_snapshot: String,
    pub quantity: i64,
    /// Selling price in cents at time of sale (frozen).
    pub price_at_sale_cents: i64,
}

impl SaleLine {
    #[inline]
    pub fn price_at_sale(&self) -> Money {
        Money::from_cents(self.price_at_sale_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.price_at_sale() * self.quantity
    }
}

/// A line as submitted by the POS: which item and how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub item_id: String,
    pub quantity: i64,
}

impl SaleLineRequest {
    pub fn new(item_id: impl Into<String>, quantity: i64) -> Self {
        SaleLineRequest {
            item_id: item_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A back-office account. The password hash never leaves pharmos-db.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields for creating a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Partial update of a user account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
