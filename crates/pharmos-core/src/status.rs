//! # Item Status Classification
//!
//! Derives the business status of an inventory item from its stock level
//! and expiry date.
//!
//! ## Rule (fixed priority order)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. expire_date <  today            → Expired                           │
//! │  2. stock       <= low threshold    → LowStock   (default threshold 5) │
//! │  3. otherwise                       → Valid                             │
//! │                                                                         │
//! │  Expired wins over LowStock: an expired item with zero stock is        │
//! │  reported Expired.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only `Valid` items are offered on the POS line-item picker.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::Item;
use crate::DEFAULT_LOW_STOCK_THRESHOLD;

/// Display/business status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ItemStatus {
    Valid,
    LowStock,
    Expired,
}

impl ItemStatus {
    /// Whether the POS may offer this item.
    #[inline]
    pub const fn is_sellable(&self) -> bool {
        matches!(self, ItemStatus::Valid)
    }
}

/// Tunable constants of the classification rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPolicy {
    /// Stock at or below this value is `LowStock`.
    pub low_stock_threshold: i64,

    /// When true, an item expiring today is already `Expired`
    /// (`<=` instead of the default strict `<`).
    pub expired_on_expiry_day: bool,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        StatusPolicy {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            expired_on_expiry_day: false,
        }
    }
}

impl StatusPolicy {
    /// Classifies an item against `today`.
    pub fn classify_item(&self, item: &Item, today: NaiveDate) -> ItemStatus {
        classify(item.stock, item.expire_date, today, self)
    }

    fn is_expired(&self, expire_date: NaiveDate, today: NaiveDate) -> bool {
        if self.expired_on_expiry_day {
            expire_date <= today
        } else {
            expire_date < today
        }
    }
}

/// Classifies a stock level and expiry date.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use pharmos_core::status::{classify, ItemStatus, StatusPolicy};
///
/// let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
/// let yesterday = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
///
/// // Expiry takes precedence over stock
/// assert_eq!(classify(0, yesterday, today, &StatusPolicy::default()), ItemStatus::Expired);
/// ```
pub fn classify(
    stock: i64,
    expire_date: NaiveDate,
    today: NaiveDate,
    policy: &StatusPolicy,
) -> ItemStatus {
    if policy.is_expired(expire_date, today) {
        ItemStatus::Expired
    } else if stock <= policy.low_stock_threshold {
        ItemStatus::LowStock
    } else {
        ItemStatus::Valid
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
