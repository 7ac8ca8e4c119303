//! Request and response bodies of the HTTP interface.
//!
//! Domain types from `pharmos-core` are serialized as-is; these wrappers only
//! add what the wire format needs on top (derived status, envelopes).

use chrono::{DateTime, NaiveDate, Utc};
use pharmos_core::{Item, ItemStatus, Sale, SaleLineRequest, StatusPolicy, User};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An item together with its status as of today.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub status: ItemStatus,
}

impl ItemView {
    pub fn new(item: Item, today: NaiveDate, policy: &StatusPolicy) -> Self {
        let status = policy.classify_item(&item, today);
        ItemView { item, status }
    }
}

/// Query string of `GET /api/items`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListItemsQuery {
    /// Only items the POS may offer.
    #[serde(default)]
    pub sellable: bool,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub lines: Vec<SaleLineRequest>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct SaleResponse {
    pub sale: Sale,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
}

/// Body of `POST /api/auth/bootstrap`.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct DeletedResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
    pub database: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_view_is_flat() {
        let now = Utc::now();
        let item = Item {
            id: "i-1".to_string(),
            name: "Paracetamol 500mg".to_string(),
            description: None,
            price_buy_cents: 400,
            price_sell_cents: 650,
            stock: 3,
            expire_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            category: None,
            barcode: None,
            created_at: now,
            updated_at: now,
        };
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        let json = serde_json::to_value(ItemView::new(item, today, &StatusPolicy::default())).unwrap();
        assert_eq!(json["id"], "i-1");
        assert_eq!(json["priceSellCents"], 650);
        assert_eq!(json["expireDate"], "2030-01-01");
        assert_eq!(json["status"], "LowStock");
    }

    #[test]
    fn test_create_sale_request_shape() {
        let req: CreateSaleRequest =
            serde_json::from_str(r#"{"lines":[{"itemId":"a","quantity":2}]}"#).unwrap();
        assert_eq!(req.lines, vec![SaleLineRequest::new("a", 2)]);
    }
}
