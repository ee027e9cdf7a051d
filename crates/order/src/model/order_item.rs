use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Order line item. `product_name`, `unit_price` and `seller_id` are value
/// snapshots taken at order time so later catalog edits never rewrite history.
/// Rows are insert-only; the only mutation is the soft-delete marker, set in
/// lockstep with the parent order's abandonment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub order_item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub seller_id: i64,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub subtotal_price: i64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}
