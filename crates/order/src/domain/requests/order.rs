use crate::model::order::OrderStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
pub struct CreateOrderItemRequest {
    #[validate(range(min = 1))]
    #[serde(rename = "product_id")]
    pub product_id: i64,

    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1))]
    pub items: Vec<CreateOrderItemRequest>,

    pub receiver: String,

    pub postcode: String,

    #[serde(rename = "addr_detail")]
    pub addr_detail: String,

    /// Offer the shipping snapshot to the caller's address book after the
    /// order is committed. Best-effort only.
    #[serde(default, rename = "save_as_default")]
    pub save_as_default: bool,
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
pub struct OrderCancelRequest {
    #[validate(length(min = 1))]
    pub reason: String,
}

fn default_page() -> i32 {
    1
}

fn default_page_size() -> i32 {
    10
}

#[derive(Debug, Serialize, Deserialize, Validate, Clone, IntoParams)]
pub struct FindSellerOrders {
    /// Optional status filter, e.g. `PAID` or `REFUND_REQUESTED`.
    pub status: Option<String>,

    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: i32,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_page_size", rename = "page_size")]
    pub page_size: i32,
}

/// Persistence-shaped order record, produced by the creation service once all
/// snapshot amounts are fixed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewOrderRecord {
    pub member_id: i64,
    pub order_number: String,
    pub receiver: String,
    pub postcode: String,
    pub addr_detail: String,
    pub total_product_amount: i64,
    pub shipping_fee: i64,
    pub discount_fee: i64,
    pub order_amount: i64,
    pub status: OrderStatus,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewOrderItemRecord {
    pub order_id: i64,
    pub product_id: i64,
    pub seller_id: i64,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
    pub subtotal_price: i64,
}
