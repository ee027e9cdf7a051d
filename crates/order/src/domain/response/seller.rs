use crate::domain::response::order::OrderItemResponse;
use crate::model::{order::Order as OrderModel, order_item::OrderItem as OrderItemModel};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One order as a given seller is allowed to see it in a listing: order-level
/// status plus the count and first product name of *their own* items only.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SellerOrderSummaryResponse {
    pub id: i64,
    #[serde(rename = "order_number")]
    pub order_number: String,
    pub status: String,
    #[serde(rename = "item_count")]
    pub item_count: i64,
    #[serde(rename = "first_product_name")]
    pub first_product_name: Option<String>,
    #[serde(rename = "created_at")]
    pub created_at: Option<String>,
    #[serde(rename = "paid_at")]
    pub paid_at: Option<String>,
}

impl SellerOrderSummaryResponse {
    pub fn from_parts(
        order: &OrderModel,
        item_count: i64,
        first_product_name: Option<String>,
    ) -> Self {
        SellerOrderSummaryResponse {
            id: order.order_id,
            order_number: order.order_number.clone(),
            status: order.status.to_string(),
            item_count,
            first_product_name,
            created_at: order.created_at.map(|dt| dt.to_string()),
            paid_at: order.paid_at.map(|dt| dt.to_string()),
        }
    }
}

/// Detail view restricted to the requesting seller's own line items. Amounts
/// of other sellers sharing the order are never exposed.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SellerOrderDetailResponse {
    pub id: i64,
    #[serde(rename = "order_number")]
    pub order_number: String,
    pub status: String,
    pub receiver: String,
    pub postcode: String,
    #[serde(rename = "addr_detail")]
    pub addr_detail: String,
    #[serde(rename = "paid_at")]
    pub paid_at: Option<String>,
    #[serde(rename = "cancelled_at")]
    pub cancelled_at: Option<String>,
    #[serde(rename = "refunded_at")]
    pub refunded_at: Option<String>,
    #[serde(rename = "created_at")]
    pub created_at: Option<String>,
    pub items: Vec<OrderItemResponse>,
}

impl SellerOrderDetailResponse {
    pub fn from_parts(order: OrderModel, items: Vec<OrderItemModel>) -> Self {
        SellerOrderDetailResponse {
            id: order.order_id,
            order_number: order.order_number,
            status: order.status.to_string(),
            receiver: order.receiver,
            postcode: order.postcode,
            addr_detail: order.addr_detail,
            paid_at: order.paid_at.map(|dt| dt.to_string()),
            cancelled_at: order.cancelled_at.map(|dt| dt.to_string()),
            refunded_at: order.refunded_at.map(|dt| dt.to_string()),
            created_at: order.created_at.map(|dt| dt.to_string()),
            items: items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}
