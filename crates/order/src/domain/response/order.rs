use crate::model::{order::Order as OrderModel, order_item::OrderItem as OrderItemModel};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CreateOrderResponse {
    pub id: i64,
    #[serde(rename = "order_number")]
    pub order_number: String,
    pub status: String,
    #[serde(rename = "order_amount")]
    pub order_amount: i64,
}

impl From<OrderModel> for CreateOrderResponse {
    fn from(value: OrderModel) -> Self {
        CreateOrderResponse {
            id: value.order_id,
            order_number: value.order_number,
            status: value.status.to_string(),
            order_amount: value.order_amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderSummaryResponse {
    pub id: i64,
    #[serde(rename = "order_number")]
    pub order_number: String,
    pub status: String,
    #[serde(rename = "total_product_amount")]
    pub total_product_amount: i64,
    #[serde(rename = "order_amount")]
    pub order_amount: i64,
    #[serde(rename = "created_at")]
    pub created_at: Option<String>,
}

impl From<OrderModel> for OrderSummaryResponse {
    fn from(value: OrderModel) -> Self {
        OrderSummaryResponse {
            id: value.order_id,
            order_number: value.order_number,
            status: value.status.to_string(),
            total_product_amount: value.total_product_amount,
            order_amount: value.order_amount,
            created_at: value.created_at.map(|dt| dt.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderItemResponse {
    pub id: i64,
    #[serde(rename = "product_id")]
    pub product_id: i64,
    #[serde(rename = "product_name")]
    pub product_name: String,
    #[serde(rename = "unit_price")]
    pub unit_price: i64,
    pub quantity: i32,
    pub subtotal: i64,
}

impl From<OrderItemModel> for OrderItemResponse {
    fn from(value: OrderItemModel) -> Self {
        OrderItemResponse {
            id: value.order_item_id,
            product_id: value.product_id,
            product_name: value.product_name,
            unit_price: value.unit_price,
            quantity: value.quantity,
            subtotal: value.subtotal_price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderDetailResponse {
    pub id: i64,
    #[serde(rename = "order_number")]
    pub order_number: String,
    pub status: String,
    pub receiver: String,
    pub postcode: String,
    #[serde(rename = "addr_detail")]
    pub addr_detail: String,
    #[serde(rename = "total_product_amount")]
    pub total_product_amount: i64,
    #[serde(rename = "shipping_fee")]
    pub shipping_fee: i64,
    #[serde(rename = "discount_fee")]
    pub discount_fee: i64,
    #[serde(rename = "order_amount")]
    pub order_amount: i64,
    #[serde(rename = "cancel_reason")]
    pub cancel_reason: Option<String>,
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

impl OrderDetailResponse {
    pub fn from_parts(order: OrderModel, items: Vec<OrderItemModel>) -> Self {
        OrderDetailResponse {
            id: order.order_id,
            order_number: order.order_number,
            status: order.status.to_string(),
            receiver: order.receiver,
            postcode: order.postcode,
            addr_detail: order.addr_detail,
            total_product_amount: order.total_product_amount,
            shipping_fee: order.shipping_fee,
            discount_fee: order.discount_fee,
            order_amount: order.order_amount,
            cancel_reason: order.cancel_reason,
            paid_at: order.paid_at.map(|dt| dt.to_string()),
            cancelled_at: order.cancelled_at.map(|dt| dt.to_string()),
            refunded_at: order.refunded_at.map(|dt| dt.to_string()),
            created_at: order.created_at.map(|dt| dt.to_string()),
            items: items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderCancelResponse {
    pub id: i64,
    pub status: String,
}

impl From<OrderModel> for OrderCancelResponse {
    fn from(value: OrderModel) -> Self {
        OrderCancelResponse {
            id: value.order_id,
            status: value.status.to_string(),
        }
    }
}
