use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Body posted by the storefront after the gateway's client-side widget
/// finishes. `order_id` is the gateway-facing order reference and may be
/// either the internal id or the external order number.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, ToSchema)]
pub struct ConfirmPaymentRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "payment_key")]
    pub payment_key: String,

    #[validate(length(min = 1))]
    #[serde(rename = "order_id")]
    pub order_id: String,

    pub amount: i64,
}

/// Persistence-shaped payment record built from a successful gateway confirm.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewPaymentRecord {
    pub payment_key: String,
    pub gateway_order_id: String,
    pub method: Option<String>,
    pub status: String,
    pub total_amount: i64,
    pub order_ref: String,
    pub requested_at: Option<chrono::NaiveDateTime>,
    pub approved_at: Option<chrono::NaiveDateTime>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct NewRefundRecord {
    pub refund_key: String,
    pub payment_key: String,
    pub amount: i64,
    pub reason: String,
    pub status: String,
    pub requested_at: Option<chrono::NaiveDateTime>,
    pub approved_at: Option<chrono::NaiveDateTime>,
}
