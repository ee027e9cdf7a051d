use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Gateway payment record, written once per successful confirm. `payment_key`
/// is gateway-issued and unique; a confirm retry that finds an existing row
/// replays the stored result instead of calling out again.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub payment_id: i64,
    pub payment_key: String,
    pub gateway_order_id: String,
    pub method: Option<String>,
    pub status: String,
    pub total_amount: i64,
    pub order_ref: String,
    pub requested_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

impl Payment {
    /// Gateway-side cancellation already happened; skip the cancel call.
    pub fn is_already_cancelled(&self) -> bool {
        self.status.eq_ignore_ascii_case("CANCELED")
            || self.status.eq_ignore_ascii_case("CANCELLED")
            || self.status.eq_ignore_ascii_case("PARTIAL_CANCELED")
    }
}

/// Gateway refund record, at most one per payment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Refund {
    pub refund_id: i64,
    pub refund_key: String,
    pub payment_key: String,
    pub amount: i64,
    pub reason: String,
    pub status: String,
    pub requested_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}
