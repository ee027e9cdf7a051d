use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Order lifecycle status, stored as TEXT.
///
/// Transitions are closed over `can_transition_to`; repositories enforce the
/// same guards with conditional `UPDATE ... WHERE status = ...` statements so
/// no code path can write a status the table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    Paid,
    CancelRequested,
    Cancelled,
    Completed,
    RefundRequested,
    RefundRejected,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 8] = [
        OrderStatus::Created,
        OrderStatus::Paid,
        OrderStatus::CancelRequested,
        OrderStatus::Cancelled,
        OrderStatus::Completed,
        OrderStatus::RefundRequested,
        OrderStatus::RefundRejected,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::Paid => "PAID",
            OrderStatus::CancelRequested => "CANCEL_REQUESTED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::RefundRequested => "REFUND_REQUESTED",
            OrderStatus::RefundRejected => "REFUND_REJECTED",
            OrderStatus::Refunded => "REFUNDED",
        }
    }

    /// The guard table. Everything not listed here is an invalid transition.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        matches!(
            (self, next),
            (Created, Paid)
                | (Created, CancelRequested)
                | (Paid, RefundRequested)
                | (CancelRequested, Cancelled)
                | (RefundRequested, Refunded)
                | (RefundRequested, RefundRejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Cancelled | OrderStatus::Completed | OrderStatus::Refunded
        )
    }

    /// States in which a cancel/refund request is already satisfied; a retry
    /// must answer with the current state instead of an error.
    pub fn is_cancel_finalized(self) -> bool {
        matches!(self, OrderStatus::Cancelled | OrderStatus::Refunded)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(OrderStatus::Created),
            "PAID" => Ok(OrderStatus::Paid),
            "CANCEL_REQUESTED" => Ok(OrderStatus::CancelRequested),
            "CANCELLED" => Ok(OrderStatus::Cancelled),
            "COMPLETED" => Ok(OrderStatus::Completed),
            "REFUND_REQUESTED" => Ok(OrderStatus::RefundRequested),
            "REFUND_REJECTED" => Ok(OrderStatus::RefundRejected),
            "REFUNDED" => Ok(OrderStatus::Refunded),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for OrderStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <&str as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for OrderStatus {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        text.parse::<OrderStatus>().map_err(Into::into)
    }
}

/// Order header row. Money fields and the shipping snapshot are fixed at
/// creation and never recomputed; `order_amount = total_product_amount +
/// shipping_fee - discount_fee` holds for every persisted row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub order_id: i64,
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
    pub cancel_reason: Option<String>,
    pub paid_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub refunded_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

impl Order {
    pub fn amount_invariant_holds(&self) -> bool {
        self.order_amount == self.total_product_amount + self.shipping_fee - self.discount_fee
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed_pairs() -> Vec<(OrderStatus, OrderStatus)> {
        use OrderStatus::*;
        vec![
            (Created, Paid),
            (Created, CancelRequested),
            (Paid, RefundRequested),
            (CancelRequested, Cancelled),
            (RefundRequested, Refunded),
            (RefundRequested, RefundRejected),
        ]
    }

    #[test]
    fn guard_table_is_total() {
        let allowed = allowed_pairs();
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                let expected = allowed.contains(&(from, to));
                assert_eq!(
                    from.can_transition_to(to),
                    expected,
                    "transition {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn terminal_states_admit_no_transition() {
        for from in [
            OrderStatus::Cancelled,
            OrderStatus::Completed,
            OrderStatus::Refunded,
        ] {
            for to in OrderStatus::ALL {
                assert!(!from.can_transition_to(to), "{from} must be terminal");
            }
        }
    }

    #[test]
    fn status_round_trips_through_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("SHIPPED".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn cancel_finalized_covers_both_money_paths() {
        assert!(OrderStatus::Cancelled.is_cancel_finalized());
        assert!(OrderStatus::Refunded.is_cancel_finalized());
        assert!(!OrderStatus::RefundRequested.is_cancel_finalized());
        assert!(!OrderStatus::Completed.is_cancel_finalized());
    }
}
