use async_trait::async_trait;
use chrono::NaiveDateTime;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;

/// Status mutations on the order row. Every method is a single conditional
/// update keyed on the current status (and owner where the caller is a buyer)
/// and reports rows affected; zero rows means the state moved concurrently
/// and the caller must re-read and decide. Reasons and lifecycle timestamps
/// are only written where still unset, so the first request wins.
#[async_trait]
pub trait OrderCommandRepositoryTrait {
    /// `CREATED -> CANCELLED` for an order the member owns.
    async fn cancel_created_order(
        &self,
        order_id: i64,
        member_id: i64,
        reason: &str,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError>;

    /// `PAID -> REFUND_REQUESTED` for an order the member owns.
    async fn request_refund_for_paid_order(
        &self,
        order_id: i64,
        member_id: i64,
        reason: &str,
    ) -> Result<u64, RepositoryError>;

    /// `REFUND_REQUESTED -> REFUNDED` after the gateway confirmed the refund.
    async fn approve_refund_request(
        &self,
        order_id: i64,
        member_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError>;

    /// `CREATED -> PAID` after the gateway confirmed the payment.
    async fn mark_paid_order(
        &self,
        order_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError>;

    /// Soft-deletes a still-`CREATED` order and its items in one transaction.
    async fn abandon_created_order(
        &self,
        order_id: i64,
        member_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError>;
}
