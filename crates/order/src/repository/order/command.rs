use crate::abstract_trait::order::repository::OrderCommandRepositoryTrait;
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{error, info};

/// Conditional status writes on the order row. Each statement carries the
/// expected current status in its WHERE clause, so a concurrent duplicate
/// request can never double-apply; the caller inspects rows-affected.
/// `COALESCE` keeps the first cancel reason and the first lifecycle timestamp.
pub struct OrderCommandRepository {
    db: ConnectionPool,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn cancel_created_order(
        &self,
        order_id: i64,
        member_id: i64,
        reason: &str,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'CANCELLED',
                cancel_reason = COALESCE(cancel_reason, $3),
                cancelled_at = COALESCE(cancelled_at, $4),
                updated_at = current_timestamp
            WHERE order_id = $1
              AND member_id = $2
              AND deleted_at IS NULL
              AND status = 'CREATED'
            "#,
        )
        .bind(order_id)
        .bind(member_id)
        .bind(reason)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to cancel created order {order_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn request_refund_for_paid_order(
        &self,
        order_id: i64,
        member_id: i64,
        reason: &str,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'REFUND_REQUESTED',
                cancel_reason = COALESCE(cancel_reason, $3),
                updated_at = current_timestamp
            WHERE order_id = $1
              AND member_id = $2
              AND deleted_at IS NULL
              AND status = 'PAID'
            "#,
        )
        .bind(order_id)
        .bind(member_id)
        .bind(reason)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to request refund for order {order_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn approve_refund_request(
        &self,
        order_id: i64,
        member_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'REFUNDED',
                refunded_at = COALESCE(refunded_at, $3),
                updated_at = current_timestamp
            WHERE order_id = $1
              AND member_id = $2
              AND deleted_at IS NULL
              AND status = 'REFUND_REQUESTED'
            "#,
        )
        .bind(order_id)
        .bind(member_id)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to approve refund for order {order_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        if result.rows_affected() > 0 {
            info!("💸 Order {order_id} refunded");
        }
        Ok(result.rows_affected())
    }

    async fn mark_paid_order(
        &self,
        order_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = 'PAID',
                paid_at = COALESCE(paid_at, $2),
                updated_at = current_timestamp
            WHERE order_id = $1
              AND deleted_at IS NULL
              AND status = 'CREATED'
            "#,
        )
        .bind(order_id)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to mark order {order_id} paid: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn abandon_created_order(
        &self,
        order_id: i64,
        member_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET deleted_at = $3,
                updated_at = current_timestamp
            WHERE order_id = $1
              AND member_id = $2
              AND deleted_at IS NULL
              AND status = 'CREATED'
            "#,
        )
        .bind(order_id)
        .bind(member_id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("❌ Failed to abandon order {order_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        if result.rows_affected() > 0 {
            sqlx::query(
                r#"
                UPDATE order_items
                SET deleted_at = $2,
                    updated_at = current_timestamp
                WHERE order_id = $1
                  AND deleted_at IS NULL
                "#,
            )
            .bind(order_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to abandon items of order {order_id}: {e:?}");
                RepositoryError::from(e)
            })?;
        }

        tx.commit().await.map_err(RepositoryError::from)?;
        Ok(result.rows_affected())
    }
}
