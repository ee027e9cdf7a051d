use crate::abstract_trait::sales::SalesAggregatorTrait;
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use tracing::{error, info};

/// Recomputes per-seller sales totals from scratch for every seller with an
/// item on the given order. Refunded and cancelled orders no longer count, so
/// a refresh after a refund walks the totals back.
pub struct SalesAggregatorRepository {
    db: ConnectionPool,
}

impl SalesAggregatorRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SalesAggregatorTrait for SalesAggregatorRepository {
    async fn refresh_for_order(&self, order_id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO seller_sales (seller_id, total_sales, refreshed_at)
            SELECT affected.seller_id,
                   COALESCE((
                       SELECT SUM(oi.subtotal_price)
                       FROM order_items oi
                       JOIN orders o ON o.order_id = oi.order_id
                       WHERE oi.seller_id = affected.seller_id
                         AND oi.deleted_at IS NULL
                         AND o.deleted_at IS NULL
                         AND o.status IN ('PAID', 'COMPLETED', 'REFUND_REQUESTED', 'REFUND_REJECTED')
                   ), 0),
                   current_timestamp
            FROM (
                SELECT DISTINCT seller_id FROM order_items WHERE order_id = $1
            ) AS affected
            ON CONFLICT (seller_id) DO UPDATE
            SET total_sales = EXCLUDED.total_sales,
                refreshed_at = EXCLUDED.refreshed_at
            "#,
        )
        .bind(order_id)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to refresh sales aggregates for order {order_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        info!(
            "📊 Refreshed sales aggregates for {} seller(s) of order {order_id}",
            result.rows_affected()
        );
        Ok(())
    }
}
