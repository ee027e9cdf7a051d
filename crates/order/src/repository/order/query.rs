use crate::{
    abstract_trait::order::repository::OrderQueryRepositoryTrait,
    model::order::{Order as OrderModel, OrderStatus},
};
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use tracing::error;

const ORDER_COLUMNS: &str = r#"order_id, member_id, order_number, receiver, postcode, addr_detail,
total_product_amount, shipping_fee, discount_fee, order_amount, status,
cancel_reason, paid_at, cancelled_at, refunded_at, created_at, updated_at, deleted_at"#;

pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_by_id(&self, order_id: i64) -> Result<Option<OrderModel>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 AND deleted_at IS NULL"
        );

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(order_id)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch order {order_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_number = $1 AND deleted_at IS NULL"
        );

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(order_number)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch order by number {order_number}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_member(&self, member_id: i64) -> Result<Vec<OrderModel>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE member_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at DESC"
        );

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(member_id)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch orders for member {member_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_seller_orders(
        &self,
        seller_id: i64,
        status: Option<OrderStatus>,
        page: i32,
        page_size: i32,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        let status_text = status.map(|s| s.as_str().to_string());
        let offset = ((page.max(1) - 1) as i64) * page_size as i64;

        let sql = format!(
            "SELECT DISTINCT o.order_id, o.member_id, o.order_number, o.receiver, o.postcode, \
                    o.addr_detail, o.total_product_amount, o.shipping_fee, o.discount_fee, \
                    o.order_amount, o.status, o.cancel_reason, o.paid_at, o.cancelled_at, \
                    o.refunded_at, o.created_at, o.updated_at, o.deleted_at \
             FROM orders o \
             JOIN order_items oi ON oi.order_id = o.order_id \
             WHERE o.deleted_at IS NULL \
               AND oi.deleted_at IS NULL \
               AND oi.seller_id = $1 \
               AND ($2::text IS NULL OR o.status = $2::text) \
             ORDER BY o.created_at DESC, o.order_id DESC \
             LIMIT $3 OFFSET $4"
        );

        let orders = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(seller_id)
            .bind(&status_text)
            .bind(page_size as i64)
            .bind(offset)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch orders for seller {seller_id}: {e:?}");
                RepositoryError::from(e)
            })?;

        let (total,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT o.order_id)
            FROM orders o
            JOIN order_items oi ON oi.order_id = o.order_id
            WHERE o.deleted_at IS NULL
              AND oi.deleted_at IS NULL
              AND oi.seller_id = $1
              AND ($2::text IS NULL OR o.status = $2::text)
            "#,
        )
        .bind(seller_id)
        .bind(&status_text)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to count orders for seller {seller_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok((orders, total))
    }
}
