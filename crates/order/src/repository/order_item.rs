use crate::{
    abstract_trait::order_item::OrderItemQueryRepositoryTrait,
    model::order_item::OrderItem as OrderItemModel,
};
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use tracing::error;

const ITEM_COLUMNS: &str = r#"order_item_id, order_id, product_id, seller_id, product_name,
unit_price, quantity, subtotal_price, created_at, updated_at, deleted_at"#;

pub struct OrderItemQueryRepository {
    db: ConnectionPool,
}

impl OrderItemQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderItemQueryRepositoryTrait for OrderItemQueryRepository {
    async fn find_by_order(&self, order_id: i64) -> Result<Vec<OrderItemModel>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items \
             WHERE order_id = $1 AND deleted_at IS NULL \
             ORDER BY order_item_id ASC"
        );

        sqlx::query_as::<_, OrderItemModel>(&sql)
            .bind(order_id)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch items for order {order_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_order_for_seller(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<Vec<OrderItemModel>, RepositoryError> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items \
             WHERE order_id = $1 AND seller_id = $2 AND deleted_at IS NULL \
             ORDER BY order_item_id ASC"
        );

        sqlx::query_as::<_, OrderItemModel>(&sql)
            .bind(order_id)
            .bind(seller_id)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch seller {seller_id} items for order {order_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_orders_for_seller(
        &self,
        order_ids: &[i64],
        seller_id: i64,
    ) -> Result<Vec<OrderItemModel>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items \
             WHERE order_id = ANY($1) AND seller_id = $2 AND deleted_at IS NULL \
             ORDER BY order_item_id ASC"
        );

        sqlx::query_as::<_, OrderItemModel>(&sql)
            .bind(order_ids)
            .bind(seller_id)
            .fetch_all(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch seller {seller_id} items for order batch: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn exists_for_seller(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<bool, RepositoryError> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM order_items
                WHERE order_id = $1 AND seller_id = $2 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(order_id)
        .bind(seller_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed ownership probe for order {order_id}, seller {seller_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(exists)
    }
}
