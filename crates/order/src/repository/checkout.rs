use crate::{
    abstract_trait::checkout::{CheckoutTx, CheckoutTxFactory},
    domain::requests::order::{NewOrderItemRecord, NewOrderRecord},
    model::{
        order::Order as OrderModel, order_item::OrderItem as OrderItemModel,
        product::ProductStatus, product::StockRecord,
    },
};
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::{error, info};

pub struct PgCheckoutTxFactory {
    db: ConnectionPool,
}

impl PgCheckoutTxFactory {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CheckoutTxFactory for PgCheckoutTxFactory {
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, RepositoryError> {
        let tx = self.db.begin().await.map_err(RepositoryError::from)?;
        Ok(Box::new(PgCheckoutTx { tx }))
    }
}

/// All statements run on the one transaction held here; dropping the value
/// rolls back and releases every row lock.
pub struct PgCheckoutTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
    async fn lock_stock(
        &mut self,
        product_id: i64,
        required: ProductStatus,
    ) -> Result<Option<StockRecord>, RepositoryError> {
        let record = sqlx::query_as::<_, StockRecord>(
            r#"
            SELECT product_id, seller_id, product_name, price, stock_qty, status, deleted_at
            FROM products
            WHERE product_id = $1
              AND (status = $2 OR status = 'SOLD_OUT')
              AND deleted_at IS NULL
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .bind(required)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            error!("❌ Failed to lock stock for product {product_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(record)
    }

    async fn decrease_stock(
        &mut self,
        product_id: i64,
        quantity: i32,
    ) -> Result<i32, RepositoryError> {
        let remaining: Option<(i32,)> = sqlx::query_as(
            r#"
            UPDATE products
            SET stock_qty = stock_qty - $2,
                updated_at = current_timestamp
            WHERE product_id = $1 AND stock_qty >= $2
            RETURNING stock_qty
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| {
            error!("❌ Failed to decrease stock for product {product_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        match remaining {
            Some((qty,)) => Ok(qty),
            None => Err(RepositoryError::Conflict(format!(
                "insufficient stock: product_id={product_id}"
            ))),
        }
    }

    async fn mark_sold_out(&mut self, product_id: i64) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE products
            SET status = 'SOLD_OUT',
                updated_at = current_timestamp
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            error!("❌ Failed to mark product {product_id} sold out: {e:?}");
            RepositoryError::from(e)
        })?;

        info!("📦 Product {product_id} sold out");
        Ok(())
    }

    async fn insert_order(&mut self, rec: &NewOrderRecord) -> Result<OrderModel, RepositoryError> {
        let order = sqlx::query_as::<_, OrderModel>(
            r#"
            INSERT INTO orders (
                member_id, order_number, receiver, postcode, addr_detail,
                total_product_amount, shipping_fee, discount_fee, order_amount,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    current_timestamp, current_timestamp)
            RETURNING order_id, member_id, order_number, receiver, postcode, addr_detail,
                      total_product_amount, shipping_fee, discount_fee, order_amount,
                      status, cancel_reason, paid_at, cancelled_at, refunded_at,
                      created_at, updated_at, deleted_at
            "#,
        )
        .bind(rec.member_id)
        .bind(&rec.order_number)
        .bind(&rec.receiver)
        .bind(&rec.postcode)
        .bind(&rec.addr_detail)
        .bind(rec.total_product_amount)
        .bind(rec.shipping_fee)
        .bind(rec.discount_fee)
        .bind(rec.order_amount)
        .bind(rec.status)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            error!(
                "❌ Failed to insert order {} for member {}: {e:?}",
                rec.order_number, rec.member_id
            );
            RepositoryError::from(e)
        })?;

        info!(
            "✅ Inserted order {} (ID {})",
            order.order_number, order.order_id
        );
        Ok(order)
    }

    async fn insert_order_item(
        &mut self,
        rec: &NewOrderItemRecord,
    ) -> Result<OrderItemModel, RepositoryError> {
        let item = sqlx::query_as::<_, OrderItemModel>(
            r#"
            INSERT INTO order_items (
                order_id, product_id, seller_id, product_name,
                unit_price, quantity, subtotal_price, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, current_timestamp, current_timestamp)
            RETURNING order_item_id, order_id, product_id, seller_id, product_name,
                      unit_price, quantity, subtotal_price, created_at, updated_at, deleted_at
            "#,
        )
        .bind(rec.order_id)
        .bind(rec.product_id)
        .bind(rec.seller_id)
        .bind(&rec.product_name)
        .bind(rec.unit_price)
        .bind(rec.quantity)
        .bind(rec.subtotal_price)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            error!(
                "❌ Failed to insert order item for order {}: {e:?}",
                rec.order_id
            );
            RepositoryError::from(e)
        })?;

        Ok(item)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await.map_err(RepositoryError::from)
    }
}
