use crate::{
    abstract_trait::payment::PaymentRepositoryTrait,
    domain::requests::payment::{NewPaymentRecord, NewRefundRecord},
    model::payment::Payment as PaymentModel,
};
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use tracing::{error, info};

const PAYMENT_COLUMNS: &str = r#"payment_id, payment_key, gateway_order_id, method, status,
total_amount, order_ref, requested_at, approved_at, created_at"#;

pub struct PaymentRepository {
    db: ConnectionPool,
}

impl PaymentRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PaymentRepositoryTrait for PaymentRepository {
    async fn find_by_payment_key(
        &self,
        payment_key: &str,
    ) -> Result<Option<PaymentModel>, RepositoryError> {
        let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payments WHERE payment_key = $1");

        sqlx::query_as::<_, PaymentModel>(&sql)
            .bind(payment_key)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch payment by key: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn find_by_order_ref(
        &self,
        order_id: i64,
        order_number: &str,
    ) -> Result<Option<PaymentModel>, RepositoryError> {
        let id_text = order_id.to_string();
        let sql = format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments \
             WHERE order_ref = $1 OR gateway_order_id = $1 \
                OR order_ref = $2 OR gateway_order_id = $2 \
             ORDER BY payment_id DESC \
             LIMIT 1"
        );

        sqlx::query_as::<_, PaymentModel>(&sql)
            .bind(&id_text)
            .bind(order_number)
            .fetch_optional(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch payment for order {order_id}: {e:?}");
                RepositoryError::from(e)
            })
    }

    async fn insert_payment(
        &self,
        rec: &NewPaymentRecord,
    ) -> Result<PaymentModel, RepositoryError> {
        let sql = format!(
            "INSERT INTO payments (payment_key, gateway_order_id, method, status, total_amount, \
                                   order_ref, requested_at, approved_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, current_timestamp) \
             RETURNING {PAYMENT_COLUMNS}"
        );

        let payment = sqlx::query_as::<_, PaymentModel>(&sql)
            .bind(&rec.payment_key)
            .bind(&rec.gateway_order_id)
            .bind(&rec.method)
            .bind(&rec.status)
            .bind(rec.total_amount)
            .bind(&rec.order_ref)
            .bind(rec.requested_at)
            .bind(rec.approved_at)
            .fetch_one(&self.db)
            .await
            .map_err(|e| {
                error!("❌ Failed to insert payment for order {}: {e:?}", rec.order_ref);
                RepositoryError::from(e)
            })?;

        info!("✅ Recorded payment for order {}", payment.order_ref);
        Ok(payment)
    }

    async fn update_payment_status(
        &self,
        payment_key: &str,
        status: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            UPDATE payments
            SET status = $2
            WHERE payment_key = $1
            "#,
        )
        .bind(payment_key)
        .bind(status)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to update payment status: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(())
    }

    async fn insert_refund_if_absent(
        &self,
        rec: &NewRefundRecord,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO refunds (refund_key, payment_key, amount, reason, status,
                                 requested_at, approved_at, created_at)
            SELECT $1, $2, $3, $4, $5, $6, $7, current_timestamp
            WHERE NOT EXISTS (
                SELECT 1 FROM refunds WHERE payment_key = $2
            )
            "#,
        )
        .bind(&rec.refund_key)
        .bind(&rec.payment_key)
        .bind(rec.amount)
        .bind(&rec.reason)
        .bind(&rec.status)
        .bind(rec.requested_at)
        .bind(rec.approved_at)
        .execute(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to insert refund record: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(result.rows_affected() > 0)
    }
}
