use crate::abstract_trait::seller::SellerVerifierTrait;
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use tracing::error;

pub struct SellerVerifierRepository {
    db: ConnectionPool,
}

impl SellerVerifierRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SellerVerifierTrait for SellerVerifierRepository {
    async fn is_active(&self, seller_id: i64) -> Result<bool, RepositoryError> {
        let (active,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM sellers
                WHERE seller_id = $1 AND status = 'ACTIVE' AND deleted_at IS NULL
            )
            "#,
        )
        .bind(seller_id)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed seller status probe for {seller_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        Ok(active)
    }
}
