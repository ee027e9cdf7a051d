use crate::abstract_trait::pricing::PriceResolverTrait;
use shared::{config::ConnectionPool, errors::RepositoryError};

use async_trait::async_trait;
use tracing::error;

/// Live-sale price override with catalog fallback. During a live broadcast a
/// product can carry a temporary sale price; outside one, the catalog price
/// applies.
pub struct LiveSalePriceResolver {
    db: ConnectionPool,
}

impl LiveSalePriceResolver {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PriceResolverTrait for LiveSalePriceResolver {
    async fn current_price(&self, product_id: i64) -> Result<i64, RepositoryError> {
        let live: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT sale_price
            FROM live_sale_prices
            WHERE product_id = $1 AND active
            ORDER BY live_sale_price_id DESC
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch live price for product {product_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        if let Some((price,)) = live {
            return Ok(price);
        }

        let catalog: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT price FROM products
            WHERE product_id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch catalog price for product {product_id}: {e:?}");
            RepositoryError::from(e)
        })?;

        match catalog {
            Some((price,)) => Ok(price),
            None => Err(RepositoryError::NotFound),
        }
    }
}
