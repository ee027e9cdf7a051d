use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynPriceResolver = Arc<dyn PriceResolverTrait + Send + Sync>;

/// Effective unit price for a product: an active live-sale override when one
/// exists, otherwise the catalog price. `NotFound` when the product is gone.
#[async_trait]
pub trait PriceResolverTrait {
    async fn current_price(&self, product_id: i64) -> Result<i64, RepositoryError>;
}
