use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynSalesAggregator = Arc<dyn SalesAggregatorTrait + Send + Sync>;

/// Recomputes derived sales aggregates for the sellers whose items appear on
/// the given order. Invoked best-effort after a refund reverses previously
/// counted sales; failures are logged, never propagated.
#[async_trait]
pub trait SalesAggregatorTrait {
    async fn refresh_for_order(&self, order_id: i64) -> Result<(), RepositoryError>;
}
