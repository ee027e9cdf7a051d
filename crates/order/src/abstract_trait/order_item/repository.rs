use crate::model::order_item::OrderItem as OrderItemModel;
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderItemQueryRepository = Arc<dyn OrderItemQueryRepositoryTrait + Send + Sync>;

/// Line items are insert-only (written through the checkout transaction), so
/// the repository surface is read paths plus the seller-scoped filters the
/// seller view needs.
#[async_trait]
pub trait OrderItemQueryRepositoryTrait {
    async fn find_by_order(&self, order_id: i64) -> Result<Vec<OrderItemModel>, RepositoryError>;

    async fn find_by_order_for_seller(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<Vec<OrderItemModel>, RepositoryError>;

    async fn find_by_orders_for_seller(
        &self,
        order_ids: &[i64],
        seller_id: i64,
    ) -> Result<Vec<OrderItemModel>, RepositoryError>;

    async fn exists_for_seller(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<bool, RepositoryError>;
}
