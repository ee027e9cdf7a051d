use crate::model::order::{Order as OrderModel, OrderStatus};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

/// Read paths over non-soft-deleted orders.
#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_by_id(&self, order_id: i64) -> Result<Option<OrderModel>, RepositoryError>;

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderModel>, RepositoryError>;

    /// A member's orders, newest first.
    async fn find_by_member(&self, member_id: i64) -> Result<Vec<OrderModel>, RepositoryError>;

    /// Orders containing at least one non-deleted line item of this seller,
    /// optionally filtered by status, paginated. Returns the page plus the
    /// total matching count.
    async fn find_seller_orders(
        &self,
        seller_id: i64,
        status: Option<OrderStatus>,
        page: i32,
        page_size: i32,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError>;
}
