use crate::domain::requests::order::{NewOrderItemRecord, NewOrderRecord};
use crate::model::{
    order::Order as OrderModel, order_item::OrderItem as OrderItemModel,
    product::ProductStatus, product::StockRecord,
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;

pub type DynCheckoutTxFactory = Arc<dyn CheckoutTxFactory + Send + Sync>;

#[async_trait]
pub trait CheckoutTxFactory {
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, RepositoryError>;
}

/// The atomic unit of order creation: stock locks, decrements, sold-out
/// flips and the order/item inserts all happen against one transaction, so
/// either everything commits or nothing does. Dropping the value without
/// calling `commit` rolls everything back and releases every lock.
///
/// Callers must acquire locks in ascending product-id order; the fixed global
/// ordering is what prevents circular waits between concurrent checkouts.
#[async_trait]
pub trait CheckoutTx: Send {
    /// Exclusive-locks the product row, requiring the given sale state. A
    /// `SOLD_OUT` row is still lockable so that a request against exhausted
    /// stock fails as a stock conflict rather than a missing product.
    /// `None` when the product is missing, soft-deleted or withdrawn.
    async fn lock_stock(
        &mut self,
        product_id: i64,
        required: ProductStatus,
    ) -> Result<Option<StockRecord>, RepositoryError>;

    /// Decrements stock on the row locked earlier; returns the remaining
    /// quantity. `Conflict` when the decrement would go below zero.
    async fn decrease_stock(
        &mut self,
        product_id: i64,
        quantity: i32,
    ) -> Result<i32, RepositoryError>;

    /// Flips the product to `SOLD_OUT` within the same transaction.
    async fn mark_sold_out(&mut self, product_id: i64) -> Result<(), RepositoryError>;

    async fn insert_order(&mut self, rec: &NewOrderRecord) -> Result<OrderModel, RepositoryError>;

    async fn insert_order_item(
        &mut self,
        rec: &NewOrderItemRecord,
    ) -> Result<OrderItemModel, RepositoryError>;

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}
