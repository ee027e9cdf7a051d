use crate::domain::{
    requests::order::{CreateOrderRequest, OrderCancelRequest},
    response::{
        api::ApiResponse,
        order::{CreateOrderResponse, OrderCancelResponse},
    },
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn create_order(
        &self,
        member_id: i64,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<CreateOrderResponse>, ServiceError>;

    async fn request_cancel(
        &self,
        member_id: i64,
        order_id: i64,
        req: &OrderCancelRequest,
    ) -> Result<ApiResponse<OrderCancelResponse>, ServiceError>;

    async fn abandon_order(&self, member_id: i64, order_id: i64) -> Result<(), ServiceError>;
}
