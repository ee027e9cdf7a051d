use crate::domain::response::{
    api::ApiResponse,
    order::{OrderDetailResponse, OrderSummaryResponse},
};
use async_trait::async_trait;
use shared::errors::ServiceError;
use std::sync::Arc;

pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_my_orders(
        &self,
        member_id: i64,
    ) -> Result<ApiResponse<Vec<OrderSummaryResponse>>, ServiceError>;

    async fn find_my_order_detail(
        &self,
        member_id: i64,
        order_id: i64,
    ) -> Result<ApiResponse<OrderDetailResponse>, ServiceError>;
}
