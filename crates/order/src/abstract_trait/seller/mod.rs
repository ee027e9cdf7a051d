use crate::domain::{
    requests::order::FindSellerOrders,
    response::{
        api::{ApiResponse, ApiResponsePagination},
        seller::{SellerOrderDetailResponse, SellerOrderSummaryResponse},
    },
};
use async_trait::async_trait;
use shared::errors::{RepositoryError, ServiceError};
use std::sync::Arc;

pub type DynSellerVerifier = Arc<dyn SellerVerifierTrait + Send + Sync>;

/// Active-status probe against the seller subsystem.
#[async_trait]
pub trait SellerVerifierTrait {
    async fn is_active(&self, seller_id: i64) -> Result<bool, RepositoryError>;
}

pub type DynSellerOrderQueryService = Arc<dyn SellerOrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait SellerOrderQueryServiceTrait {
    async fn find_orders(
        &self,
        seller_id: i64,
        req: &FindSellerOrders,
    ) -> Result<ApiResponsePagination<Vec<SellerOrderSummaryResponse>>, ServiceError>;

    async fn find_order_detail(
        &self,
        seller_id: i64,
        order_id: i64,
    ) -> Result<ApiResponse<SellerOrderDetailResponse>, ServiceError>;
}
