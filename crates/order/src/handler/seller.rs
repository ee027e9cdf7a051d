use crate::{
    abstract_trait::seller::DynSellerOrderQueryService,
    domain::{
        requests::order::FindSellerOrders,
        response::{
            api::{ApiResponse, ApiResponsePagination},
            seller::{SellerOrderDetailResponse, SellerOrderSummaryResponse},
        },
    },
    handler::identity::{AuthSeller, seller_identity_middleware},
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/seller/orders",
    tag = "Seller",
    params(FindSellerOrders),
    responses(
        (status = 200, description = "Orders containing the seller's items", body = ApiResponsePagination<Vec<SellerOrderSummaryResponse>>),
        (status = 400, description = "Invalid status filter or page request"),
        (status = 403, description = "Non-seller or inactive seller")
    )
)]
pub async fn get_seller_orders(
    Extension(service): Extension<DynSellerOrderQueryService>,
    Extension(AuthSeller(seller_id)): Extension<AuthSeller>,
    Query(params): Query<FindSellerOrders>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_orders(seller_id, &params).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/seller/orders/{id}",
    tag = "Seller",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order detail restricted to the seller's items", body = ApiResponse<SellerOrderDetailResponse>),
        (status = 403, description = "Non-seller or inactive seller"),
        (status = 404, description = "No items of this seller on the order")
    )
)]
pub async fn get_seller_order_detail(
    Extension(service): Extension<DynSellerOrderQueryService>,
    Extension(AuthSeller(seller_id)): Extension<AuthSeller>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_order_detail(seller_id, id).await?;
    Ok((StatusCode::OK, Json(response)))
}

pub fn seller_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/seller/orders", get(get_seller_orders))
        .route("/api/seller/orders/{id}", get(get_seller_order_detail))
        .route_layer(middleware::from_fn(seller_identity_middleware))
        .layer(Extension(app_state.di_container.seller_query.clone()))
}
