use crate::{
    abstract_trait::order::service::{DynOrderCommandService, DynOrderQueryService},
    domain::{
        requests::order::{CreateOrderRequest, OrderCancelRequest},
        response::{
            api::ApiResponse,
            order::{
                CreateOrderResponse, OrderCancelResponse, OrderDetailResponse,
                OrderSummaryResponse,
            },
        },
    },
    handler::{
        identity::{AuthMember, member_identity_middleware},
        validate::ValidatedJson,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Order",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = ApiResponse<CreateOrderResponse>),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Member or product not found"),
        (status = 409, description = "Insufficient stock")
    )
)]
pub async fn create_order(
    Extension(service): Extension<DynOrderCommandService>,
    Extension(AuthMember(member_id)): Extension<AuthMember>,
    ValidatedJson(body): ValidatedJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.create_order(member_id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Order",
    responses(
        (status = 200, description = "Caller's orders", body = ApiResponse<Vec<OrderSummaryResponse>>),
        (status = 404, description = "Member not found")
    )
)]
pub async fn get_my_orders(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(AuthMember(member_id)): Extension<AuthMember>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_my_orders(member_id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Order",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order detail", body = ApiResponse<OrderDetailResponse>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_my_order_detail(
    Extension(service): Extension<DynOrderQueryService>,
    Extension(AuthMember(member_id)): Extension<AuthMember>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.find_my_order_detail(member_id, id).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    tag = "Order",
    params(("id" = i64, Path, description = "Order ID")),
    request_body = OrderCancelRequest,
    responses(
        (status = 200, description = "Cancel processed", body = ApiResponse<OrderCancelResponse>),
        (status = 400, description = "Missing reason"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Invalid state for cancel"),
        (status = 502, description = "Gateway failure, safe to retry")
    )
)]
pub async fn cancel_order(
    Extension(service): Extension<DynOrderCommandService>,
    Extension(AuthMember(member_id)): Extension<AuthMember>,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<OrderCancelRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let response = service.request_cancel(member_id, id, &body).await?;
    Ok((StatusCode::OK, Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/orders/{id}/abandon",
    tag = "Order",
    params(("id" = i64, Path, description = "Order ID")),
    responses(
        (status = 204, description = "Order abandoned"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn abandon_order(
    Extension(service): Extension<DynOrderCommandService>,
    Extension(AuthMember(member_id)): Extension<AuthMember>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, HttpError> {
    service.abandon_order(member_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn order_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders", get(get_my_orders))
        .route("/api/orders/{id}", get(get_my_order_detail))
        .route("/api/orders/{id}/cancel", post(cancel_order))
        .route("/api/orders/{id}/abandon", post(abandon_order))
        .route_layer(middleware::from_fn(member_identity_middleware))
        .layer(Extension(app_state.di_container.order_command.clone()))
        .layer(Extension(app_state.di_container.order_query.clone()))
}
