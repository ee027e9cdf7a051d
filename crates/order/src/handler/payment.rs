use crate::{
    abstract_trait::payment::DynPaymentCommandService,
    domain::requests::payment::ConfirmPaymentRequest,
    handler::validate::ValidatedJson,
    state::AppState,
};
use axum::{
    Json, extract::Extension, http::StatusCode, response::IntoResponse, routing::post,
};
use shared::errors::HttpError;
use std::sync::Arc;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    post,
    path = "/api/payments/confirm",
    tag = "Payment",
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Gateway-defined confirmation body"),
        (status = 400, description = "Invalid request or amount mismatch"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order amount changed"),
        (status = 502, description = "Gateway failure")
    )
)]
pub async fn confirm_payment(
    Extension(service): Extension<DynPaymentCommandService>,
    ValidatedJson(body): ValidatedJson<ConfirmPaymentRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let result = service.confirm_payment(&body).await?;

    // The gateway decides the status code; the storefront widget parses its
    // body verbatim.
    let status =
        StatusCode::from_u16(result.status_code).unwrap_or(StatusCode::BAD_GATEWAY);
    Ok((status, Json(result.body)))
}

pub fn payment_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/payments/confirm", post(confirm_payment))
        .layer(Extension(app_state.di_container.payment_command.clone()))
}
