mod identity;
mod order;
mod payment;
mod seller;
mod validate;

use crate::state::AppState;
use anyhow::Result;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use prometheus_client::encoding::text::encode;
use shared::utils::shutdown_signal;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

pub use self::identity::{AuthMember, AuthSeller};
pub use self::order::order_routes;
pub use self::payment::payment_routes;
pub use self::seller::seller_routes;
pub use self::validate::ValidatedJson;

#[derive(OpenApi)]
#[openapi(
    paths(
        order::create_order,
        order::get_my_orders,
        order::get_my_order_detail,
        order::cancel_order,
        order::abandon_order,

        payment::confirm_payment,

        seller::get_seller_orders,
        seller::get_seller_order_detail,
    ),
    tags(
        (name = "Order", description = "Buyer order endpoints"),
        (name = "Payment", description = "Payment gateway endpoints"),
        (name = "Seller", description = "Seller order endpoints"),
    )
)]
struct ApiDoc;

pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut buffer = String::new();

    let registry = state.registry.lock().await;

    if let Err(e) = encode(&mut buffer, &registry) {
        return Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from(format!("Failed to encode metrics: {e}")))
            .unwrap();
    }

    Response::builder()
        .status(StatusCode::OK)
        .header(
            CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )
        .body(Body::from(buffer))
        .unwrap()
}

pub struct AppRouter;

impl AppRouter {
    pub async fn serve(port: u16, app_state: AppState) -> Result<()> {
        let shared_state = Arc::new(app_state);

        let api_router = OpenApiRouter::with_openapi(ApiDoc::openapi())
            .route("/metrics", get(metrics_handler))
            .with_state(shared_state.clone())
            .merge(order_routes(shared_state.clone()))
            .merge(payment_routes(shared_state.clone()))
            .merge(seller_routes(shared_state.clone()));

        let router_with_layers = api_router
            .layer(TraceLayer::new_for_http())
            .layer(DefaultBodyLimit::disable())
            .layer(RequestBodyLimitLayer::new(2 * 1024 * 1024));

        let (app_router, api) = router_with_layers.split_for_parts();

        let app = app_router
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()));

        let addr = format!("0.0.0.0:{port}");
        let listener = TcpListener::bind(&addr).await?;

        println!("🚀 Server running on http://{}", listener.local_addr()?);
        println!("📚 API Documentation available at:");
        println!("   📖 Swagger UI: http://localhost:{port}/swagger-ui");
        println!("   📊 Metrics: http://localhost:{port}/metrics");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}
