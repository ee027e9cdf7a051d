use crate::{
    abstract_trait::{
        member::DynMemberVerifier,
        order::{repository::DynOrderQueryRepository, service::OrderQueryServiceTrait},
        order_item::DynOrderItemQueryRepository,
    },
    domain::response::{
        api::ApiResponse,
        order::{OrderDetailResponse, OrderSummaryResponse},
    },
};
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, Status as StatusUtils},
};

use async_trait::async_trait;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};
use tracing::info;

#[derive(Clone)]
pub struct OrderQueryService {
    members: DynMemberVerifier,
    query: DynOrderQueryRepository,
    items: DynOrderItemQueryRepository,
    metrics: Arc<Mutex<Metrics>>,
}

impl OrderQueryService {
    pub async fn new(
        members: DynMemberVerifier,
        query: DynOrderQueryRepository,
        items: DynOrderItemQueryRepository,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        registry.lock().await.register(
            "order_query_service_request_counter",
            "Total number of requests to the OrderQueryService",
            metrics.lock().await.request_counter.clone(),
        );
        registry.lock().await.register(
            "order_query_service_request_duration",
            "Histogram of request durations for the OrderQueryService",
            metrics.lock().await.request_duration.clone(),
        );

        Self {
            members,
            query,
            items,
            metrics,
        }
    }

    async fn record(&self, status: StatusUtils, started: Instant) {
        self.metrics
            .lock()
            .await
            .record(Method::Get, status, started.elapsed().as_secs_f64());
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_my_orders(
        &self,
        member_id: i64,
    ) -> Result<ApiResponse<Vec<OrderSummaryResponse>>, ServiceError> {
        let started = Instant::now();

        if !self
            .members
            .exists(member_id)
            .await
            .map_err(ServiceError::Repo)?
        {
            self.record(StatusUtils::Error, started).await;
            return Err(ServiceError::NotFound("member not found".into()));
        }

        let orders = self
            .query
            .find_by_member(member_id)
            .await
            .map_err(ServiceError::Repo)?;

        info!("📋 Fetched {} order(s) for member {member_id}", orders.len());
        self.record(StatusUtils::Success, started).await;

        Ok(ApiResponse::success(
            "Orders fetched successfully",
            orders.into_iter().map(OrderSummaryResponse::from).collect(),
        ))
    }

    async fn find_my_order_detail(
        &self,
        member_id: i64,
        order_id: i64,
    ) -> Result<ApiResponse<OrderDetailResponse>, ServiceError> {
        let started = Instant::now();

        if !self
            .members
            .exists(member_id)
            .await
            .map_err(ServiceError::Repo)?
        {
            self.record(StatusUtils::Error, started).await;
            return Err(ServiceError::NotFound("member not found".into()));
        }

        let order = self
            .query
            .find_by_id(order_id)
            .await
            .map_err(ServiceError::Repo)?
            .ok_or_else(|| ServiceError::NotFound("order not found".into()))?;

        if order.member_id != member_id {
            self.record(StatusUtils::Error, started).await;
            return Err(ServiceError::Forbidden("forbidden".into()));
        }

        let items = self
            .items
            .find_by_order(order_id)
            .await
            .map_err(ServiceError::Repo)?;

        self.record(StatusUtils::Success, started).await;

        Ok(ApiResponse::success(
            "Order detail fetched successfully",
            OrderDetailResponse::from_parts(order, items),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::order::OrderStatus;
    use crate::service::testing::{
        FakeMemberVerifier, FakeOrderItemQueryRepository, FakeOrderQueryRepository, InMemoryStore,
    };

    struct Harness {
        store: std::sync::Arc<InMemoryStore>,
        service: OrderQueryService,
    }

    async fn harness() -> Harness {
        let store = InMemoryStore::new();
        let service = OrderQueryService::new(
            Arc::new(FakeMemberVerifier {
                store: store.clone(),
            }),
            Arc::new(FakeOrderQueryRepository {
                store: store.clone(),
            }),
            Arc::new(FakeOrderItemQueryRepository {
                store: store.clone(),
            }),
            Arc::new(Mutex::new(Metrics::default())),
            Arc::new(Mutex::new(prometheus_client::registry::Registry::default())),
        )
        .await;

        Harness { store, service }
    }

    #[tokio::test]
    async fn lists_only_own_live_orders() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_member(2);

        let mine = h.store.seed_order(1, OrderStatus::Created, 10_000);
        h.store.seed_order(2, OrderStatus::Created, 10_000);
        let abandoned = h.store.seed_order(1, OrderStatus::Created, 10_000);
        h.store
            .orders
            .lock()
            .unwrap()
            .get_mut(&abandoned)
            .unwrap()
            .deleted_at = Some(chrono::Utc::now().naive_utc());

        let response = h.service.find_my_orders(1).await.unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].id, mine);

        let err = h.service.find_my_orders(42).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn detail_enforces_ownership() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_member(2);
        h.store.seed_product(10, 7, "desk", 20_000, 5);

        let order_id = h.store.seed_order(1, OrderStatus::Paid, 20_000);
        h.store.seed_item(order_id, 10, 7, 1);

        let detail = h.service.find_my_order_detail(1, order_id).await.unwrap();
        assert_eq!(detail.data.items.len(), 1);
        assert_eq!(detail.data.status, "PAID");

        let err = h
            .service
            .find_my_order_detail(2, order_id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = h.service.find_my_order_detail(1, 999).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
