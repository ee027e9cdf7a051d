use crate::{
    abstract_trait::{
        order::repository::DynOrderQueryRepository,
        order_item::DynOrderItemQueryRepository,
        seller::{DynSellerVerifier, SellerOrderQueryServiceTrait},
    },
    domain::{
        requests::order::FindSellerOrders,
        response::{
            api::{ApiResponse, ApiResponsePagination, Pagination},
            seller::{SellerOrderDetailResponse, SellerOrderSummaryResponse},
        },
    },
    model::{order::OrderStatus, order_item::OrderItem as OrderItemModel},
};
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, Status as StatusUtils},
};

use async_trait::async_trait;
use prometheus_client::registry::Registry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};
use tracing::info;

/// Read-only projection of orders onto a single seller. Every path filters
/// line items by the requesting seller, so a shared order never leaks another
/// seller's items or amounts.
#[derive(Clone)]
pub struct SellerOrderQueryService {
    sellers: DynSellerVerifier,
    query: DynOrderQueryRepository,
    items: DynOrderItemQueryRepository,
    metrics: Arc<Mutex<Metrics>>,
}

impl SellerOrderQueryService {
    pub async fn new(
        sellers: DynSellerVerifier,
        query: DynOrderQueryRepository,
        items: DynOrderItemQueryRepository,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        registry.lock().await.register(
            "seller_order_query_service_request_counter",
            "Total number of requests to the SellerOrderQueryService",
            metrics.lock().await.request_counter.clone(),
        );
        registry.lock().await.register(
            "seller_order_query_service_request_duration",
            "Histogram of request durations for the SellerOrderQueryService",
            metrics.lock().await.request_duration.clone(),
        );

        Self {
            sellers,
            query,
            items,
            metrics,
        }
    }

    async fn ensure_active_seller(&self, seller_id: i64) -> Result<(), ServiceError> {
        let active = self
            .sellers
            .is_active(seller_id)
            .await
            .map_err(ServiceError::Repo)?;
        if !active {
            return Err(ServiceError::Forbidden("seller not active".into()));
        }
        Ok(())
    }

    async fn record(&self, status: StatusUtils, started: Instant) {
        self.metrics
            .lock()
            .await
            .record(Method::Get, status, started.elapsed().as_secs_f64());
    }
}

#[async_trait]
impl SellerOrderQueryServiceTrait for SellerOrderQueryService {
    async fn find_orders(
        &self,
        seller_id: i64,
        req: &FindSellerOrders,
    ) -> Result<ApiResponsePagination<Vec<SellerOrderSummaryResponse>>, ServiceError> {
        let started = Instant::now();

        if req.page < 1 || req.page_size < 1 || req.page_size > 100 {
            return Err(ServiceError::Validation(vec!["invalid page request".into()]));
        }

        self.ensure_active_seller(seller_id).await?;

        let status = match req.status.as_deref() {
            Some(raw) => Some(
                raw.parse::<OrderStatus>()
                    .map_err(|e| ServiceError::Validation(vec![e]))?,
            ),
            None => None,
        };

        let (orders, total) = self
            .query
            .find_seller_orders(seller_id, status, req.page, req.page_size)
            .await
            .map_err(ServiceError::Repo)?;

        let order_ids: Vec<i64> = orders.iter().map(|o| o.order_id).collect();
        let items = self
            .items
            .find_by_orders_for_seller(&order_ids, seller_id)
            .await
            .map_err(ServiceError::Repo)?;

        let mut items_by_order: HashMap<i64, Vec<OrderItemModel>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        let summaries = orders
            .iter()
            .map(|order| {
                let own_items = items_by_order.get(&order.order_id);
                let item_count = own_items.map(|v| v.len() as i64).unwrap_or(0);
                let first_product_name = own_items
                    .and_then(|v| v.first())
                    .map(|item| item.product_name.clone());
                SellerOrderSummaryResponse::from_parts(order, item_count, first_product_name)
            })
            .collect();

        info!(
            "📋 Seller {seller_id} listed {} of {total} order(s)",
            order_ids.len()
        );
        self.record(StatusUtils::Success, started).await;

        Ok(ApiResponsePagination {
            status: "success".into(),
            message: "Seller orders fetched successfully".into(),
            data: summaries,
            pagination: Pagination::new(req.page, req.page_size, total),
        })
    }

    async fn find_order_detail(
        &self,
        seller_id: i64,
        order_id: i64,
    ) -> Result<ApiResponse<SellerOrderDetailResponse>, ServiceError> {
        let started = Instant::now();

        self.ensure_active_seller(seller_id).await?;

        // Ownership probe first: a seller with no items on the order learns
        // nothing beyond "not found".
        let owns_items = self
            .items
            .exists_for_seller(order_id, seller_id)
            .await
            .map_err(ServiceError::Repo)?;
        if !owns_items {
            self.record(StatusUtils::Error, started).await;
            return Err(ServiceError::NotFound("order not found".into()));
        }

        let order = self
            .query
            .find_by_id(order_id)
            .await
            .map_err(ServiceError::Repo)?
            .ok_or_else(|| ServiceError::NotFound("order not found".into()))?;

        let items = self
            .items
            .find_by_order_for_seller(order_id, seller_id)
            .await
            .map_err(ServiceError::Repo)?;

        self.record(StatusUtils::Success, started).await;

        Ok(ApiResponse::success(
            "Seller order detail fetched successfully",
            SellerOrderDetailResponse::from_parts(order, items),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{
        FakeOrderItemQueryRepository, FakeOrderQueryRepository, FakeSellerVerifier, InMemoryStore,
    };
    use shared::errors::ServiceError;
    use std::sync::Arc;

    struct Harness {
        store: Arc<InMemoryStore>,
        service: SellerOrderQueryService,
    }

    async fn harness() -> Harness {
        let store = InMemoryStore::new();
        let service = SellerOrderQueryService::new(
            Arc::new(FakeSellerVerifier {
                store: store.clone(),
            }),
            Arc::new(FakeOrderQueryRepository {
                store: store.clone(),
            }),
            Arc::new(FakeOrderItemQueryRepository {
                store: store.clone(),
            }),
            Arc::new(Mutex::new(Metrics::default())),
            Arc::new(Mutex::new(Registry::default())),
        )
        .await;

        Harness { store, service }
    }

    fn page_request(status: Option<&str>) -> FindSellerOrders {
        FindSellerOrders {
            status: status.map(str::to_string),
            page: 1,
            page_size: 10,
        }
    }

    #[tokio::test]
    async fn listing_shows_only_own_item_counts_on_shared_orders() {
        let h = harness().await;
        h.store.seed_seller(7);
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "desk", 20_000, 5);
        h.store.seed_product(20, 8, "mat", 5_000, 5);

        // Shared order: one item of seller 7, two of seller 8.
        let shared = h.store.seed_order(1, OrderStatus::Paid, 45_000);
        h.store.seed_item(shared, 10, 7, 1);
        h.store.seed_item(shared, 20, 8, 2);
        h.store.seed_item(shared, 20, 8, 1);

        // An order with no item of seller 7 must not appear at all.
        let foreign = h.store.seed_order(1, OrderStatus::Paid, 10_000);
        h.store.seed_item(foreign, 20, 8, 2);

        let page = h.service.find_orders(7, &page_request(None)).await.unwrap();

        assert_eq!(page.pagination.total_items, 1);
        assert_eq!(page.data.len(), 1);
        let summary = &page.data[0];
        assert_eq!(summary.id, shared);
        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.first_product_name.as_deref(), Some("product-10"));
    }

    #[tokio::test]
    async fn status_filter_and_bad_status() {
        let h = harness().await;
        h.store.seed_seller(7);
        h.store.seed_member(1);

        let paid = h.store.seed_order(1, OrderStatus::Paid, 10_000);
        h.store.seed_item(paid, 10, 7, 1);
        let created = h.store.seed_order(1, OrderStatus::Created, 10_000);
        h.store.seed_item(created, 10, 7, 1);

        let page = h
            .service
            .find_orders(7, &page_request(Some("PAID")))
            .await
            .unwrap();
        assert_eq!(page.pagination.total_items, 1);
        assert_eq!(page.data[0].id, paid);

        let err = h
            .service
            .find_orders(7, &page_request(Some("SHIPPED")))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn pagination_math() {
        let h = harness().await;
        h.store.seed_seller(7);
        h.store.seed_member(1);
        for _ in 0..25 {
            let order_id = h.store.seed_order(1, OrderStatus::Paid, 10_000);
            h.store.seed_item(order_id, 10, 7, 1);
        }

        let req = FindSellerOrders {
            status: None,
            page: 3,
            page_size: 10,
        };
        let page = h.service.find_orders(7, &req).await.unwrap();

        assert_eq!(page.pagination.total_items, 25);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.data.len(), 5);
    }

    #[tokio::test]
    async fn inactive_seller_is_forbidden() {
        let h = harness().await;

        let err = h.service.find_orders(99, &page_request(None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = h.service.find_order_detail(99, 1).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn detail_filters_items_and_hides_unrelated_orders() {
        let h = harness().await;
        h.store.seed_seller(7);
        h.store.seed_seller(8);
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "desk", 20_000, 5);
        h.store.seed_product(20, 8, "mat", 5_000, 5);

        let shared = h.store.seed_order(1, OrderStatus::Paid, 45_000);
        h.store.seed_item(shared, 10, 7, 1);
        h.store.seed_item(shared, 20, 8, 2);

        let detail = h.service.find_order_detail(7, shared).await.unwrap();
        assert_eq!(detail.data.items.len(), 1);
        assert_eq!(detail.data.items[0].product_id, 10);

        // Seller 8 sees only their own lines of the same order.
        let other_view = h.service.find_order_detail(8, shared).await.unwrap();
        assert_eq!(other_view.data.items.len(), 1);
        assert_eq!(other_view.data.items[0].product_id, 20);

        // An order without this seller's items reads as absent.
        let foreign = h.store.seed_order(1, OrderStatus::Paid, 10_000);
        h.store.seed_item(foreign, 20, 8, 1);
        let err = h.service.find_order_detail(7, foreign).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
