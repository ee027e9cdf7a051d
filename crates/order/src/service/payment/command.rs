use crate::{
    abstract_trait::{
        gateway::DynPaymentGateway,
        order::repository::{DynOrderCommandRepository, DynOrderQueryRepository},
        order_item::DynOrderItemQueryRepository,
        payment::{DynPaymentRepository, PaymentCommandServiceTrait},
        pricing::DynPriceResolver,
    },
    domain::{
        requests::payment::{ConfirmPaymentRequest, NewPaymentRecord},
        response::payment::ConfirmPaymentResponse,
    },
    model::{
        order::{Order as OrderModel, OrderStatus},
        payment::Payment as PaymentModel,
    },
};
use shared::{
    errors::{GatewayError, RepositoryError, ServiceError},
    utils::{Method, Metrics, Status as StatusUtils},
};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use prometheus_client::registry::Registry;
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};
use tracing::{info, warn};

const FREE_SHIPPING_THRESHOLD: i64 = 50_000;
const FLAT_SHIPPING_FEE: i64 = 3_000;

/// Confirms a gateway payment against its order. Per the concurrency rules
/// the order row is never locked across the gateway call; `CREATED -> PAID`
/// lands as a conditional update after the gateway answers, and a confirm
/// retry replays the stored payment record without calling out again.
#[derive(Clone)]
pub struct PaymentCommandService {
    query: DynOrderQueryRepository,
    items: DynOrderItemQueryRepository,
    command: DynOrderCommandRepository,
    payments: DynPaymentRepository,
    pricing: DynPriceResolver,
    gateway: DynPaymentGateway,
    metrics: Arc<Mutex<Metrics>>,
}

pub struct PaymentCommandServiceDeps {
    pub query: DynOrderQueryRepository,
    pub items: DynOrderItemQueryRepository,
    pub command: DynOrderCommandRepository,
    pub payments: DynPaymentRepository,
    pub pricing: DynPriceResolver,
    pub gateway: DynPaymentGateway,
    pub metrics: Arc<Mutex<Metrics>>,
    pub registry: Arc<Mutex<Registry>>,
}

impl PaymentCommandService {
    pub async fn new(deps: PaymentCommandServiceDeps) -> Self {
        let PaymentCommandServiceDeps {
            query,
            items,
            command,
            payments,
            pricing,
            gateway,
            metrics,
            registry,
        } = deps;

        registry.lock().await.register(
            "payment_command_service_request_counter",
            "Total number of requests to the PaymentCommandService",
            metrics.lock().await.request_counter.clone(),
        );
        registry.lock().await.register(
            "payment_command_service_request_duration",
            "Histogram of request durations for the PaymentCommandService",
            metrics.lock().await.request_duration.clone(),
        );

        Self {
            query,
            items,
            command,
            payments,
            pricing,
            gateway,
            metrics,
        }
    }

    async fn record(&self, status: StatusUtils, started: Instant) {
        self.metrics
            .lock()
            .await
            .record(Method::Post, status, started.elapsed().as_secs_f64());
    }

    /// The gateway order reference may be the internal id or the external
    /// order number; try both.
    async fn find_order_by_ref(&self, order_ref: &str) -> Result<OrderModel, ServiceError> {
        if order_ref.bytes().all(|b| b.is_ascii_digit())
            && let Ok(id) = order_ref.parse::<i64>()
            && let Some(order) = self
                .query
                .find_by_id(id)
                .await
                .map_err(ServiceError::Repo)?
        {
            return Ok(order);
        }

        self.query
            .find_by_order_number(order_ref)
            .await
            .map_err(ServiceError::Repo)?
            .ok_or_else(|| ServiceError::NotFound("order not found".into()))
    }

    /// Re-prices the order from the current catalog/live prices. A stale
    /// amount means the live sale moved under the buyer between checkout and
    /// payment; a still-`CREATED` order is then cancelled rather than charged.
    async fn is_order_amount_current(&self, order: &OrderModel) -> Result<bool, ServiceError> {
        let items = self
            .items
            .find_by_order(order.order_id)
            .await
            .map_err(ServiceError::Repo)?;
        if items.is_empty() {
            return Ok(false);
        }

        let mut total_product_amount: i64 = 0;
        for item in &items {
            let unit_price = match self.pricing.current_price(item.product_id).await {
                Ok(price) => price,
                Err(RepositoryError::NotFound) => return Ok(false),
                Err(e) => return Err(ServiceError::Repo(e)),
            };
            total_product_amount += unit_price * item.quantity as i64;
        }

        let shipping_fee = if total_product_amount >= FREE_SHIPPING_THRESHOLD {
            0
        } else {
            FLAT_SHIPPING_FEE
        };
        let recalculated = total_product_amount + shipping_fee - order.discount_fee;

        Ok(order.order_amount == recalculated)
    }

    fn replay_body(payment: &PaymentModel) -> Value {
        json!({
            "paymentKey": payment.payment_key,
            "orderId": payment.gateway_order_id,
            "status": payment.status,
            "totalAmount": payment.total_amount,
            "method": payment.method,
            "requestedAt": payment.requested_at.map(|dt| dt.to_string()),
            "approvedAt": payment.approved_at.map(|dt| dt.to_string()),
        })
    }

    fn payment_record_from(
        body: &Value,
        order_ref: &str,
        fallback_amount: i64,
    ) -> Result<NewPaymentRecord, ServiceError> {
        let payment_key = body
            .get("paymentKey")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ServiceError::Gateway(GatewayError::InvalidResponse(
                    "missing payment key".into(),
                ))
            })?
            .to_string();

        let gateway_order_id = body
            .get("orderId")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(order_ref)
            .to_string();

        let method = body
            .get("method")
            .and_then(Value::as_str)
            .map(str::to_string);
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("DONE")
            .to_string();
        let total_amount = body
            .get("totalAmount")
            .and_then(Value::as_i64)
            .unwrap_or(fallback_amount);

        let requested_at = body
            .get("requestedAt")
            .and_then(Value::as_str)
            .and_then(parse_gateway_time)
            .or_else(|| Some(chrono::Utc::now().naive_utc()));
        let approved_at = body
            .get("approvedAt")
            .and_then(Value::as_str)
            .and_then(parse_gateway_time);

        Ok(NewPaymentRecord {
            payment_key,
            gateway_order_id,
            method,
            status,
            total_amount,
            order_ref: order_ref.to_string(),
            requested_at,
            approved_at,
        })
    }
}

#[async_trait]
impl PaymentCommandServiceTrait for PaymentCommandService {
    async fn confirm_payment(
        &self,
        req: &ConfirmPaymentRequest,
    ) -> Result<ConfirmPaymentResponse, ServiceError> {
        let started = Instant::now();

        let payment_key = req.payment_key.trim();
        let order_ref = req.order_id.trim();

        if payment_key.is_empty() || order_ref.is_empty() {
            return Err(ServiceError::Validation(vec![
                "invalid payment request".into(),
            ]));
        }
        if req.amount < 0 {
            return Err(ServiceError::Validation(vec!["invalid amount".into()]));
        }

        let order = self.find_order_by_ref(order_ref).await?;

        if order.order_amount != req.amount {
            self.record(StatusUtils::Error, started).await;
            return Err(ServiceError::Validation(vec!["amount mismatch".into()]));
        }

        if !self.is_order_amount_current(&order).await? {
            if order.status == OrderStatus::Created {
                warn!(
                    "⚠️ Order {} amount went stale before payment, cancelling",
                    order.order_id
                );
                self.command
                    .cancel_created_order(
                        order.order_id,
                        order.member_id,
                        "price changed",
                        chrono::Utc::now().naive_utc(),
                    )
                    .await
                    .map_err(ServiceError::Repo)?;
            }
            self.record(StatusUtils::Error, started).await;
            return Err(ServiceError::Conflict("order amount changed".into()));
        }

        // Idempotent replay: a payment record for this key means a previous
        // confirm already went through the gateway.
        if let Some(existing) = self
            .payments
            .find_by_payment_key(payment_key)
            .await
            .map_err(ServiceError::Repo)?
        {
            self.command
                .mark_paid_order(order.order_id, chrono::Utc::now().naive_utc())
                .await
                .map_err(ServiceError::Repo)?;

            info!("🔁 Replayed stored confirmation for order {}", order.order_id);
            self.record(StatusUtils::Success, started).await;
            return Ok(ConfirmPaymentResponse {
                status_code: 200,
                body: Self::replay_body(&existing),
            });
        }

        let confirmation = self
            .gateway
            .confirm(payment_key, order_ref, req.amount)
            .await?;

        if confirmation.is_success() {
            let record =
                Self::payment_record_from(&confirmation.body, order_ref, req.amount)?;
            self.payments
                .insert_payment(&record)
                .await
                .map_err(ServiceError::Repo)?;
            self.command
                .mark_paid_order(order.order_id, chrono::Utc::now().naive_utc())
                .await
                .map_err(ServiceError::Repo)?;
            info!("💳 Payment confirmed for order {}", order.order_id);
        }

        self.record(
            if confirmation.is_success() {
                StatusUtils::Success
            } else {
                StatusUtils::Error
            },
            started,
        )
        .await;

        Ok(ConfirmPaymentResponse {
            status_code: confirmation.status_code,
            body: confirmation.body,
        })
    }
}

fn parse_gateway_time(value: &str) -> Option<NaiveDateTime> {
    chrono::DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstract_trait::gateway::GatewayConfirmation;
    use crate::service::testing::{
        FakeGateway, FakeOrderCommandRepository, FakeOrderItemQueryRepository,
        FakeOrderQueryRepository, FakePaymentRepository, FakePriceResolver, InMemoryStore,
    };

    struct Harness {
        store: Arc<InMemoryStore>,
        gateway: Arc<FakeGateway>,
        service: PaymentCommandService,
    }

    async fn harness() -> Harness {
        let store = InMemoryStore::new();
        let gateway = Arc::new(FakeGateway::default());

        let service = PaymentCommandService::new(PaymentCommandServiceDeps {
            query: Arc::new(FakeOrderQueryRepository {
                store: store.clone(),
            }),
            items: Arc::new(FakeOrderItemQueryRepository {
                store: store.clone(),
            }),
            command: Arc::new(FakeOrderCommandRepository {
                store: store.clone(),
            }),
            payments: Arc::new(FakePaymentRepository {
                store: store.clone(),
            }),
            pricing: Arc::new(FakePriceResolver {
                store: store.clone(),
            }),
            gateway: gateway.clone(),
            metrics: Arc::new(Mutex::new(Metrics::default())),
            registry: Arc::new(Mutex::new(Registry::default())),
        })
        .await;

        Harness {
            store,
            gateway,
            service,
        }
    }

    /// Order whose stored amount matches a fresh re-pricing: one item at the
    /// catalog price, product total over the free-shipping threshold.
    fn seed_consistent_order(store: &Arc<InMemoryStore>, member_id: i64) -> i64 {
        store.seed_member(member_id);
        store.seed_product(10, 7, "desk", 60_000, 5);
        let order_id = store.seed_order(member_id, OrderStatus::Created, 60_000);
        store.seed_item(order_id, 10, 7, 1);
        order_id
    }

    fn confirm_request(order_id: i64, amount: i64) -> ConfirmPaymentRequest {
        ConfirmPaymentRequest {
            payment_key: "pay-xyz".into(),
            order_id: order_id.to_string(),
            amount,
        }
    }

    #[tokio::test]
    async fn confirm_marks_order_paid_and_stores_payment() {
        let h = harness().await;
        let order_id = seed_consistent_order(&h.store, 1);

        let response = h
            .service
            .confirm_payment(&confirm_request(order_id, 60_000))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        let order = h.store.order(order_id);
        assert_eq!(order.status, OrderStatus::Paid);
        assert!(order.paid_at.is_some());

        let payments = h.store.payments.lock().unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].payment_key, "pay-xyz");
        assert_eq!(payments[0].total_amount, 60_000);
    }

    #[tokio::test]
    async fn confirm_resolves_order_by_number_too() {
        let h = harness().await;
        let order_id = seed_consistent_order(&h.store, 1);
        let order_number = h.store.order(order_id).order_number;

        let response = h
            .service
            .confirm_payment(&ConfirmPaymentRequest {
                payment_key: "pay-num".into(),
                order_id: order_number,
                amount: 60_000,
            })
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(h.store.order(order_id).status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn amount_mismatch_is_rejected_before_any_gateway_call() {
        let h = harness().await;
        let order_id = seed_consistent_order(&h.store, 1);

        let err = h
            .service
            .confirm_payment(&confirm_request(order_id, 59_000))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(h.gateway.confirm_calls.lock().unwrap().is_empty());
        assert_eq!(h.store.order(order_id).status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn stale_amount_cancels_created_order() {
        let h = harness().await;
        let order_id = seed_consistent_order(&h.store, 1);

        // Live sale moved under the buyer between checkout and payment.
        h.store.seed_live_price(10, 45_000);

        let err = h
            .service
            .confirm_payment(&confirm_request(order_id, 60_000))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        let order = h.store.order(order_id);
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.cancel_reason.as_deref(), Some("price changed"));
        assert!(h.gateway.confirm_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn existing_payment_record_replays_without_gateway_call() {
        let h = harness().await;
        let order_id = seed_consistent_order(&h.store, 1);
        h.store.seed_payment(order_id, "pay-xyz", 60_000);

        let response = h
            .service
            .confirm_payment(&confirm_request(order_id, 60_000))
            .await
            .unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(h.store.order(order_id).status, OrderStatus::Paid);
        assert!(h.gateway.confirm_calls.lock().unwrap().is_empty());
        assert_eq!(h.store.payments.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn gateway_rejection_passes_through_without_persisting() {
        let h = harness().await;
        let order_id = seed_consistent_order(&h.store, 1);

        h.gateway
            .confirm_results
            .lock()
            .unwrap()
            .push_back(Ok(GatewayConfirmation {
                status_code: 400,
                body: serde_json::json!({"code": "INVALID_CARD", "message": "card declined"}),
            }));

        let response = h
            .service
            .confirm_payment(&confirm_request(order_id, 60_000))
            .await
            .unwrap();

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body["code"], "INVALID_CARD");
        assert_eq!(h.store.order(order_id).status, OrderStatus::Created);
        assert!(h.store.payments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_order_and_blank_fields_are_rejected() {
        let h = harness().await;

        let err = h
            .service
            .confirm_payment(&confirm_request(404, 60_000))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = h
            .service
            .confirm_payment(&ConfirmPaymentRequest {
                payment_key: "  ".into(),
                order_id: "1".into(),
                amount: 100,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = h
            .service
            .confirm_payment(&ConfirmPaymentRequest {
                payment_key: "pay".into(),
                order_id: "1".into(),
                amount: -1,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
