use crate::{
    abstract_trait::{
        address::DynAddressBook,
        checkout::DynCheckoutTxFactory,
        gateway::DynPaymentGateway,
        member::DynMemberVerifier,
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::OrderCommandServiceTrait,
        },
        payment::DynPaymentRepository,
        pricing::DynPriceResolver,
        sales::DynSalesAggregator,
    },
    domain::{
        requests::{
            order::{CreateOrderRequest, NewOrderItemRecord, NewOrderRecord, OrderCancelRequest},
            payment::NewRefundRecord,
        },
        response::{
            api::ApiResponse,
            order::{CreateOrderResponse, OrderCancelResponse},
        },
    },
    model::{
        order::{Order as OrderModel, OrderStatus},
        product::{ProductStatus, StockRecord},
    },
};
use shared::{
    errors::ServiceError,
    utils::{Method, Metrics, Status as StatusUtils, TracingContext, generate_order_number},
};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use prometheus_client::registry::Registry;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::{sync::Mutex, time::Instant};
use tracing::{error, info, warn};

/// Orders ship free at and above this product total, flat fee below it.
const FREE_SHIPPING_THRESHOLD: i64 = 50_000;
const FLAT_SHIPPING_FEE: i64 = 3_000;

#[derive(Clone)]
pub struct OrderCommandService {
    checkout: DynCheckoutTxFactory,
    pricing: DynPriceResolver,
    members: DynMemberVerifier,
    command: DynOrderCommandRepository,
    query: DynOrderQueryRepository,
    payments: DynPaymentRepository,
    gateway: DynPaymentGateway,
    address_book: DynAddressBook,
    sales: DynSalesAggregator,
    metrics: Arc<Mutex<Metrics>>,
}

pub struct OrderCommandServiceDeps {
    pub checkout: DynCheckoutTxFactory,
    pub pricing: DynPriceResolver,
    pub members: DynMemberVerifier,
    pub command: DynOrderCommandRepository,
    pub query: DynOrderQueryRepository,
    pub payments: DynPaymentRepository,
    pub gateway: DynPaymentGateway,
    pub address_book: DynAddressBook,
    pub sales: DynSalesAggregator,
    pub metrics: Arc<Mutex<Metrics>>,
    pub registry: Arc<Mutex<Registry>>,
}

impl OrderCommandService {
    pub async fn new(deps: OrderCommandServiceDeps) -> Self {
        let OrderCommandServiceDeps {
            checkout,
            pricing,
            members,
            command,
            query,
            payments,
            gateway,
            address_book,
            sales,
            metrics,
            registry,
        } = deps;

        registry.lock().await.register(
            "order_command_service_request_counter",
            "Total number of requests to the OrderCommandService",
            metrics.lock().await.request_counter.clone(),
        );
        registry.lock().await.register(
            "order_command_service_request_duration",
            "Histogram of request durations for the OrderCommandService",
            metrics.lock().await.request_duration.clone(),
        );

        Self {
            checkout,
            pricing,
            members,
            command,
            query,
            payments,
            gateway,
            address_book,
            sales,
            metrics,
        }
    }

    fn get_tracer(&self) -> BoxedTracer {
        global::tracer("order-command-service")
    }

    fn start_tracing(&self, operation_name: &str, attributes: Vec<KeyValue>) -> TracingContext {
        let start_time = Instant::now();
        let tracer = self.get_tracer();
        let mut span = tracer
            .span_builder(operation_name.to_string())
            .with_kind(SpanKind::Server)
            .with_attributes(attributes)
            .start(&tracer);

        info!("Starting operation: {operation_name}");

        span.add_event(
            "Operation started",
            vec![KeyValue::new("operation", operation_name.to_string())],
        );

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    async fn complete_tracing_success(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        message: &str,
    ) {
        self.complete_tracing_internal(tracing_ctx, method, true, message)
            .await;
    }

    async fn complete_tracing_error(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        error_message: &str,
    ) {
        self.complete_tracing_internal(tracing_ctx, method, false, error_message)
            .await;
    }

    async fn complete_tracing_internal(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        is_success: bool,
        message: &str,
    ) {
        let status_str = if is_success { "SUCCESS" } else { "ERROR" };
        let status = if is_success {
            StatusUtils::Success
        } else {
            StatusUtils::Error
        };
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();

        tracing_ctx.cx.span().add_event(
            "Operation completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        if is_success {
            info!("✅ Operation completed successfully: {message}");
        } else {
            error!("❌ Operation failed: {message}");
        }

        self.metrics.lock().await.record(method, status, elapsed);

        tracing_ctx.cx.span().end();
    }

    async fn load_owned_order(
        &self,
        member_id: i64,
        order_id: i64,
    ) -> Result<OrderModel, ServiceError> {
        let order = self
            .query
            .find_by_id(order_id)
            .await
            .map_err(ServiceError::Repo)?
            .ok_or_else(|| ServiceError::NotFound("order not found".into()))?;

        if order.member_id != member_id {
            return Err(ServiceError::Forbidden("forbidden".into()));
        }
        Ok(order)
    }

    /// Gateway leg of the refund. Called with no database lock or transaction
    /// held; the order sits in `REFUND_REQUESTED` for the duration, which is
    /// exactly the state a retry resumes from.
    async fn settle_refund(&self, order: &OrderModel, reason: &str) -> Result<(), ServiceError> {
        let payment = self
            .payments
            .find_by_order_ref(order.order_id, &order.order_number)
            .await
            .map_err(ServiceError::Repo)?
            .ok_or_else(|| ServiceError::NotFound("payment not found".into()))?;

        if payment.is_already_cancelled() {
            info!(
                "🔁 Payment for order {} already cancelled at the gateway, skipping call",
                order.order_id
            );
            return Ok(());
        }

        let cancel_amount = if order.order_amount > 0 {
            order.order_amount
        } else {
            payment.total_amount
        };
        if cancel_amount <= 0 {
            return Err(ServiceError::Validation(vec!["invalid cancel amount".into()]));
        }

        let cancellation = self
            .gateway
            .cancel(
                &payment.payment_key,
                &payment.gateway_order_id,
                cancel_amount,
                reason,
            )
            .await?;

        self.payments
            .update_payment_status(&payment.payment_key, &cancellation.status)
            .await
            .map_err(ServiceError::Repo)?;

        let refund_key = cancellation.refund_key.unwrap_or_else(|| {
            format!(
                "{}:{}",
                payment.payment_key,
                chrono::Utc::now().timestamp_millis()
            )
        });
        let approved_at = cancellation
            .cancelled_at
            .as_deref()
            .and_then(parse_gateway_time);

        let record = NewRefundRecord {
            refund_key,
            payment_key: payment.payment_key.clone(),
            amount: cancellation.cancelled_amount.unwrap_or(cancel_amount),
            reason: normalize_reason(reason),
            status: "DONE".into(),
            requested_at: approved_at.or_else(|| Some(chrono::Utc::now().naive_utc())),
            approved_at,
        };

        self.payments
            .insert_refund_if_absent(&record)
            .await
            .map_err(ServiceError::Repo)?;

        Ok(())
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn create_order(
        &self,
        member_id: i64,
        req: &CreateOrderRequest,
    ) -> Result<ApiResponse<CreateOrderResponse>, ServiceError> {
        info!("🏗️ Creating new order for member_id={member_id}");

        let method = Method::Post;
        let tracing_ctx = self.start_tracing(
            "create_order",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "create"),
                KeyValue::new("order.member_id", member_id.to_string()),
            ],
        );

        if !self
            .members
            .exists(member_id)
            .await
            .map_err(ServiceError::Repo)?
        {
            self.complete_tracing_error(&tracing_ctx, method, "Member not found")
                .await;
            return Err(ServiceError::NotFound("member not found".into()));
        }

        if req.items.is_empty() {
            return Err(ServiceError::Validation(vec!["items required".into()]));
        }

        let receiver = normalize_receiver(&req.receiver)?;
        let postcode = normalize_postcode(&req.postcode)?;
        let addr_detail = normalize_addr_detail(&req.addr_detail)?;

        // Merge duplicate lines per product so each inventory row is locked
        // and decremented exactly once. The BTreeMap doubles as the fixed
        // ascending lock order that rules out circular waits.
        let mut quantity_by_product: BTreeMap<i64, i32> = BTreeMap::new();
        for item in &req.items {
            if item.product_id < 1 {
                return Err(ServiceError::Validation(vec!["product_id required".into()]));
            }
            if item.quantity < 1 {
                return Err(ServiceError::Validation(vec![
                    "quantity must be >= 1".into(),
                ]));
            }
            *quantity_by_product.entry(item.product_id).or_insert(0) += item.quantity;
        }

        let mut tx = self
            .checkout
            .begin()
            .await
            .map_err(ServiceError::Repo)?;

        let mut reserved: Vec<(StockRecord, i32)> = Vec::with_capacity(quantity_by_product.len());
        for (&product_id, &quantity) in &quantity_by_product {
            let record = tx
                .lock_stock(product_id, ProductStatus::OnSale)
                .await
                .map_err(ServiceError::Repo)?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("product not found: {product_id}"))
                })?;

            if record.stock_qty < quantity {
                self.complete_tracing_error(&tracing_ctx, method, "Insufficient stock")
                    .await;
                return Err(ServiceError::Conflict(format!(
                    "insufficient stock: product_id={product_id}"
                )));
            }

            let remaining = tx
                .decrease_stock(product_id, quantity)
                .await
                .map_err(ServiceError::Repo)?;
            if remaining == 0 {
                tx.mark_sold_out(product_id)
                    .await
                    .map_err(ServiceError::Repo)?;
            }

            reserved.push((record, quantity));
        }

        let mut total_product_amount: i64 = 0;
        let mut priced: Vec<(StockRecord, i32, i64, i64)> = Vec::with_capacity(reserved.len());
        for (record, quantity) in reserved {
            let unit_price = self
                .pricing
                .current_price(record.product_id)
                .await
                .map_err(ServiceError::Repo)?;
            let subtotal = unit_price * quantity as i64;
            total_product_amount += subtotal;
            priced.push((record, quantity, unit_price, subtotal));
        }

        let shipping_fee = shipping_fee_for(total_product_amount);
        let discount_fee: i64 = 0;
        let order_amount = total_product_amount + shipping_fee - discount_fee;
        let order_number =
            generate_order_number().map_err(|e| ServiceError::Internal(e.to_string()))?;

        let order = tx
            .insert_order(&NewOrderRecord {
                member_id,
                order_number,
                receiver: receiver.clone(),
                postcode: postcode.clone(),
                addr_detail: addr_detail.clone(),
                total_product_amount,
                shipping_fee,
                discount_fee,
                order_amount,
                status: OrderStatus::Created,
            })
            .await
            .map_err(ServiceError::Repo)?;

        for (record, quantity, unit_price, subtotal) in &priced {
            tx.insert_order_item(&NewOrderItemRecord {
                order_id: order.order_id,
                product_id: record.product_id,
                seller_id: record.seller_id,
                product_name: record.product_name.clone(),
                unit_price: *unit_price,
                quantity: *quantity,
                subtotal_price: *subtotal,
            })
            .await
            .map_err(ServiceError::Repo)?;
        }

        tx.commit().await.map_err(ServiceError::Repo)?;

        // Best-effort: the order must survive an address-book hiccup.
        if let Err(e) = self
            .address_book
            .save_from_order(
                member_id,
                &receiver,
                &postcode,
                &addr_detail,
                req.save_as_default,
            )
            .await
        {
            warn!("⚠️ Failed to save shipping address from order: {e:?}");
        }

        self.complete_tracing_success(&tracing_ctx, method, "Order created")
            .await;

        Ok(ApiResponse::success(
            "Order created successfully",
            CreateOrderResponse::from(order),
        ))
    }

    async fn request_cancel(
        &self,
        member_id: i64,
        order_id: i64,
        req: &OrderCancelRequest,
    ) -> Result<ApiResponse<OrderCancelResponse>, ServiceError> {
        info!("🚫 Cancel requested for order_id={order_id} by member_id={member_id}");

        let method = Method::Post;
        let tracing_ctx = self.start_tracing(
            "request_cancel",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("operation", "cancel"),
                KeyValue::new("order.id", order_id.to_string()),
            ],
        );

        let reason = req.reason.trim();
        if reason.is_empty() {
            return Err(ServiceError::Validation(vec!["reason required".into()]));
        }

        if !self
            .members
            .exists(member_id)
            .await
            .map_err(ServiceError::Repo)?
        {
            return Err(ServiceError::NotFound("member not found".into()));
        }

        let order = self.load_owned_order(member_id, order_id).await?;

        // A retry against an already-finalized cancel answers with the
        // current state; the first call's reason and timestamps stand.
        if order.status.is_cancel_finalized() {
            self.complete_tracing_success(&tracing_ctx, method, "Cancel already finalized")
                .await;
            return Ok(ApiResponse::success(
                "Order cancel already finalized",
                OrderCancelResponse::from(order),
            ));
        }

        let now = chrono::Utc::now().naive_utc();

        let order = match order.status {
            OrderStatus::Created => {
                let updated = self
                    .command
                    .cancel_created_order(order_id, member_id, reason, now)
                    .await
                    .map_err(ServiceError::Repo)?;

                let latest = self.load_owned_order(member_id, order_id).await?;
                if updated == 0 && !latest.status.is_cancel_finalized() {
                    self.complete_tracing_error(&tracing_ctx, method, "Cancel state changed")
                        .await;
                    return Err(ServiceError::Conflict("cancel state changed".into()));
                }

                self.complete_tracing_success(&tracing_ctx, method, "Order cancelled")
                    .await;
                return Ok(ApiResponse::success(
                    "Order cancelled successfully",
                    OrderCancelResponse::from(latest),
                ));
            }

            OrderStatus::Paid => {
                let updated = self
                    .command
                    .request_refund_for_paid_order(order_id, member_id, reason)
                    .await
                    .map_err(ServiceError::Repo)?;

                let latest = self.load_owned_order(member_id, order_id).await?;
                if updated == 0
                    && latest.status != OrderStatus::RefundRequested
                    && latest.status != OrderStatus::Refunded
                {
                    self.complete_tracing_error(&tracing_ctx, method, "Cancel state changed")
                        .await;
                    return Err(ServiceError::Conflict("cancel state changed".into()));
                }

                if latest.status == OrderStatus::Refunded {
                    self.complete_tracing_success(&tracing_ctx, method, "Refund already completed")
                        .await;
                    return Ok(ApiResponse::success(
                        "Refund already completed",
                        OrderCancelResponse::from(latest),
                    ));
                }
                latest
            }

            // A retried call that already moved the order into
            // REFUND_REQUESTED goes straight to the gateway step.
            OrderStatus::RefundRequested => order,

            other => {
                self.complete_tracing_error(&tracing_ctx, method, "Invalid status for cancel")
                    .await;
                return Err(ServiceError::InvalidState(format!(
                    "invalid status for cancel request: {other}"
                )));
            }
        };

        if let Err(e) = self.settle_refund(&order, reason).await {
            self.complete_tracing_error(&tracing_ctx, method, "Gateway refund failed")
                .await;
            return Err(e);
        }

        self.command
            .approve_refund_request(order_id, member_id, chrono::Utc::now().naive_utc())
            .await
            .map_err(ServiceError::Repo)?;

        let after_refund = self.load_owned_order(member_id, order_id).await?;
        if after_refund.status == OrderStatus::Refunded {
            if let Err(e) = self.sales.refresh_for_order(order_id).await {
                error!("❌ Failed to refresh sales aggregates after refund: {e:?}");
            }
        }

        self.complete_tracing_success(&tracing_ctx, method, "Refund completed")
            .await;

        Ok(ApiResponse::success(
            "Refund completed successfully",
            OrderCancelResponse::from(after_refund),
        ))
    }

    async fn abandon_order(&self, member_id: i64, order_id: i64) -> Result<(), ServiceError> {
        info!("🗑️ Abandoning order_id={order_id} for member_id={member_id}");

        if !self
            .members
            .exists(member_id)
            .await
            .map_err(ServiceError::Repo)?
        {
            return Err(ServiceError::NotFound("member not found".into()));
        }

        let order = self.load_owned_order(member_id, order_id).await?;

        // Only a never-paid order can be abandoned; anything further along
        // is silently left alone so retries stay harmless.
        if order.status != OrderStatus::Created {
            return Ok(());
        }

        self.command
            .abandon_created_order(order_id, member_id, chrono::Utc::now().naive_utc())
            .await
            .map_err(ServiceError::Repo)?;

        Ok(())
    }
}

fn shipping_fee_for(total_product_amount: i64) -> i64 {
    if total_product_amount >= FREE_SHIPPING_THRESHOLD {
        0
    } else {
        FLAT_SHIPPING_FEE
    }
}

fn normalize_receiver(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(vec!["receiver required".into()]));
    }
    Ok(trimmed.chars().take(20).collect())
}

fn normalize_postcode(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.len() != 5 || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ServiceError::Validation(vec!["postcode invalid".into()]));
    }
    Ok(trimmed.to_string())
}

fn normalize_addr_detail(raw: &str) -> Result<String, ServiceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation(vec!["addr_detail required".into()]));
    }
    Ok(trimmed.chars().take(255).collect())
}

fn normalize_reason(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        "customer request".to_string()
    } else {
        trimmed.to_string()
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
    use crate::domain::requests::order::CreateOrderItemRequest;
    use crate::model::product::ProductStatus;
    use crate::service::testing::{
        FakeAddressBook, FakeCheckoutTxFactory, FakeGateway, FakeMemberVerifier,
        FakeOrderCommandRepository, FakeOrderQueryRepository, FakePaymentRepository,
        FakePriceResolver, FakeSalesAggregator, InMemoryStore,
    };
    use std::sync::atomic::Ordering;

    struct Harness {
        store: Arc<InMemoryStore>,
        gateway: Arc<FakeGateway>,
        address_book: Arc<FakeAddressBook>,
        service: OrderCommandService,
    }

    async fn harness() -> Harness {
        let store = InMemoryStore::new();
        let gateway = Arc::new(FakeGateway::default());
        let address_book = Arc::new(FakeAddressBook::new(store.clone()));

        let service = OrderCommandService::new(OrderCommandServiceDeps {
            checkout: Arc::new(FakeCheckoutTxFactory {
                store: store.clone(),
            }),
            pricing: Arc::new(FakePriceResolver {
                store: store.clone(),
            }),
            members: Arc::new(FakeMemberVerifier {
                store: store.clone(),
            }),
            command: Arc::new(FakeOrderCommandRepository {
                store: store.clone(),
            }),
            query: Arc::new(FakeOrderQueryRepository {
                store: store.clone(),
            }),
            payments: Arc::new(FakePaymentRepository {
                store: store.clone(),
            }),
            gateway: gateway.clone(),
            address_book: address_book.clone(),
            sales: Arc::new(FakeSalesAggregator {
                store: store.clone(),
            }),
            metrics: Arc::new(Mutex::new(Metrics::default())),
            registry: Arc::new(Mutex::new(Registry::default())),
        })
        .await;

        Harness {
            store,
            gateway,
            address_book,
            service,
        }
    }

    fn create_request(items: Vec<(i64, i32)>) -> CreateOrderRequest {
        CreateOrderRequest {
            items: items
                .into_iter()
                .map(|(product_id, quantity)| CreateOrderItemRequest {
                    product_id,
                    quantity,
                })
                .collect(),
            receiver: "Jane Doe".into(),
            postcode: "04524".into(),
            addr_detail: "12 Tower St, unit 5".into(),
            save_as_default: true,
        }
    }

    fn cancel_request(reason: &str) -> OrderCancelRequest {
        OrderCancelRequest {
            reason: reason.into(),
        }
    }

    #[tokio::test]
    async fn creates_order_with_merged_items_and_snapshots() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "walnut desk", 20_000, 5);
        h.store.seed_product(20, 8, "desk mat", 5_000, 3);

        // Duplicate lines for product 10 must merge into one reservation.
        let response = h
            .service
            .create_order(1, &create_request(vec![(10, 2), (20, 1), (10, 1)]))
            .await
            .unwrap();

        assert_eq!(response.data.status, "CREATED");
        assert_eq!(response.data.order_amount, 65_000);

        let order = h.store.order(response.data.id);
        assert!(order.amount_invariant_holds());
        assert_eq!(order.total_product_amount, 65_000);
        assert_eq!(order.shipping_fee, 0);

        let items = h.store.items_of(order.order_id);
        assert_eq!(items.len(), 2);
        let desk = items.iter().find(|i| i.product_id == 10).unwrap();
        assert_eq!(desk.quantity, 3);
        assert_eq!(desk.unit_price, 20_000);
        assert_eq!(desk.subtotal_price, 60_000);
        assert_eq!(desk.seller_id, 7);
        assert_eq!(desk.product_name, "walnut desk");

        let subtotal_sum: i64 = items.iter().map(|i| i.subtotal_price).sum();
        assert_eq!(subtotal_sum, order.total_product_amount);

        assert_eq!(h.store.stock_of(10), 2);
        assert_eq!(h.store.stock_of(20), 2);
        assert_eq!(h.store.saved_addresses.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn live_sale_price_overrides_catalog_price() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "lamp", 30_000, 5);
        h.store.seed_live_price(10, 24_000);

        let response = h
            .service
            .create_order(1, &create_request(vec![(10, 1)]))
            .await
            .unwrap();

        // 24,000 product total is below the free-shipping threshold.
        assert_eq!(response.data.order_amount, 27_000);
        let items = h.store.items_of(response.data.id);
        assert_eq!(items[0].unit_price, 24_000);
    }

    #[tokio::test]
    async fn shipping_fee_boundary() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "desk", 50_000, 5);
        h.store.seed_product(20, 7, "chair", 49_999, 5);

        let at_threshold = h
            .service
            .create_order(1, &create_request(vec![(10, 1)]))
            .await
            .unwrap();
        assert_eq!(h.store.order(at_threshold.data.id).shipping_fee, 0);
        assert_eq!(at_threshold.data.order_amount, 50_000);

        let below_threshold = h
            .service
            .create_order(1, &create_request(vec![(20, 1)]))
            .await
            .unwrap();
        assert_eq!(h.store.order(below_threshold.data.id).shipping_fee, 3_000);
        assert_eq!(below_threshold.data.order_amount, 52_999);
    }

    #[tokio::test]
    async fn insufficient_stock_rejects_whole_order() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "desk", 20_000, 5);
        h.store.seed_product(20, 7, "chair", 10_000, 1);

        let err = h
            .service
            .create_order(1, &create_request(vec![(10, 2), (20, 2)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // No partial result: neither stock decrement survives, no order rows.
        assert_eq!(h.store.stock_of(10), 5);
        assert_eq!(h.store.stock_of(20), 1);
        assert_eq!(h.store.order_count(), 0);
    }

    #[tokio::test]
    async fn exhausted_stock_yields_conflict_for_the_loser() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_member(2);
        h.store.seed_product(10, 7, "limited desk", 20_000, 2);

        let winner = h
            .service
            .create_order(1, &create_request(vec![(10, 2)]))
            .await
            .unwrap();
        assert_eq!(h.store.stock_of(10), 0);
        assert_eq!(h.store.product_status(10), ProductStatus::SoldOut);

        let err = h
            .service
            .create_order(2, &create_request(vec![(10, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        assert_eq!(h.store.stock_of(10), 0);
        assert_eq!(h.store.order_count(), 1);
        assert_eq!(h.store.order(winner.data.id).status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn unknown_member_and_unknown_product_are_not_found() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "desk", 20_000, 5);

        let err = h
            .service
            .create_order(99, &create_request(vec![(10, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = h
            .service
            .create_order(1, &create_request(vec![(55, 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(h.store.order_count(), 0);
    }

    #[tokio::test]
    async fn address_book_failure_does_not_fail_creation() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "desk", 20_000, 5);
        h.address_book.fail.store(true, Ordering::SeqCst);

        let response = h
            .service
            .create_order(1, &create_request(vec![(10, 1)]))
            .await
            .unwrap();

        assert_eq!(h.store.order(response.data.id).status, OrderStatus::Created);
        assert!(h.store.saved_addresses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancel_created_order_is_idempotent() {
        let h = harness().await;
        h.store.seed_member(1);
        let order_id = h.store.seed_order(1, OrderStatus::Created, 30_000);

        let first = h
            .service
            .request_cancel(1, order_id, &cancel_request("changed mind"))
            .await
            .unwrap();
        assert_eq!(first.data.status, "CANCELLED");

        let after_first = h.store.order(order_id);
        assert_eq!(after_first.status, OrderStatus::Cancelled);
        assert_eq!(after_first.cancel_reason.as_deref(), Some("changed mind"));
        let cancelled_at = after_first.cancelled_at.unwrap();

        // Retry with a different reason: same answer, nothing overwritten.
        let second = h
            .service
            .request_cancel(1, order_id, &cancel_request("other reason"))
            .await
            .unwrap();
        assert_eq!(second.data.status, "CANCELLED");

        let after_second = h.store.order(order_id);
        assert_eq!(after_second.cancel_reason.as_deref(), Some("changed mind"));
        assert_eq!(after_second.cancelled_at.unwrap(), cancelled_at);
    }

    #[tokio::test]
    async fn paid_order_refund_survives_gateway_failure_and_retry() {
        let h = harness().await;
        h.store.seed_member(1);
        let order_id = h.store.seed_order(1, OrderStatus::Paid, 30_000);
        h.store.seed_payment(order_id, "pay-abc", 30_000);

        h.gateway.push_cancel_failure();
        let err = h
            .service
            .request_cancel(1, order_id, &cancel_request("defect"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Gateway(_)));

        // Well-defined intermediate state, safe to retry.
        let pending = h.store.order(order_id);
        assert_eq!(pending.status, OrderStatus::RefundRequested);
        assert_eq!(pending.cancel_reason.as_deref(), Some("defect"));
        assert!(pending.refunded_at.is_none());

        let retried = h
            .service
            .request_cancel(1, order_id, &cancel_request("defect"))
            .await
            .unwrap();
        assert_eq!(retried.data.status, "REFUNDED");

        let refunded = h.store.order(order_id);
        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert!(refunded.refunded_at.is_some());

        assert_eq!(h.gateway.cancel_calls.lock().unwrap().len(), 2);
        assert_eq!(h.store.refunds.lock().unwrap().len(), 1);
        assert_eq!(*h.store.sales_refreshes.lock().unwrap(), vec![order_id]);

        // A third call is an idempotent no-op against the refunded order.
        let third = h
            .service
            .request_cancel(1, order_id, &cancel_request("again"))
            .await
            .unwrap();
        assert_eq!(third.data.status, "REFUNDED");
        assert_eq!(h.gateway.cancel_calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn cancel_rejects_invalid_states_and_other_callers() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_member(2);
        let order_id = h.store.seed_order(1, OrderStatus::Completed, 30_000);

        let err = h
            .service
            .request_cancel(1, order_id, &cancel_request("too late"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(h.store.order(order_id).status, OrderStatus::Completed);

        let err = h
            .service
            .request_cancel(2, order_id, &cancel_request("not mine"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = h
            .service
            .request_cancel(1, order_id, &cancel_request("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn abandon_soft_deletes_created_order_with_items() {
        let h = harness().await;
        h.store.seed_member(1);
        h.store.seed_product(10, 7, "desk", 20_000, 5);
        let order_id = h.store.seed_order(1, OrderStatus::Created, 20_000);
        h.store.seed_item(order_id, 10, 7, 1);

        h.service.abandon_order(1, order_id).await.unwrap();

        let order = h.store.order(order_id);
        assert!(order.deleted_at.is_some());
        assert_eq!(order.status, OrderStatus::Created);
        assert!(
            h.store
                .items
                .lock()
                .unwrap()
                .iter()
                .filter(|i| i.order_id == order_id)
                .all(|i| i.deleted_at.is_some())
        );
    }

    #[tokio::test]
    async fn abandon_leaves_paid_orders_alone() {
        let h = harness().await;
        h.store.seed_member(1);
        let order_id = h.store.seed_order(1, OrderStatus::Paid, 20_000);

        h.service.abandon_order(1, order_id).await.unwrap();

        let order = h.store.order(order_id);
        assert_eq!(order.status, OrderStatus::Paid);
        assert!(order.deleted_at.is_none());
    }

    #[test]
    fn normalization_rules() {
        assert_eq!(normalize_receiver("  Jane  ").unwrap(), "Jane");
        let long_receiver = "a".repeat(30);
        assert_eq!(normalize_receiver(&long_receiver).unwrap().len(), 20);
        assert!(normalize_receiver("   ").is_err());

        assert_eq!(normalize_postcode(" 04524 ").unwrap(), "04524");
        assert!(normalize_postcode("4524").is_err());
        assert!(normalize_postcode("abcde").is_err());
        assert!(normalize_postcode("123456").is_err());

        let long_addr = "b".repeat(300);
        assert_eq!(normalize_addr_detail(&long_addr).unwrap().len(), 255);
        assert!(normalize_addr_detail("").is_err());

        assert_eq!(normalize_reason("  "), "customer request");
        assert_eq!(normalize_reason(" defect "), "defect");
    }

    #[test]
    fn shipping_fee_rule() {
        assert_eq!(shipping_fee_for(50_000), 0);
        assert_eq!(shipping_fee_for(120_000), 0);
        assert_eq!(shipping_fee_for(49_999), 3_000);
        assert_eq!(shipping_fee_for(0), 3_000);
    }
}
