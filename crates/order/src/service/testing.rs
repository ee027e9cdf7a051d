//! In-memory fakes for the repository and collaborator traits, backing the
//! service tests without a database or network.

use crate::{
    abstract_trait::{
        address::AddressBookTrait,
        checkout::{CheckoutTx, CheckoutTxFactory},
        gateway::{GatewayCancellation, GatewayConfirmation, PaymentGatewayTrait},
        member::MemberVerifierTrait,
        order::repository::{OrderCommandRepositoryTrait, OrderQueryRepositoryTrait},
        order_item::OrderItemQueryRepositoryTrait,
        payment::PaymentRepositoryTrait,
        pricing::PriceResolverTrait,
        sales::SalesAggregatorTrait,
        seller::SellerVerifierTrait,
    },
    domain::requests::{
        order::{NewOrderItemRecord, NewOrderRecord},
        payment::{NewPaymentRecord, NewRefundRecord},
    },
    model::{
        order::{Order as OrderModel, OrderStatus},
        order_item::OrderItem as OrderItemModel,
        payment::Payment as PaymentModel,
        product::{ProductStatus, StockRecord},
    },
};
use shared::errors::{GatewayError, RepositoryError};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicI64, Ordering},
};

fn now() -> NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

#[derive(Default)]
pub struct InMemoryStore {
    pub products: Mutex<HashMap<i64, StockRecord>>,
    pub live_prices: Mutex<HashMap<i64, i64>>,
    pub orders: Mutex<HashMap<i64, OrderModel>>,
    pub items: Mutex<Vec<OrderItemModel>>,
    pub payments: Mutex<Vec<PaymentModel>>,
    pub refunds: Mutex<Vec<NewRefundRecord>>,
    pub members: Mutex<HashSet<i64>>,
    pub sellers: Mutex<HashSet<i64>>,
    pub saved_addresses: Mutex<Vec<(i64, String, bool)>>,
    pub sales_refreshes: Mutex<Vec<i64>>,
    next_order_id: AtomicI64,
    next_item_id: AtomicI64,
    next_payment_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_order_id: AtomicI64::new(1),
            next_item_id: AtomicI64::new(1),
            next_payment_id: AtomicI64::new(1),
            ..Default::default()
        })
    }

    pub fn seed_member(&self, member_id: i64) {
        self.members.lock().unwrap().insert(member_id);
    }

    pub fn seed_seller(&self, seller_id: i64) {
        self.sellers.lock().unwrap().insert(seller_id);
    }

    pub fn seed_product(
        &self,
        product_id: i64,
        seller_id: i64,
        name: &str,
        price: i64,
        stock_qty: i32,
    ) {
        self.products.lock().unwrap().insert(
            product_id,
            StockRecord {
                product_id,
                seller_id,
                product_name: name.to_string(),
                price,
                stock_qty,
                status: ProductStatus::OnSale,
                deleted_at: None,
            },
        );
    }

    pub fn seed_live_price(&self, product_id: i64, sale_price: i64) {
        self.live_prices
            .lock()
            .unwrap()
            .insert(product_id, sale_price);
    }

    pub fn stock_of(&self, product_id: i64) -> i32 {
        self.products.lock().unwrap()[&product_id].stock_qty
    }

    pub fn product_status(&self, product_id: i64) -> ProductStatus {
        self.products.lock().unwrap()[&product_id].status
    }

    pub fn order(&self, order_id: i64) -> OrderModel {
        self.orders.lock().unwrap()[&order_id].clone()
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn items_of(&self, order_id: i64) -> Vec<OrderItemModel> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.order_id == order_id)
            .cloned()
            .collect()
    }

    /// Seeds an order directly in the given status, bypassing checkout.
    pub fn seed_order(&self, member_id: i64, status: OrderStatus, order_amount: i64) -> i64 {
        let order_id = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let order = OrderModel {
            order_id,
            member_id,
            order_number: format!("ORD-{order_id:09}-0000"),
            receiver: "tester".into(),
            postcode: "04524".into(),
            addr_detail: "unit 5".into(),
            total_product_amount: order_amount,
            shipping_fee: 0,
            discount_fee: 0,
            order_amount,
            status,
            cancel_reason: None,
            paid_at: if matches!(
                status,
                OrderStatus::Paid | OrderStatus::RefundRequested | OrderStatus::Refunded
            ) {
                Some(now())
            } else {
                None
            },
            cancelled_at: None,
            refunded_at: None,
            created_at: Some(now()),
            updated_at: Some(now()),
            deleted_at: None,
        };
        self.orders.lock().unwrap().insert(order_id, order);
        order_id
    }

    pub fn seed_item(&self, order_id: i64, product_id: i64, seller_id: i64, quantity: i32) {
        let item_id = self.next_item_id.fetch_add(1, Ordering::SeqCst);
        let unit_price = self
            .products
            .lock()
            .unwrap()
            .get(&product_id)
            .map(|p| p.price)
            .unwrap_or(0);
        self.items.lock().unwrap().push(OrderItemModel {
            order_item_id: item_id,
            order_id,
            product_id,
            seller_id,
            product_name: format!("product-{product_id}"),
            unit_price,
            quantity,
            subtotal_price: unit_price * quantity as i64,
            created_at: Some(now()),
            updated_at: Some(now()),
            deleted_at: None,
        });
    }

    pub fn seed_payment(&self, order_id: i64, payment_key: &str, amount: i64) {
        let payment_id = self.next_payment_id.fetch_add(1, Ordering::SeqCst);
        self.payments.lock().unwrap().push(PaymentModel {
            payment_id,
            payment_key: payment_key.to_string(),
            gateway_order_id: order_id.to_string(),
            method: Some("CARD".into()),
            status: "DONE".into(),
            total_amount: amount,
            order_ref: order_id.to_string(),
            requested_at: Some(now()),
            approved_at: Some(now()),
            created_at: Some(now()),
        });
    }
}

// ---------------------------------------------------------------------------
// Checkout transaction
// ---------------------------------------------------------------------------

pub struct FakeCheckoutTxFactory {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl CheckoutTxFactory for FakeCheckoutTxFactory {
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, RepositoryError> {
        Ok(Box::new(FakeCheckoutTx {
            store: self.store.clone(),
            stock_after: HashMap::new(),
            sold_out: Vec::new(),
            staged_order: None,
            staged_items: Vec::new(),
        }))
    }
}

/// Stages every change and applies it only on `commit`, mirroring the
/// all-or-nothing property of the real transaction.
pub struct FakeCheckoutTx {
    store: Arc<InMemoryStore>,
    stock_after: HashMap<i64, i32>,
    sold_out: Vec<i64>,
    staged_order: Option<OrderModel>,
    staged_items: Vec<OrderItemModel>,
}

#[async_trait]
impl CheckoutTx for FakeCheckoutTx {
    async fn lock_stock(
        &mut self,
        product_id: i64,
        required: ProductStatus,
    ) -> Result<Option<StockRecord>, RepositoryError> {
        let products = self.store.products.lock().unwrap();
        Ok(products
            .get(&product_id)
            .filter(|p| {
                (p.status == required || p.status == ProductStatus::SoldOut)
                    && p.deleted_at.is_none()
            })
            .cloned())
    }

    async fn decrease_stock(
        &mut self,
        product_id: i64,
        quantity: i32,
    ) -> Result<i32, RepositoryError> {
        let current = match self.stock_after.get(&product_id) {
            Some(qty) => *qty,
            None => {
                let products = self.store.products.lock().unwrap();
                products
                    .get(&product_id)
                    .map(|p| p.stock_qty)
                    .ok_or(RepositoryError::NotFound)?
            }
        };

        if current < quantity {
            return Err(RepositoryError::Conflict(format!(
                "insufficient stock: product_id={product_id}"
            )));
        }

        let remaining = current - quantity;
        self.stock_after.insert(product_id, remaining);
        Ok(remaining)
    }

    async fn mark_sold_out(&mut self, product_id: i64) -> Result<(), RepositoryError> {
        self.sold_out.push(product_id);
        Ok(())
    }

    async fn insert_order(&mut self, rec: &NewOrderRecord) -> Result<OrderModel, RepositoryError> {
        let order_id = self.store.next_order_id.fetch_add(1, Ordering::SeqCst);
        let order = OrderModel {
            order_id,
            member_id: rec.member_id,
            order_number: rec.order_number.clone(),
            receiver: rec.receiver.clone(),
            postcode: rec.postcode.clone(),
            addr_detail: rec.addr_detail.clone(),
            total_product_amount: rec.total_product_amount,
            shipping_fee: rec.shipping_fee,
            discount_fee: rec.discount_fee,
            order_amount: rec.order_amount,
            status: rec.status,
            cancel_reason: None,
            paid_at: None,
            cancelled_at: None,
            refunded_at: None,
            created_at: Some(now()),
            updated_at: Some(now()),
            deleted_at: None,
        };
        self.staged_order = Some(order.clone());
        Ok(order)
    }

    async fn insert_order_item(
        &mut self,
        rec: &NewOrderItemRecord,
    ) -> Result<OrderItemModel, RepositoryError> {
        let item_id = self.store.next_item_id.fetch_add(1, Ordering::SeqCst);
        let item = OrderItemModel {
            order_item_id: item_id,
            order_id: rec.order_id,
            product_id: rec.product_id,
            seller_id: rec.seller_id,
            product_name: rec.product_name.clone(),
            unit_price: rec.unit_price,
            quantity: rec.quantity,
            subtotal_price: rec.subtotal_price,
            created_at: Some(now()),
            updated_at: Some(now()),
            deleted_at: None,
        };
        self.staged_items.push(item.clone());
        Ok(item)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let mut products = self.store.products.lock().unwrap();
        for (product_id, remaining) in &self.stock_after {
            if let Some(product) = products.get_mut(product_id) {
                product.stock_qty = *remaining;
            }
        }
        for product_id in &self.sold_out {
            if let Some(product) = products.get_mut(product_id) {
                product.status = ProductStatus::SoldOut;
            }
        }
        drop(products);

        if let Some(order) = self.staged_order {
            self.store.orders.lock().unwrap().insert(order.order_id, order);
        }
        self.store.items.lock().unwrap().extend(self.staged_items);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Order repositories
// ---------------------------------------------------------------------------

pub struct FakeOrderCommandRepository {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl OrderCommandRepositoryTrait for FakeOrderCommandRepository {
    async fn cancel_created_order(
        &self,
        order_id: i64,
        member_id: i64,
        reason: &str,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let mut orders = self.store.orders.lock().unwrap();
        match orders.get_mut(&order_id) {
            Some(order)
                if order.member_id == member_id
                    && order.deleted_at.is_none()
                    && order.status == OrderStatus::Created =>
            {
                order.status = OrderStatus::Cancelled;
                order.cancel_reason.get_or_insert_with(|| reason.to_string());
                order.cancelled_at.get_or_insert(now);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn request_refund_for_paid_order(
        &self,
        order_id: i64,
        member_id: i64,
        reason: &str,
    ) -> Result<u64, RepositoryError> {
        let mut orders = self.store.orders.lock().unwrap();
        match orders.get_mut(&order_id) {
            Some(order)
                if order.member_id == member_id
                    && order.deleted_at.is_none()
                    && order.status == OrderStatus::Paid =>
            {
                order.status = OrderStatus::RefundRequested;
                order.cancel_reason.get_or_insert_with(|| reason.to_string());
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn approve_refund_request(
        &self,
        order_id: i64,
        member_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let mut orders = self.store.orders.lock().unwrap();
        match orders.get_mut(&order_id) {
            Some(order)
                if order.member_id == member_id
                    && order.deleted_at.is_none()
                    && order.status == OrderStatus::RefundRequested =>
            {
                order.status = OrderStatus::Refunded;
                order.refunded_at.get_or_insert(now);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn mark_paid_order(
        &self,
        order_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let mut orders = self.store.orders.lock().unwrap();
        match orders.get_mut(&order_id) {
            Some(order) if order.deleted_at.is_none() && order.status == OrderStatus::Created => {
                order.status = OrderStatus::Paid;
                order.paid_at.get_or_insert(now);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn abandon_created_order(
        &self,
        order_id: i64,
        member_id: i64,
        now: NaiveDateTime,
    ) -> Result<u64, RepositoryError> {
        let updated = {
            let mut orders = self.store.orders.lock().unwrap();
            match orders.get_mut(&order_id) {
                Some(order)
                    if order.member_id == member_id
                        && order.deleted_at.is_none()
                        && order.status == OrderStatus::Created =>
                {
                    order.deleted_at = Some(now);
                    1
                }
                _ => 0,
            }
        };

        if updated > 0 {
            for item in self.store.items.lock().unwrap().iter_mut() {
                if item.order_id == order_id && item.deleted_at.is_none() {
                    item.deleted_at = Some(now);
                }
            }
        }
        Ok(updated)
    }
}

pub struct FakeOrderQueryRepository {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl OrderQueryRepositoryTrait for FakeOrderQueryRepository {
    async fn find_by_id(&self, order_id: i64) -> Result<Option<OrderModel>, RepositoryError> {
        let orders = self.store.orders.lock().unwrap();
        Ok(orders
            .get(&order_id)
            .filter(|o| o.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<OrderModel>, RepositoryError> {
        let orders = self.store.orders.lock().unwrap();
        Ok(orders
            .values()
            .find(|o| o.order_number == order_number && o.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_member(&self, member_id: i64) -> Result<Vec<OrderModel>, RepositoryError> {
        let orders = self.store.orders.lock().unwrap();
        let mut found: Vec<OrderModel> = orders
            .values()
            .filter(|o| o.member_id == member_id && o.deleted_at.is_none())
            .cloned()
            .collect();
        found.sort_by(|a, b| b.order_id.cmp(&a.order_id));
        Ok(found)
    }

    async fn find_seller_orders(
        &self,
        seller_id: i64,
        status: Option<OrderStatus>,
        page: i32,
        page_size: i32,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        let seller_order_ids: HashSet<i64> = self
            .store
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.seller_id == seller_id && i.deleted_at.is_none())
            .map(|i| i.order_id)
            .collect();

        let orders = self.store.orders.lock().unwrap();
        let mut matching: Vec<OrderModel> = orders
            .values()
            .filter(|o| {
                o.deleted_at.is_none()
                    && seller_order_ids.contains(&o.order_id)
                    && status.is_none_or(|s| o.status == s)
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.order_id.cmp(&a.order_id));

        let total = matching.len() as i64;
        let offset = ((page.max(1) - 1) * page_size) as usize;
        let paged = matching
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();
        Ok((paged, total))
    }
}

pub struct FakeOrderItemQueryRepository {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl OrderItemQueryRepositoryTrait for FakeOrderItemQueryRepository {
    async fn find_by_order(&self, order_id: i64) -> Result<Vec<OrderItemModel>, RepositoryError> {
        let items = self.store.items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|i| i.order_id == order_id && i.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn find_by_order_for_seller(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<Vec<OrderItemModel>, RepositoryError> {
        let items = self.store.items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|i| {
                i.order_id == order_id && i.seller_id == seller_id && i.deleted_at.is_none()
            })
            .cloned()
            .collect())
    }

    async fn find_by_orders_for_seller(
        &self,
        order_ids: &[i64],
        seller_id: i64,
    ) -> Result<Vec<OrderItemModel>, RepositoryError> {
        let items = self.store.items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|i| {
                order_ids.contains(&i.order_id)
                    && i.seller_id == seller_id
                    && i.deleted_at.is_none()
            })
            .cloned()
            .collect())
    }

    async fn exists_for_seller(
        &self,
        order_id: i64,
        seller_id: i64,
    ) -> Result<bool, RepositoryError> {
        let items = self.store.items.lock().unwrap();
        Ok(items.iter().any(|i| {
            i.order_id == order_id && i.seller_id == seller_id && i.deleted_at.is_none()
        }))
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

pub struct FakePriceResolver {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl PriceResolverTrait for FakePriceResolver {
    async fn current_price(&self, product_id: i64) -> Result<i64, RepositoryError> {
        if let Some(price) = self.store.live_prices.lock().unwrap().get(&product_id) {
            return Ok(*price);
        }
        self.store
            .products
            .lock()
            .unwrap()
            .get(&product_id)
            .filter(|p| p.deleted_at.is_none())
            .map(|p| p.price)
            .ok_or(RepositoryError::NotFound)
    }
}

pub struct FakeMemberVerifier {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl MemberVerifierTrait for FakeMemberVerifier {
    async fn exists(&self, member_id: i64) -> Result<bool, RepositoryError> {
        Ok(self.store.members.lock().unwrap().contains(&member_id))
    }
}

pub struct FakeSellerVerifier {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl SellerVerifierTrait for FakeSellerVerifier {
    async fn is_active(&self, seller_id: i64) -> Result<bool, RepositoryError> {
        Ok(self.store.sellers.lock().unwrap().contains(&seller_id))
    }
}

pub struct FakeAddressBook {
    pub store: Arc<InMemoryStore>,
    pub fail: AtomicBool,
}

impl FakeAddressBook {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self {
            store,
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AddressBookTrait for FakeAddressBook {
    async fn save_from_order(
        &self,
        member_id: i64,
        _receiver: &str,
        _postcode: &str,
        addr_detail: &str,
        make_default: bool,
    ) -> Result<(), RepositoryError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Custom("address book unavailable".into()));
        }
        self.store
            .saved_addresses
            .lock()
            .unwrap()
            .push((member_id, addr_detail.to_string(), make_default));
        Ok(())
    }
}

pub struct FakeSalesAggregator {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl SalesAggregatorTrait for FakeSalesAggregator {
    async fn refresh_for_order(&self, order_id: i64) -> Result<(), RepositoryError> {
        self.store.sales_refreshes.lock().unwrap().push(order_id);
        Ok(())
    }
}

pub struct FakePaymentRepository {
    pub store: Arc<InMemoryStore>,
}

#[async_trait]
impl PaymentRepositoryTrait for FakePaymentRepository {
    async fn find_by_payment_key(
        &self,
        payment_key: &str,
    ) -> Result<Option<PaymentModel>, RepositoryError> {
        let payments = self.store.payments.lock().unwrap();
        Ok(payments
            .iter()
            .find(|p| p.payment_key == payment_key)
            .cloned())
    }

    async fn find_by_order_ref(
        &self,
        order_id: i64,
        order_number: &str,
    ) -> Result<Option<PaymentModel>, RepositoryError> {
        let id_text = order_id.to_string();
        let payments = self.store.payments.lock().unwrap();
        Ok(payments
            .iter()
            .find(|p| {
                p.order_ref == id_text
                    || p.gateway_order_id == id_text
                    || p.order_ref == order_number
                    || p.gateway_order_id == order_number
            })
            .cloned())
    }

    async fn insert_payment(
        &self,
        rec: &NewPaymentRecord,
    ) -> Result<PaymentModel, RepositoryError> {
        let payment_id = self.store.next_payment_id.fetch_add(1, Ordering::SeqCst);
        let payment = PaymentModel {
            payment_id,
            payment_key: rec.payment_key.clone(),
            gateway_order_id: rec.gateway_order_id.clone(),
            method: rec.method.clone(),
            status: rec.status.clone(),
            total_amount: rec.total_amount,
            order_ref: rec.order_ref.clone(),
            requested_at: rec.requested_at,
            approved_at: rec.approved_at,
            created_at: Some(now()),
        };
        self.store.payments.lock().unwrap().push(payment.clone());
        Ok(payment)
    }

    async fn update_payment_status(
        &self,
        payment_key: &str,
        status: &str,
    ) -> Result<(), RepositoryError> {
        for payment in self.store.payments.lock().unwrap().iter_mut() {
            if payment.payment_key == payment_key {
                payment.status = status.to_string();
            }
        }
        Ok(())
    }

    async fn insert_refund_if_absent(
        &self,
        rec: &NewRefundRecord,
    ) -> Result<bool, RepositoryError> {
        let mut refunds = self.store.refunds.lock().unwrap();
        if refunds.iter().any(|r| r.payment_key == rec.payment_key) {
            return Ok(false);
        }
        refunds.push(rec.clone());
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Programmable gateway double. Queued results are consumed first; an empty
/// queue answers with a canned success built from the call arguments.
#[derive(Default)]
pub struct FakeGateway {
    pub confirm_results: Mutex<VecDeque<Result<GatewayConfirmation, GatewayError>>>,
    pub cancel_results: Mutex<VecDeque<Result<GatewayCancellation, GatewayError>>>,
    pub confirm_calls: Mutex<Vec<(String, String, i64)>>,
    pub cancel_calls: Mutex<Vec<(String, i64, String)>>,
}

impl FakeGateway {
    pub fn push_cancel_failure(&self) {
        self.cancel_results
            .lock()
            .unwrap()
            .push_back(Err(GatewayError::Rejected {
                status: 503,
                message: "gateway unavailable".into(),
            }));
    }
}

#[async_trait]
impl PaymentGatewayTrait for FakeGateway {
    async fn confirm(
        &self,
        payment_key: &str,
        gateway_order_id: &str,
        amount: i64,
    ) -> Result<GatewayConfirmation, GatewayError> {
        self.confirm_calls.lock().unwrap().push((
            payment_key.to_string(),
            gateway_order_id.to_string(),
            amount,
        ));

        if let Some(result) = self.confirm_results.lock().unwrap().pop_front() {
            return result;
        }

        Ok(GatewayConfirmation {
            status_code: 200,
            body: json!({
                "paymentKey": payment_key,
                "orderId": gateway_order_id,
                "status": "DONE",
                "totalAmount": amount,
                "method": "CARD",
                "requestedAt": "2025-01-01T00:00:00+00:00",
                "approvedAt": "2025-01-01T00:00:05+00:00",
            }),
        })
    }

    async fn cancel(
        &self,
        payment_key: &str,
        _gateway_order_id: &str,
        cancel_amount: i64,
        reason: &str,
    ) -> Result<GatewayCancellation, GatewayError> {
        self.cancel_calls.lock().unwrap().push((
            payment_key.to_string(),
            cancel_amount,
            reason.to_string(),
        ));

        if let Some(result) = self.cancel_results.lock().unwrap().pop_front() {
            return result;
        }

        Ok(GatewayCancellation {
            status: "CANCELED".into(),
            refund_key: Some(format!("cancel-{payment_key}")),
            cancelled_amount: Some(cancel_amount),
            cancelled_at: Some("2025-01-01T01:00:00+00:00".into()),
        })
    }
}
