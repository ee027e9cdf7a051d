use crate::{
    abstract_trait::{
        address::DynAddressBook,
        checkout::DynCheckoutTxFactory,
        gateway::DynPaymentGateway,
        member::DynMemberVerifier,
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::{DynOrderCommandService, DynOrderQueryService},
        },
        order_item::DynOrderItemQueryRepository,
        payment::{DynPaymentCommandService, DynPaymentRepository},
        pricing::DynPriceResolver,
        sales::DynSalesAggregator,
        seller::{DynSellerOrderQueryService, DynSellerVerifier},
    },
    gateway::PaymentGatewayClient,
    repository::{
        address::AddressBookRepository,
        checkout::PgCheckoutTxFactory,
        member::MemberVerifierRepository,
        order::{OrderCommandRepository, OrderQueryRepository},
        order_item::OrderItemQueryRepository,
        payment::PaymentRepository,
        pricing::LiveSalePriceResolver,
        sales::SalesAggregatorRepository,
        seller::SellerVerifierRepository,
    },
    service::{
        order::{OrderCommandService, OrderCommandServiceDeps, OrderQueryService},
        payment::{PaymentCommandService, PaymentCommandServiceDeps},
        seller::SellerOrderQueryService,
    },
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    config::{Config, ConnectionPool},
    utils::Metrics,
};
use std::{fmt, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DependenciesInject {
    pub order_command: DynOrderCommandService,
    pub order_query: DynOrderQueryService,
    pub seller_query: DynSellerOrderQueryService,
    pub payment_command: DynPaymentCommandService,
}

impl fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("order_command", &"OrderCommandService")
            .field("order_query", &"OrderQueryService")
            .field("seller_query", &"SellerOrderQueryService")
            .field("payment_command", &"PaymentCommandService")
            .finish()
    }
}

impl DependenciesInject {
    pub async fn new(
        pool: ConnectionPool,
        config: &Config,
        registry: Arc<Mutex<Registry>>,
    ) -> Result<Self> {
        let order_command_repo: DynOrderCommandRepository =
            Arc::new(OrderCommandRepository::new(pool.clone()));
        let order_query_repo: DynOrderQueryRepository =
            Arc::new(OrderQueryRepository::new(pool.clone()));
        let order_item_query_repo: DynOrderItemQueryRepository =
            Arc::new(OrderItemQueryRepository::new(pool.clone()));
        let checkout: DynCheckoutTxFactory = Arc::new(PgCheckoutTxFactory::new(pool.clone()));
        let pricing: DynPriceResolver = Arc::new(LiveSalePriceResolver::new(pool.clone()));
        let members: DynMemberVerifier = Arc::new(MemberVerifierRepository::new(pool.clone()));
        let sellers: DynSellerVerifier = Arc::new(SellerVerifierRepository::new(pool.clone()));
        let address_book: DynAddressBook = Arc::new(AddressBookRepository::new(pool.clone()));
        let sales: DynSalesAggregator = Arc::new(SalesAggregatorRepository::new(pool.clone()));
        let payments: DynPaymentRepository = Arc::new(PaymentRepository::new(pool.clone()));

        let gateway: DynPaymentGateway = Arc::new(
            PaymentGatewayClient::new(&config.gateway)
                .context("failed to build payment gateway client")?,
        );

        let order_command: DynOrderCommandService =
            Arc::new(OrderCommandService::new(OrderCommandServiceDeps {
                checkout,
                pricing: pricing.clone(),
                members: members.clone(),
                command: order_command_repo.clone(),
                query: order_query_repo.clone(),
                payments: payments.clone(),
                gateway: gateway.clone(),
                address_book,
                sales,
                metrics: Arc::new(Mutex::new(Metrics::default())),
                registry: registry.clone(),
            })
            .await);

        let order_query: DynOrderQueryService = Arc::new(
            OrderQueryService::new(
                members.clone(),
                order_query_repo.clone(),
                order_item_query_repo.clone(),
                Arc::new(Mutex::new(Metrics::default())),
                registry.clone(),
            )
            .await,
        );

        let seller_query: DynSellerOrderQueryService = Arc::new(
            SellerOrderQueryService::new(
                sellers,
                order_query_repo.clone(),
                order_item_query_repo.clone(),
                Arc::new(Mutex::new(Metrics::default())),
                registry.clone(),
            )
            .await,
        );

        let payment_command: DynPaymentCommandService =
            Arc::new(PaymentCommandService::new(PaymentCommandServiceDeps {
                query: order_query_repo,
                items: order_item_query_repo,
                command: order_command_repo,
                payments,
                pricing,
                gateway,
                metrics: Arc::new(Mutex::new(Metrics::default())),
                registry,
            })
            .await);

        Ok(Self {
            order_command,
            order_query,
            seller_query,
            payment_command,
        })
    }
}
