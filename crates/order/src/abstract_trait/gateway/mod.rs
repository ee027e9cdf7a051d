use async_trait::async_trait;
use shared::errors::GatewayError;
use std::sync::Arc;

pub type DynPaymentGateway = Arc<dyn PaymentGatewayTrait + Send + Sync>;

/// Confirm outcome, passed through verbatim: the processor's status code and
/// JSON body. A non-2xx code is still `Ok` here — the storefront widget wants
/// the processor's own error body.
#[derive(Debug, Clone)]
pub struct GatewayConfirmation {
    pub status_code: u16,
    pub body: serde_json::Value,
}

impl GatewayConfirmation {
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Parsed cancel outcome. Only returned on processor-acknowledged success;
/// rejections surface as `GatewayError::Rejected`.
#[derive(Debug, Clone)]
pub struct GatewayCancellation {
    pub status: String,
    pub refund_key: Option<String>,
    pub cancelled_amount: Option<i64>,
    pub cancelled_at: Option<String>,
}

/// Third-party payment processor. Both operations carry a stable
/// idempotency key derived from the payment reference, so retrying after a
/// timeout can never double-charge or double-refund.
#[async_trait]
pub trait PaymentGatewayTrait {
    async fn confirm(
        &self,
        payment_key: &str,
        gateway_order_id: &str,
        amount: i64,
    ) -> Result<GatewayConfirmation, GatewayError>;

    async fn cancel(
        &self,
        payment_key: &str,
        gateway_order_id: &str,
        cancel_amount: i64,
        reason: &str,
    ) -> Result<GatewayCancellation, GatewayError>;
}
