use crate::abstract_trait::gateway::{
    GatewayCancellation, GatewayConfirmation, PaymentGatewayTrait,
};
use shared::{config::GatewayConfig, errors::GatewayError};

use async_trait::async_trait;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::{error, info};

/// HTTP adapter for the third-party payment processor. Every call carries an
/// `Idempotency-Key` derived from the payment reference, so a retry after a
/// timeout lands on the processor's cached result instead of a second charge
/// or refund.
pub struct PaymentGatewayClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PaymentGatewayClient {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn idempotency_key(parts: &[&str]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(parts.join(":").as_bytes());
        hex::encode(hasher.finalize())
    }

    fn rejection_message(body: &Value) -> String {
        body.get("message")
            .and_then(Value::as_str)
            .unwrap_or("gateway rejected request")
            .to_string()
    }
}

#[async_trait]
impl PaymentGatewayTrait for PaymentGatewayClient {
    async fn confirm(
        &self,
        payment_key: &str,
        gateway_order_id: &str,
        amount: i64,
    ) -> Result<GatewayConfirmation, GatewayError> {
        let amount_text = amount.to_string();
        let key = Self::idempotency_key(&[payment_key, gateway_order_id, &amount_text]);

        let response = self
            .http
            .post(format!("{}/v1/payments/confirm", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .header("Idempotency-Key", key)
            .json(&json!({
                "paymentKey": payment_key,
                "orderId": gateway_order_id,
                "amount": amount,
            }))
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        info!("💳 Gateway confirm answered {status_code} for order {gateway_order_id}");
        Ok(GatewayConfirmation { status_code, body })
    }

    async fn cancel(
        &self,
        payment_key: &str,
        gateway_order_id: &str,
        cancel_amount: i64,
        reason: &str,
    ) -> Result<GatewayCancellation, GatewayError> {
        let amount_text = cancel_amount.to_string();
        let scoped_order = format!("{gateway_order_id}:cancel");
        let key = Self::idempotency_key(&[payment_key, &scoped_order, &amount_text]);

        let response = self
            .http
            .post(format!("{}/v1/payments/{payment_key}/cancel", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .header("Idempotency-Key", key)
            .json(&json!({
                "cancelReason": reason,
                "cancelAmount": cancel_amount,
            }))
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        if status_code != 200 {
            error!("❌ Gateway cancel rejected ({status_code}) for order {gateway_order_id}");
            return Err(GatewayError::Rejected {
                status: status_code,
                message: Self::rejection_message(&body),
            });
        }

        let status = body
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("CANCELED")
            .to_string();

        let first_cancel = body
            .get("cancels")
            .and_then(Value::as_array)
            .and_then(|cancels| cancels.first());

        let refund_key = first_cancel.and_then(|c| {
            c.get("cancelRequestId")
                .or_else(|| c.get("transactionKey"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        let cancelled_amount = first_cancel.and_then(|c| c.get("cancelAmount")).and_then(Value::as_i64);
        let cancelled_at = first_cancel.and_then(|c| {
            c.get("canceledAt").and_then(Value::as_str).map(str::to_string)
        });

        info!("💸 Gateway cancel accepted for order {gateway_order_id}");
        Ok(GatewayCancellation {
            status,
            refund_key,
            cancelled_amount,
            cancelled_at,
        })
    }
}
