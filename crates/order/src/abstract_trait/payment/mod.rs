use crate::domain::{
    requests::payment::{ConfirmPaymentRequest, NewPaymentRecord, NewRefundRecord},
    response::payment::ConfirmPaymentResponse,
};
use crate::model::payment::Payment as PaymentModel;
use async_trait::async_trait;
use shared::errors::{RepositoryError, ServiceError};
use std::sync::Arc;

pub type DynPaymentRepository = Arc<dyn PaymentRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait PaymentRepositoryTrait {
    async fn find_by_payment_key(
        &self,
        payment_key: &str,
    ) -> Result<Option<PaymentModel>, RepositoryError>;

    /// Finds the payment attached to an order, matching either the internal
    /// id (as text) or the external order number against the gateway refs.
    async fn find_by_order_ref(
        &self,
        order_id: i64,
        order_number: &str,
    ) -> Result<Option<PaymentModel>, RepositoryError>;

    async fn insert_payment(&self, rec: &NewPaymentRecord)
    -> Result<PaymentModel, RepositoryError>;

    async fn update_payment_status(
        &self,
        payment_key: &str,
        status: &str,
    ) -> Result<(), RepositoryError>;

    /// Inserts the refund record unless one already exists for the payment
    /// key. Returns whether a row was written.
    async fn insert_refund_if_absent(
        &self,
        rec: &NewRefundRecord,
    ) -> Result<bool, RepositoryError>;
}

pub type DynPaymentCommandService = Arc<dyn PaymentCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait PaymentCommandServiceTrait {
    async fn confirm_payment(
        &self,
        req: &ConfirmPaymentRequest,
    ) -> Result<ConfirmPaymentResponse, ServiceError>;
}
