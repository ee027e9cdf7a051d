use serde::{Deserialize, Serialize};

/// Gateway confirm outcome passed through to the storefront: the processor's
/// own status code and JSON body, as the checkout widget expects them.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfirmPaymentResponse {
    #[serde(rename = "status_code")]
    pub status_code: u16,
    pub body: serde_json::Value,
}
