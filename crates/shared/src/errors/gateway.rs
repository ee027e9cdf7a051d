use thiserror::Error;

/// Failures talking to the third-party payment processor. `Rejected` carries
/// the processor's own status code and message; `Transport` covers timeouts
/// and connection errors. Either way the order stays in its retry-safe state.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Gateway returned an unusable response: {0}")]
    InvalidResponse(String),
}
