use axum::{extract::Request, middleware::Next, response::Response};
use shared::errors::HttpError;

/// Caller identities resolved by the upstream auth layer (out of scope here)
/// and forwarded as trusted headers. The engine only checks presence and
/// shape; ownership checks happen in the services.
#[derive(Debug, Clone, Copy)]
pub struct AuthMember(pub i64);

#[derive(Debug, Clone, Copy)]
pub struct AuthSeller(pub i64);

fn header_id(req: &Request, name: &str) -> Option<i64> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<i64>().ok())
        .filter(|id| *id > 0)
}

pub async fn member_identity_middleware(
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let member_id = header_id(&req, "x-member-id")
        .ok_or_else(|| HttpError::Forbidden("missing member identity".into()))?;

    req.extensions_mut().insert(AuthMember(member_id));
    Ok(next.run(req).await)
}

pub async fn seller_identity_middleware(
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    let seller_id = header_id(&req, "x-seller-id")
        .ok_or_else(|| HttpError::Forbidden("missing seller identity".into()))?;

    req.extensions_mut().insert(AuthSeller(seller_id));
    Ok(next.run(req).await)
}
