use axum::{Json, extract::FromRequest, extract::Request};
use serde::de::DeserializeOwned;
use shared::errors::HttpError;
use validator::Validate;

/// JSON extractor that runs `validator` rules before the handler sees the
/// body. Deeper business validation stays in the services.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| HttpError::BadRequest(format!("Invalid JSON body: {e}")))?;

        value
            .validate()
            .map_err(|e| HttpError::BadRequest(format!("Validation failed: {e}")))?;

        Ok(ValidatedJson(value))
    }
}
