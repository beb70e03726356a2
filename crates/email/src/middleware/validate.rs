use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::requests::{RequestSchema, parse_request},
    errors::HttpError,
};
use tracing::debug;
use validator::Validate;

/// JSON body that passed its schema; any rejection is a 400.
pub struct SimpleValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for SimpleValidatedJson<T>
where
    T: DeserializeOwned + Validate + RequestSchema + Send,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(body) = axum::Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                debug!("Rejected email request body: {}", rejection.body_text());
                HttpError::BadRequest(rejection.body_text())
            })?;

        let value = parse_request::<T>(body).map_err(|message| {
            debug!("Email request failed validation: {message}");
            HttpError::BadRequest(message)
        })?;

        Ok(Self(value))
    }
}
