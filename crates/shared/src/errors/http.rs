use crate::errors::{error::ErrorResponse, service::ServiceError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong!";

/// Application error tagged with the status code it answers with.
#[derive(Debug)]
pub enum HttpError {
    BadRequest(String),
    NotFound(String),
    TooManyRequests(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HttpError::NotFound(_) => StatusCode::NOT_FOUND,
            HttpError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            HttpError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            HttpError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            HttpError::BadRequest(msg)
            | HttpError::NotFound(msg)
            | HttpError::TooManyRequests(msg)
            | HttpError::ServiceUnavailable(msg)
            | HttpError::Internal(msg) => msg,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => HttpError::BadRequest(msg),
            other => {
                error!("Unhandled service error: {other}");
                HttpError::Internal(GENERIC_ERROR_MESSAGE.to_string())
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = Json(ErrorResponse::new(self.message()));

        (status, body).into_response()
    }
}
