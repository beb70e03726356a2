use crate::abstract_trait::rate_limit::DynRateLimitMiddleware;
use axum::{
    Extension,
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::errors::HttpError;
use tracing::warn;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

pub async fn rate_limit_middleware(
    Extension(rate_limiter): Extension<DynRateLimitMiddleware>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, HttpError> {
    let client_ip = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let key = format!("rate_limit:{client_ip}");

    let (allowed, current) = rate_limiter.check_rate_limit(&key);

    if !allowed {
        warn!(
            "Rate limit exceeded for IP: {} (requests: {})",
            client_ip, current
        );
        return Err(HttpError::TooManyRequests(
            "Too many requests, please try again later".to_string(),
        ));
    }

    let mut response = next.run(req).await.into_response();
    let remaining = rate_limiter.get_remaining(&key);
    response
        .headers_mut()
        .insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from(remaining));

    Ok(response)
}
