use crate::{service::EmailDispatchService, state::AppState};
use axum::{Extension, Json, extract::Path, response::IntoResponse, routing::get};
use chrono::{Duration, Utc};
use shared::{
    abstract_trait::DynTrackingStore,
    domain::responses::{
        DetailedMetricsResponse, HealthResponse, MetricsResponse, TemplateStats, TrackingRecord,
    },
    errors::{ErrorResponse, HttpError},
};
use std::sync::Arc;
use tracing::error;
use utoipa_axum::router::OpenApiRouter;

#[utoipa::path(
    get,
    path = "/api/monitoring/health",
    responses(
        (status = 200, description = "Service is up; smtp reports transport reachability", body = HealthResponse),
        (status = 503, description = "Health check failed", body = ErrorResponse)
    ),
    tag = "Monitoring"
)]
pub async fn health_check(
    Extension(dispatcher): Extension<Arc<EmailDispatchService>>,
) -> Result<impl IntoResponse, HttpError> {
    let connected = dispatcher.verify_connection().await.map_err(|e| {
        error!("Health check failed: {e}");
        HttpError::ServiceUnavailable("Service is unhealthy".to_string())
    })?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        smtp: if connected { "connected" } else { "disconnected" }.to_string(),
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/monitoring/metrics",
    responses(
        (status = 200, description = "Aggregate send statistics", body = MetricsResponse),
        (status = 500, description = "Statistics unavailable", body = ErrorResponse)
    ),
    tag = "Monitoring"
)]
pub async fn get_metrics(
    Extension(tracking): Extension<DynTrackingStore>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = tracking.stats().map_err(|e| {
        error!("Failed to retrieve metrics: {e}");
        HttpError::Internal("Failed to retrieve metrics".to_string())
    })?;

    Ok(Json(MetricsResponse {
        metrics: TemplateStats::from(stats),
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/monitoring/metrics/detailed",
    responses(
        (status = 200, description = "Overall, last hour and per-template statistics", body = DetailedMetricsResponse),
        (status = 500, description = "Statistics unavailable", body = ErrorResponse)
    ),
    tag = "Monitoring"
)]
pub async fn get_detailed_metrics(
    Extension(tracking): Extension<DynTrackingStore>,
) -> Result<impl IntoResponse, HttpError> {
    let detailed = tracking.stats().and_then(|overview| {
        Ok(DetailedMetricsResponse {
            overview: TemplateStats::from(overview),
            last_hour: tracking.stats_since(Duration::hours(1))?,
            by_template: tracking.stats_by_template()?,
            timestamp: Utc::now(),
        })
    });

    let detailed = detailed.map_err(|e| {
        error!("Failed to retrieve detailed metrics: {e}");
        HttpError::Internal("Failed to retrieve detailed metrics".to_string())
    })?;

    Ok(Json(detailed))
}

#[utoipa::path(
    get,
    path = "/api/monitoring/emails/{id}",
    params(("id" = String, Path, description = "Tracking id of the send attempt")),
    responses(
        (status = 200, description = "Recorded outcome of one send attempt", body = TrackingRecord),
        (status = 404, description = "Unknown tracking id", body = ErrorResponse),
        (status = 500, description = "Tracking store unavailable", body = ErrorResponse)
    ),
    tag = "Monitoring"
)]
pub async fn get_email_status(
    Extension(tracking): Extension<DynTrackingStore>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let record = tracking.status(&id).map_err(|e| {
        error!("Failed to retrieve status of email {id}: {e}");
        HttpError::Internal("Failed to retrieve email status".to_string())
    })?;

    record
        .map(Json)
        .ok_or_else(|| HttpError::NotFound("Email not found".to_string()))
}

pub fn monitoring_routes(app_state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .route("/api/monitoring/health", get(health_check))
        .route("/api/monitoring/metrics", get(get_metrics))
        .route("/api/monitoring/metrics/detailed", get(get_detailed_metrics))
        .route("/api/monitoring/emails/{id}", get(get_email_status))
        .layer(Extension(app_state.di_container.dispatcher.clone()))
        .layer(Extension(app_state.di_container.tracking.clone()))
        .with_state(app_state)
}
