mod api;
mod tracking;

pub use self::api::MessageResponse;
pub use self::tracking::{
    DetailedMetricsResponse, EmailStats, HealthResponse, MetricsResponse, TemplateStats,
    TrackingRecord, TrackingStatus, success_rate,
};
