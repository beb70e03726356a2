use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrackingStatus {
    Sent,
    Failed,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    pub email_id: String,
    pub to: String,
    pub template: String,
    pub sent_at: DateTime<Utc>,
    pub status: TrackingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmailStats {
    pub total: u64,
    pub sent: u64,
    pub failed: u64,
}

/// Percentage of sent records; 0 when there are none.
pub fn success_rate(sent: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        sent as f64 / total as f64 * 100.0
    }
}

impl EmailStats {
    pub fn success_rate(&self) -> f64 {
        success_rate(self.sent, self.total)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStats {
    pub total: u64,
    pub sent: u64,
    pub failed: u64,
    pub success_rate: f64,
}

impl From<EmailStats> for TemplateStats {
    fn from(stats: EmailStats) -> Self {
        Self {
            total: stats.total,
            sent: stats.sent,
            failed: stats.failed,
            success_rate: stats.success_rate(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub smtp: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct MetricsResponse {
    pub metrics: TemplateStats,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DetailedMetricsResponse {
    pub overview: TemplateStats,
    pub last_hour: EmailStats,
    pub by_template: BTreeMap<String, TemplateStats>,
    pub timestamp: DateTime<Utc>,
}
