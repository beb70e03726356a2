use crate::{
    domain::responses::{EmailStats, TemplateStats, TrackingRecord},
    errors::ServiceError,
};
use chrono::Duration;
use std::{collections::BTreeMap, sync::Arc};

pub type DynTrackingStore = Arc<dyn TrackingStoreTrait>;

pub trait TrackingStoreTrait: Send + Sync {
    /// Records a send attempt as `sent` and returns its id.
    fn track(&self, to: &str, template: &str) -> Result<String, ServiceError>;

    /// Unknown ids are ignored.
    fn mark_failed(&self, id: &str, error: &str) -> Result<(), ServiceError>;

    fn status(&self, id: &str) -> Result<Option<TrackingRecord>, ServiceError>;

    fn stats(&self) -> Result<EmailStats, ServiceError>;

    /// Records with `timestamp >= now - window`.
    fn stats_since(&self, window: Duration) -> Result<EmailStats, ServiceError>;

    fn stats_by_template(&self) -> Result<BTreeMap<String, TemplateStats>, ServiceError>;
}
