use chrono::Duration;
use shared::{
    abstract_trait::TrackingStoreTrait,
    domain::responses::{EmailStats, TemplateStats, TrackingRecord, TrackingStatus},
    errors::ServiceError,
    utils::DynClock,
};
use std::{
    collections::{BTreeMap, HashMap},
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tracing::{debug, warn};
use uuid::Uuid;

/// Process-local record of every send attempt. Nothing is ever evicted.
pub struct InMemoryTrackingStore {
    records: RwLock<HashMap<String, TrackingRecord>>,
    clock: DynClock,
}

impl InMemoryTrackingStore {
    pub fn new(clock: DynClock) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            clock,
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, TrackingRecord>>, ServiceError> {
        self.records
            .read()
            .map_err(|_| ServiceError::Tracking("tracking store lock poisoned".into()))
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, HashMap<String, TrackingRecord>>, ServiceError> {
        self.records
            .write()
            .map_err(|_| ServiceError::Tracking("tracking store lock poisoned".into()))
    }
}

fn tally<'a>(records: impl Iterator<Item = &'a TrackingRecord>) -> EmailStats {
    records.fold(EmailStats::default(), |mut stats, record| {
        stats.total += 1;
        match record.status {
            TrackingStatus::Sent => stats.sent += 1,
            TrackingStatus::Failed => stats.failed += 1,
        }
        stats
    })
}

impl TrackingStoreTrait for InMemoryTrackingStore {
    fn track(&self, to: &str, template: &str) -> Result<String, ServiceError> {
        let email_id = Uuid::new_v4().to_string();
        let record = TrackingRecord {
            email_id: email_id.clone(),
            to: to.to_string(),
            template: template.to_string(),
            sent_at: self.clock.now(),
            status: TrackingStatus::Sent,
            error: None,
        };

        self.write()?.insert(email_id.clone(), record);
        debug!("Tracking email {email_id} ({template}) to {to}");

        Ok(email_id)
    }

    fn mark_failed(&self, id: &str, error: &str) -> Result<(), ServiceError> {
        match self.write()?.get_mut(id) {
            Some(record) => {
                record.status = TrackingStatus::Failed;
                record.error = Some(error.to_string());
            }
            None => warn!("Ignoring failure report for unknown email id {id}"),
        }
        Ok(())
    }

    fn status(&self, id: &str) -> Result<Option<TrackingRecord>, ServiceError> {
        Ok(self.read()?.get(id).cloned())
    }

    fn stats(&self) -> Result<EmailStats, ServiceError> {
        Ok(tally(self.read()?.values()))
    }

    fn stats_since(&self, window: Duration) -> Result<EmailStats, ServiceError> {
        let cutoff = self.clock.now() - window;
        Ok(tally(
            self.read()?
                .values()
                .filter(|record| record.sent_at >= cutoff),
        ))
    }

    fn stats_by_template(&self) -> Result<BTreeMap<String, TemplateStats>, ServiceError> {
        let records = self.read()?;

        let mut grouped: BTreeMap<String, EmailStats> = BTreeMap::new();
        for record in records.values() {
            let stats = grouped.entry(record.template.clone()).or_default();
            stats.total += 1;
            match record.status {
                TrackingStatus::Sent => stats.sent += 1,
                TrackingStatus::Failed => stats.failed += 1,
            }
        }

        Ok(grouped
            .into_iter()
            .map(|(template, stats)| (template, TemplateStats::from(stats)))
            .collect())
    }
}
