use crate::service::EmailDispatchService;
use shared::{
    abstract_trait::{DynEmailService, DynTrackingStore},
    utils::Metrics,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct DependenciesInject {
    pub tracking: DynTrackingStore,
    pub dispatcher: Arc<EmailDispatchService>,
}

impl std::fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("tracking", &"DynTrackingStore")
            .field("dispatcher", &"EmailDispatchService")
            .finish()
    }
}

impl DependenciesInject {
    pub fn new(email_service: DynEmailService, tracking: DynTrackingStore, metrics: Metrics) -> Self {
        let dispatcher = Arc::new(EmailDispatchService::new(
            email_service,
            tracking.clone(),
            metrics,
        ));

        Self {
            tracking,
            dispatcher,
        }
    }
}
