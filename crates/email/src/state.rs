use crate::{
    abstract_trait::rate_limit::DynRateLimitMiddleware,
    cache::rate_limit::RateLimiter,
    config::{RateLimitConfig, ServiceConfig},
    di::DependenciesInject,
    service::{EmailService, InMemoryTrackingStore},
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    abstract_trait::{DynEmailService, DynTrackingStore},
    utils::{Metrics, SystemClock, SystemMetrics, run_metrics_collector},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub di_container: DependenciesInject,
    pub rate_limit: DynRateLimitMiddleware,
    pub registry: Arc<Mutex<Registry>>,
    pub system_metrics: Arc<SystemMetrics>,
    pub unsubscribe_url: String,
}

impl AppState {
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        info!("Initializing SMTP transport for {}", config.email.provider.as_str());
        let email_service = Arc::new(
            EmailService::new(&config.email).context("Failed to create SMTP transport")?,
        ) as DynEmailService;

        let tracking = Arc::new(InMemoryTrackingStore::new(Arc::new(SystemClock)))
            as DynTrackingStore;

        let state = Self::with_services(
            email_service,
            tracking,
            &config.rate_limit,
            &config.unsubscribe_url,
        );

        tokio::spawn(run_metrics_collector(state.system_metrics.clone()));

        Ok(state)
    }

    /// Wires the state around already-built mail and tracking services.
    pub fn with_services(
        email_service: DynEmailService,
        tracking: DynTrackingStore,
        rate_limit: &RateLimitConfig,
        unsubscribe_url: &str,
    ) -> Self {
        let mut registry = Registry::default();

        let metrics = Metrics::new();
        metrics.register(&mut registry);

        let system_metrics = Arc::new(SystemMetrics::new());
        system_metrics.register(&mut registry);

        let rate_limiter = Arc::new(RateLimiter::new(rate_limit)) as DynRateLimitMiddleware;

        Self {
            di_container: DependenciesInject::new(email_service, tracking, metrics),
            rate_limit: rate_limiter,
            registry: Arc::new(Mutex::new(registry)),
            system_metrics,
            unsubscribe_url: unsubscribe_url.to_string(),
        }
    }
}
