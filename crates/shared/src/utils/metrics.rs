use crate::utils::template::TemplateKind;
use prometheus_client::metrics::histogram::Histogram;
use prometheus_client::metrics::{counter::Counter, family::Family, gauge::Gauge};
use prometheus_client::registry::Registry;
use prometheus_client_derive_encode::{EncodeLabelSet, EncodeLabelValue};
use std::{
    fs,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};
use sysinfo::System;

fn get_thread_count(pid: usize) -> Option<i64> {
    let contents = fs::read_to_string(format!("/proc/{pid}/status")).ok()?;
    contents
        .lines()
        .find(|line| line.starts_with("Threads:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|count| count.parse::<i64>().ok())
}

#[derive(Debug, Clone)]
pub struct SystemMetrics {
    pub memory_resident_bytes: Gauge,
    pub memory_virtual_bytes: Gauge,
    pub thread_usage: Gauge,
    pub cpu_usage_percent: Gauge,
    pub process_start_time: Gauge,
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetrics {
    pub fn new() -> Self {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default();

        let metrics = Self {
            memory_resident_bytes: Gauge::default(),
            memory_virtual_bytes: Gauge::default(),
            thread_usage: Gauge::default(),
            cpu_usage_percent: Gauge::default(),
            process_start_time: Gauge::default(),
        };

        metrics.process_start_time.set(start_time);
        metrics
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "process_resident_memory_bytes",
            "Resident memory of the process in bytes",
            self.memory_resident_bytes.clone(),
        );

        registry.register(
            "process_virtual_memory_bytes",
            "Virtual memory of the process in bytes",
            self.memory_virtual_bytes.clone(),
        );

        registry.register(
            "process_threads",
            "Number of OS threads in the process",
            self.thread_usage.clone(),
        );

        registry.register(
            "process_cpu_usage_percent",
            "Global CPU usage observed at the last collection",
            self.cpu_usage_percent.clone(),
        );

        registry.register(
            "process_start_time_seconds",
            "Start time of the process since unix epoch in seconds",
            self.process_start_time.clone(),
        );
    }

    pub fn update_metrics(&self, sys: &mut System) {
        sys.refresh_all();

        let pid = std::process::id() as usize;

        if let Some(process) = sys.process(sysinfo::Pid::from(pid)) {
            self.memory_resident_bytes.set(process.memory() as i64);
            self.memory_virtual_bytes.set(process.virtual_memory() as i64);

            if let Some(thread_count) = get_thread_count(pid) {
                self.thread_usage.set(thread_count);
            }
        }

        self.cpu_usage_percent.set(sys.global_cpu_usage() as i64);
    }
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Status {
    Success,
    Error,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct Labels {
    pub template: TemplateKind,
    pub status: Status,
}

#[derive(Clone, Debug)]
pub struct Metrics {
    pub dispatch_counter: Family<Labels, Counter>,
    pub dispatch_duration: Family<Labels, Histogram>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            dispatch_counter: Family::default(),
            dispatch_duration: Family::new_with_constructor(|| {
                Histogram::new(vec![
                    0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
                ])
            }),
        }
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(
            "email_dispatch",
            "Email dispatch attempts by template and outcome",
            self.dispatch_counter.clone(),
        );

        registry.register(
            "email_dispatch_duration_seconds",
            "Time spent handing a message to the mail transport",
            self.dispatch_duration.clone(),
        );
    }

    pub fn record(&self, template: TemplateKind, status: Status, duration_secs: f64) {
        let labels = Labels { template, status };
        self.dispatch_counter.get_or_create(&labels).inc();
        self.dispatch_duration
            .get_or_create(&labels)
            .observe(duration_secs);
    }
}

pub async fn run_metrics_collector(system_metrics: Arc<SystemMetrics>) {
    let mut sys = System::new_all();
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(15));
    loop {
        interval.tick().await;
        system_metrics.update_metrics(&mut sys);
    }
}
