use anyhow::{Context as _, Result};
use opentelemetry::{Context, global};
use opentelemetry_otlp::{LogExporter, MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    Resource, logs::SdkLoggerProvider, metrics::SdkMeterProvider, trace::SdkTracerProvider,
};
use tokio::time::Instant;

pub const DEFAULT_OTEL_ENDPOINT: &str = "http://otel-collector:4317";

#[derive(Clone)]
pub struct Telemetry {
    service_name: String,
    otel_endpoint: String,
}

pub struct TracingContext {
    pub cx: Context,
    pub start_time: Instant,
}

/// Providers installed by [`Telemetry::init`]; flushed on shutdown.
pub struct TelemetryProviders {
    pub logger: SdkLoggerProvider,
    pub meter: SdkMeterProvider,
    pub tracer: SdkTracerProvider,
}

impl Telemetry {
    pub fn new(service_name: impl Into<String>, otel_endpoint: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            otel_endpoint: otel_endpoint.into(),
        }
    }

    pub fn from_env(service_name: impl Into<String>) -> Self {
        let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_OTEL_ENDPOINT.to_string());
        Self::new(service_name, endpoint)
    }

    fn resource(&self) -> Resource {
        Resource::builder()
            .with_service_name(self.service_name.clone())
            .build()
    }

    pub fn init(&self) -> Result<TelemetryProviders> {
        let span_exporter = SpanExporter::builder()
            .with_tonic()
            .with_endpoint(self.otel_endpoint.clone())
            .build()
            .context("Failed to create span exporter")?;

        let tracer = SdkTracerProvider::builder()
            .with_resource(self.resource())
            .with_batch_exporter(span_exporter)
            .build();
        global::set_tracer_provider(tracer.clone());

        let metric_exporter = MetricExporter::builder()
            .with_tonic()
            .with_endpoint(self.otel_endpoint.clone())
            .build()
            .context("Failed to create metric exporter")?;

        let meter = SdkMeterProvider::builder()
            .with_resource(self.resource())
            .with_periodic_exporter(metric_exporter)
            .build();
        global::set_meter_provider(meter.clone());

        let log_exporter = LogExporter::builder()
            .with_tonic()
            .with_endpoint(self.otel_endpoint.clone())
            .build()
            .context("Failed to create log exporter")?;

        let logger = SdkLoggerProvider::builder()
            .with_resource(self.resource())
            .with_batch_exporter(log_exporter)
            .build();

        Ok(TelemetryProviders {
            logger,
            meter,
            tracer,
        })
    }
}

impl TelemetryProviders {
    pub fn shutdown(self) -> Result<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.tracer.shutdown() {
            errors.push(format!("tracer provider: {e}"));
        }
        if let Err(e) = self.meter.shutdown() {
            errors.push(format!("meter provider: {e}"));
        }
        if let Err(e) = self.logger.shutdown() {
            errors.push(format!("logger provider: {e}"));
        }

        if !errors.is_empty() {
            anyhow::bail!("Failed to shutdown providers:\n{}", errors.join("\n"));
        }

        Ok(())
    }
}
