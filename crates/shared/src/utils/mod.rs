mod clock;
mod gracefullshutdown;
mod logs;
mod metrics;
mod otel;
mod template;

pub use self::clock::{Clock, DynClock, ManualClock, SystemClock};
pub use self::gracefullshutdown::shutdown_signal;
pub use self::logs::init_logger;
pub use self::metrics::{Labels, Metrics, Status, SystemMetrics, run_metrics_collector};
pub use self::otel::{DEFAULT_OTEL_ENDPOINT, Telemetry, TelemetryProviders, TracingContext};
pub use self::template::{EmailTemplateData, RenderedEmail, TemplateKind, render_email};
