use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{SpanKind, TraceContextExt, Tracer},
};
use shared::{
    abstract_trait::{DynEmailService, DynTrackingStore, OutgoingEmail},
    domain::requests::EmailJob,
    errors::ServiceError,
    utils::{Metrics, Status, TemplateKind, TracingContext, render_email},
};
use tokio::time::Instant;
use tracing::{error, info};

/// Render, track, send. One call per accepted request; never retries.
pub struct EmailDispatchService {
    mailer: DynEmailService,
    tracking: DynTrackingStore,
    metrics: Metrics,
}

impl EmailDispatchService {
    pub fn new(mailer: DynEmailService, tracking: DynTrackingStore, metrics: Metrics) -> Self {
        Self {
            mailer,
            tracking,
            metrics,
        }
    }

    fn get_tracer(&self) -> BoxedTracer {
        global::tracer("email-dispatch")
    }

    fn start_tracing(&self, template: TemplateKind, to: &str) -> TracingContext {
        let start_time = Instant::now();
        let tracer = self.get_tracer();
        let span = tracer
            .span_builder("email.dispatch")
            .with_kind(SpanKind::Internal)
            .with_attributes(vec![
                KeyValue::new("email.template", template.as_str()),
                KeyValue::new("email.to", to.to_string()),
            ])
            .start(&tracer);

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    fn complete_tracing(
        &self,
        tracing_ctx: &TracingContext,
        template: TemplateKind,
        status: Status,
        message: &str,
    ) {
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();
        let status_str = match status {
            Status::Success => "SUCCESS",
            Status::Error => "ERROR",
        };

        tracing_ctx.cx.span().add_event(
            "Dispatch completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        self.metrics.record(template, status, elapsed);
        tracing_ctx.cx.span().end();
    }

    /// Returns the tracking id of the attempt.
    pub async fn dispatch(&self, job: &EmailJob) -> Result<String, ServiceError> {
        let template = job.data.kind();
        let rendered = render_email(&job.data)?;

        let tracing_ctx = self.start_tracing(template, &job.to);
        let email_id = self.tracking.track(&job.to, template.as_str())?;

        let outgoing = OutgoingEmail {
            to: job.to.clone(),
            subject: rendered.subject,
            html: rendered.html,
            text: Some(rendered.text),
        };

        match self.mailer.send(&outgoing).await {
            Ok(message_id) => {
                info!("Dispatched {template} email {email_id} as {message_id}");
                self.complete_tracing(&tracing_ctx, template, Status::Success, &message_id);
                Ok(email_id)
            }
            Err(e) => {
                error!("Error sending {template} email {email_id}: {e}");
                if let Err(track_err) = self.tracking.mark_failed(&email_id, &e.to_string()) {
                    error!("Failed to mark email {email_id} as failed: {track_err}");
                }
                self.complete_tracing(&tracing_ctx, template, Status::Error, &e.to_string());
                Err(e)
            }
        }
    }

    pub async fn verify_connection(&self) -> Result<bool, ServiceError> {
        self.mailer.verify_connection().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Duration;
    use shared::{
        abstract_trait::{EmailServiceTrait, TrackingStoreTrait},
        domain::responses::{EmailStats, TemplateStats, TrackingRecord},
        utils::{EmailTemplateData, Labels},
    };
    use std::{collections::BTreeMap, sync::Arc};

    struct RefusingMailer;

    #[async_trait]
    impl EmailServiceTrait for RefusingMailer {
        async fn send(&self, _email: &OutgoingEmail) -> Result<String, ServiceError> {
            Err(ServiceError::Transport("550 mailbox unavailable".into()))
        }

        async fn verify_connection(&self) -> Result<bool, ServiceError> {
            Ok(true)
        }
    }

    struct BrokenTracking;

    impl TrackingStoreTrait for BrokenTracking {
        fn track(&self, _to: &str, _template: &str) -> Result<String, ServiceError> {
            Ok("email-1".into())
        }

        fn mark_failed(&self, _id: &str, _error: &str) -> Result<(), ServiceError> {
            Err(ServiceError::Tracking("tracking store lock poisoned".into()))
        }

        fn status(&self, _id: &str) -> Result<Option<TrackingRecord>, ServiceError> {
            Ok(None)
        }

        fn stats(&self) -> Result<EmailStats, ServiceError> {
            Ok(EmailStats::default())
        }

        fn stats_since(&self, _window: Duration) -> Result<EmailStats, ServiceError> {
            Ok(EmailStats::default())
        }

        fn stats_by_template(&self) -> Result<BTreeMap<String, TemplateStats>, ServiceError> {
            Ok(BTreeMap::new())
        }
    }

    #[tokio::test]
    async fn transport_error_survives_a_tracking_failure() {
        let metrics = Metrics::new();
        let dispatcher = EmailDispatchService::new(
            Arc::new(RefusingMailer),
            Arc::new(BrokenTracking),
            metrics.clone(),
        );
        let job = EmailJob {
            to: "a@b.com".into(),
            data: EmailTemplateData::Welcome { name: "Jo".into() },
        };

        let err = dispatcher.dispatch(&job).await.unwrap_err();

        assert!(matches!(err, ServiceError::Transport(_)));
        let failures = metrics
            .dispatch_counter
            .get_or_create(&Labels {
                template: TemplateKind::Welcome,
                status: Status::Error,
            })
            .get();
        assert_eq!(failures, 1);
    }
}
