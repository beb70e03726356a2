mod common;

use axum::http::StatusCode;
use chrono::Duration;
use common::{Connection, StubMailer, TestApp};
use serde_json::json;

#[tokio::test]
async fn health_reports_connected_transport() {
    let app = TestApp::new(StubMailer::with_connection(Connection::Up));

    let (status, body) = app.get_json("/api/monitoring/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["smtp"], "connected");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn health_stays_up_when_transport_is_unreachable() {
    let app = TestApp::new(StubMailer::with_connection(Connection::Down));

    let (status, body) = app.get_json("/api/monitoring/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["smtp"], "disconnected");
}

#[tokio::test]
async fn health_is_unavailable_when_the_check_itself_fails() {
    let app = TestApp::new(StubMailer::with_connection(Connection::Broken));

    let (status, body) = app.get_json("/api/monitoring/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Service is unhealthy" })
    );
}

#[tokio::test]
async fn metrics_start_empty() {
    let app = TestApp::new(StubMailer::succeeding());

    let (status, body) = app.get_json("/api/monitoring/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["metrics"],
        json!({ "total": 0, "sent": 0, "failed": 0, "successRate": 0.0 })
    );
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn detailed_metrics_split_by_time_and_template() {
    let app = TestApp::new(StubMailer::succeeding());

    app.post_json("/api/email/welcome", json!({ "to": "a@b.com", "name": "Jo" }))
        .await;
    app.post_json(
        "/api/email/verify",
        json!({ "to": "a@b.com", "name": "Jo", "otp": "123456" }),
    )
    .await;

    app.clock.advance(Duration::minutes(90));

    app.post_json("/api/email/welcome", json!({ "to": "c@d.com", "name": "Al" }))
        .await;

    let (status, body) = app.get_json("/api/monitoring/metrics/detailed").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["overview"],
        json!({ "total": 3, "sent": 3, "failed": 0, "successRate": 100.0 })
    );
    assert_eq!(body["lastHour"], json!({ "total": 1, "sent": 1, "failed": 0 }));
    assert_eq!(body["byTemplate"]["welcome"]["total"], 2);
    assert_eq!(body["byTemplate"]["verify"]["total"], 1);
    assert!(body["byTemplate"].get("newsletter").is_none());
}

#[tokio::test]
async fn metrics_reflect_partial_failures() {
    let ok = TestApp::new(StubMailer::succeeding());
    ok.post_json("/api/email/welcome", json!({ "to": "a@b.com", "name": "Jo" }))
        .await;

    let (_, body) = ok.get_json("/api/monitoring/metrics").await;
    assert_eq!(body["metrics"]["successRate"], 100.0);

    let failing = TestApp::new(StubMailer::failing("mailbox unavailable"));
    failing
        .post_json("/api/email/welcome", json!({ "to": "a@b.com", "name": "Jo" }))
        .await;

    let (_, body) = failing.get_json("/api/monitoring/metrics").await;
    assert_eq!(
        body["metrics"],
        json!({ "total": 1, "sent": 0, "failed": 1, "successRate": 0.0 })
    );
}

#[tokio::test]
async fn prometheus_endpoint_exposes_dispatch_counters() {
    let app = TestApp::new(StubMailer::succeeding());

    app.post_json("/api/email/welcome", json!({ "to": "a@b.com", "name": "Jo" }))
        .await;

    let request = axum::http::Request::builder()
        .uri("/metrics")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.router.clone(), request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("email_dispatch_total"));
    assert!(text.contains("template=\"welcome\",status=\"Success\""));
}

#[tokio::test]
async fn email_status_reports_the_recorded_outcome() {
    let app = TestApp::new(StubMailer::succeeding());

    let sent_id = app.tracking.track("a@b.com", "welcome").unwrap();
    let failed_id = app.tracking.track("c@d.com", "newsletter").unwrap();
    app.tracking
        .mark_failed(&failed_id, "Transport error: connection reset")
        .unwrap();

    let (status, body) = app
        .get_json(&format!("/api/monitoring/emails/{sent_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emailId"], sent_id.as_str());
    assert_eq!(body["to"], "a@b.com");
    assert_eq!(body["template"], "welcome");
    assert_eq!(body["status"], "sent");
    assert!(body.get("error").is_none());

    let (status, body) = app
        .get_json(&format!("/api/monitoring/emails/{failed_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["error"], "Transport error: connection reset");
}

#[tokio::test]
async fn unknown_email_status_is_not_found() {
    let app = TestApp::new(StubMailer::succeeding());

    let (status, body) = app.get_json("/api/monitoring/emails/missing").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "success": false, "error": "Email not found" })
    );
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new(StubMailer::succeeding());

    let (status, _) = app.get_json("/api/monitoring/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
