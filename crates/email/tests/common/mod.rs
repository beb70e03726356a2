#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
};
use chrono::{TimeZone, Utc};
use email::{config::RateLimitConfig, handler::AppRouter, state::AppState};
use serde_json::Value;
use shared::{
    abstract_trait::{DynTrackingStore, EmailServiceTrait, OutgoingEmail},
    errors::ServiceError,
    utils::ManualClock,
};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Up,
    Down,
    Broken,
}

/// Mail transport double that records what it was asked to send.
pub struct StubMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    fail_with: Option<String>,
    connection: Connection,
}

impl StubMailer {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_with: None,
            connection: Connection::Up,
        })
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(error.to_string()),
            connection: Connection::Up,
        })
    }

    pub fn with_connection(connection: Connection) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_with: None,
            connection,
        })
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailServiceTrait for StubMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, ServiceError> {
        self.sent.lock().unwrap().push(email.clone());
        match &self.fail_with {
            Some(error) => Err(ServiceError::Transport(error.clone())),
            None => Ok("<stub@shop.test>".to_string()),
        }
    }

    async fn verify_connection(&self) -> Result<bool, ServiceError> {
        match self.connection {
            Connection::Up => Ok(true),
            Connection::Down => Ok(false),
            Connection::Broken => Err(ServiceError::Internal("verifier crashed".into())),
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<StubMailer>,
    pub tracking: DynTrackingStore,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn new(mailer: Arc<StubMailer>) -> Self {
        Self::with_rate_limit(mailer, RateLimitConfig::default())
    }

    pub fn with_rate_limit(mailer: Arc<StubMailer>, rate_limit: RateLimitConfig) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap(),
        ));
        let tracking: DynTrackingStore =
            Arc::new(email::service::InMemoryTrackingStore::new(clock.clone()));

        let state = AppState::with_services(
            mailer.clone(),
            tracking.clone(),
            &rate_limit,
            "https://shop.test/unsubscribe",
        );

        Self {
            router: AppRouter::build(state),
            mailer,
            tracking,
            clock,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        (status, headers, json)
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let (status, _, json) = self.request(Method::POST, uri, Some(body), &[]).await;
        (status, json)
    }

    pub async fn get_json(&self, uri: &str) -> (StatusCode, Value) {
        let (status, _, json) = self.request(Method::GET, uri, None, &[]).await;
        (status, json)
    }
}
