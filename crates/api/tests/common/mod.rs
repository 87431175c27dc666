#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderValue, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use lemos_core::contacts::StaticContacts;
use lemos_core::thresholds::DEFAULT_RULES;
use lemos_core::types::AreaId;
use lemos_notify::{DeliveryOutcome, Notifier, NotifyError, SmsTransport, TransportProvider};
use tower::ServiceExt;

use lemos_api::config::ServerConfig;
use lemos_api::latest::LatestReadings;
use lemos_api::router::build_app_router;
use lemos_api::state::AppState;

/// Recipient the fake transport always fails to reach.
pub const UNREACHABLE: &str = "+15550000000";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![HeaderValue::from_static("http://localhost:3000")],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
    }
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// Messages handed to the fake transport, as `(to, body)`.
pub type Outbox = Arc<Mutex<Vec<(String, String)>>>;

struct RecordingTransport {
    outbox: Outbox,
}

#[async_trait]
impl SmsTransport for RecordingTransport {
    async fn send(&self, to: &str, body: &str) -> DeliveryOutcome {
        if to == UNREACHABLE {
            return DeliveryOutcome::failed(to, "The 'To' number is not a valid phone number.");
        }
        let mut outbox = self.outbox.lock().unwrap();
        outbox.push((to.to_string(), body.to_string()));
        DeliveryOutcome::sent(to, format!("SM{:04}", outbox.len()))
    }
}

struct FakeProvider {
    configured: bool,
    outbox: Outbox,
}

impl TransportProvider for FakeProvider {
    fn transport(&self) -> Result<Arc<dyn SmsTransport>, NotifyError> {
        if !self.configured {
            return Err(NotifyError::NotConfigured);
        }
        Ok(Arc::new(RecordingTransport {
            outbox: Arc::clone(&self.outbox),
        }))
    }
}

/// Contacts used by most tests: two recipients for area 1, one for area 2
/// (who cannot be reached) and one emergency contact.
pub fn default_contacts() -> StaticContacts {
    StaticContacts::new()
        .with_area(AreaId::new("1").unwrap(), "+15551110001, +15551110002")
        .with_area(AreaId::new("2").unwrap(), UNREACHABLE)
        .with_emergency("+15559990000")
}

// ---------------------------------------------------------------------------
// App builders
// ---------------------------------------------------------------------------

/// A test application plus the outbox of its fake SMS transport.
pub struct TestApp {
    pub router: Router,
    pub outbox: Outbox,
}

impl TestApp {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.outbox.lock().unwrap().clone()
    }
}

/// Build the full application router with all middleware layers, using the
/// given contacts and a fake SMS transport.
pub fn build_test_app_with(contacts: StaticContacts, configured: bool) -> TestApp {
    let config = test_config();
    let outbox: Outbox = Arc::default();
    let provider = FakeProvider {
        configured,
        outbox: Arc::clone(&outbox),
    };

    let state = AppState {
        notifier: Notifier::new(Arc::new(contacts), Arc::new(provider)),
        rules: Arc::new(DEFAULT_RULES),
        latest: Arc::new(LatestReadings::new()),
    };

    TestApp {
        router: build_app_router(state, &config),
        outbox,
    }
}

/// Configured transport with [`default_contacts`].
pub fn build_test_app() -> TestApp {
    build_test_app_with(default_contacts(), true)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &TestApp, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response {
    post_raw(app, uri, body.to_string()).await
}

pub async fn post_raw(app: &TestApp, uri: &str, body: impl Into<String>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
