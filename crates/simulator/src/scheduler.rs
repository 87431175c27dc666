//! Periodic push scheduler.
//!
//! [`PollScheduler`] owns one ticker task at a time. Every tick spawns an
//! independent push task, so a slow backend leads to overlapping in-flight
//! requests rather than a stalled ticker. Switching the focused area cancels
//! the ticker and starts a fresh one.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use lemos_core::types::AreaId;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::generator;
use crate::sender::BackendClient;

/// How long [`PollScheduler::stop`] waits for in-flight pushes.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

struct Running {
    focus: AreaId,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

// ---------------------------------------------------------------------------
// PollScheduler
// ---------------------------------------------------------------------------

pub struct PollScheduler {
    client: Arc<BackendClient>,
    areas: Arc<[AreaId]>,
    interval: Duration,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    running: Option<Running>,
}

impl PollScheduler {
    pub fn new(client: BackendClient, areas: Vec<AreaId>, interval: Duration) -> Self {
        Self {
            client: Arc::new(client),
            areas: areas.into(),
            interval,
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            running: None,
        }
    }

    pub fn areas(&self) -> &[AreaId] {
        &self.areas
    }

    /// Area currently followed, if the scheduler is running.
    pub fn focus(&self) -> Option<&AreaId> {
        self.running.as_ref().map(|r| &r.focus)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start ticking, following `focus`. A running ticker is replaced.
    pub fn start(&mut self, focus: AreaId) {
        self.cancel_ticker();

        let cancel = self.shutdown.child_token();
        let ticker = Ticker {
            client: Arc::clone(&self.client),
            areas: Arc::clone(&self.areas),
            focus: focus.clone(),
            interval: self.interval,
            tracker: self.tracker.clone(),
        };
        let handle = tokio::spawn(ticker.run(cancel.clone()));

        tracing::info!(focus = %focus, interval_secs = self.interval.as_secs_f64(), "Scheduler started");
        self.running = Some(Running {
            focus,
            cancel,
            handle,
        });
    }

    /// Follow a different area, restarting the ticker.
    pub fn switch_area(&mut self, focus: AreaId) {
        tracing::info!(focus = %focus, "Switching focused area");
        self.start(focus);
    }

    /// Cancel the ticker and wait (bounded) for in-flight pushes.
    ///
    /// The scheduler cannot be restarted afterwards.
    pub async fn stop(&mut self) {
        self.shutdown.cancel();
        if let Some(running) = self.running.take() {
            if let Err(e) = running.handle.await {
                tracing::warn!(error = %e, "Scheduler task ended abnormally");
            }
        }

        self.tracker.close();
        if tokio::time::timeout(DRAIN_TIMEOUT, self.tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                in_flight = self.tracker.len(),
                "Timed out waiting for in-flight pushes"
            );
        }
        tracing::info!("Scheduler stopped");
    }

    fn cancel_ticker(&mut self) {
        if let Some(running) = self.running.take() {
            running.cancel.cancel();
        }
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

struct Ticker {
    client: Arc<BackendClient>,
    areas: Arc<[AreaId]>,
    focus: AreaId,
    interval: Duration,
    tracker: TaskTracker,
}

impl Ticker {
    async fn run(self, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(focus = %self.focus, "Ticker cancelled");
                    break;
                }
                _ = interval.tick() => {
                    self.tracker.spawn(push_once(
                        Arc::clone(&self.client),
                        Arc::clone(&self.areas),
                        self.focus.clone(),
                    ));
                }
            }
        }
    }
}

/// Generate one payload, submit it and read the focused area back.
async fn push_once(client: Arc<BackendClient>, areas: Arc<[AreaId]>, focus: AreaId) {
    let payload = generator::generate(&mut rand::rng(), &areas, Utc::now());

    match client.push_readings(&payload).await {
        Ok(summary) => {
            tracing::info!(
                areas = summary.areas_processed.len(),
                alerts = summary.alerts.len(),
                message = %summary.message,
                "Readings pushed"
            );
            for alert in &summary.alerts {
                tracing::warn!(
                    area_id = %alert.area_id,
                    metric = %alert.metric,
                    severity = %alert.severity,
                    value = alert.value,
                    "Backend raised alert"
                );
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to push readings");
            return;
        }
    }

    match client.current_reading(&focus).await {
        Ok(reading) => {
            tracing::info!(focus = %focus, reading = %reading, "Focused area reading");
        }
        Err(e) => {
            tracing::warn!(focus = %focus, error = %e, "Failed to fetch focused area reading");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use axum::extract::{Path, State};
    use axum::routing::{get, post};
    use axum::{Json, Router};

    use super::*;

    #[derive(Clone, Default)]
    struct MockBackend {
        pushes: Arc<AtomicUsize>,
        lookups: Arc<Mutex<Vec<String>>>,
    }

    async fn spawn_mock_backend(mock: MockBackend) -> String {
        async fn ingest(
            State(mock): State<MockBackend>,
            Json(body): Json<serde_json::Value>,
        ) -> Json<serde_json::Value> {
            mock.pushes.fetch_add(1, Ordering::SeqCst);
            let zones = body
                .as_object()
                .map(|m| m.keys().filter(|k| k.starts_with("area_")).count())
                .unwrap_or(0);
            Json(serde_json::json!({
                "status": "success",
                "message": format!("Multi-zone readings processed for {zones} areas"),
                "areas_processed": [],
                "alerts": []
            }))
        }

        async fn current(
            State(mock): State<MockBackend>,
            Path(area_id): Path<String>,
        ) -> Json<serde_json::Value> {
            mock.lookups.lock().unwrap().push(area_id.clone());
            Json(serde_json::json!({ "area_id": area_id }))
        }

        let app = Router::new()
            .route("/api/readings", post(ingest))
            .route("/api/current/{area_id}", get(current))
            .with_state(mock);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn area(id: &str) -> AreaId {
        AreaId::new(id).unwrap()
    }

    async fn scheduler(mock: &MockBackend) -> PollScheduler {
        let base = spawn_mock_backend(mock.clone()).await;
        PollScheduler::new(
            BackendClient::new(base).unwrap(),
            vec![area("1"), area("2")],
            Duration::from_millis(20),
        )
    }

    #[tokio::test]
    async fn ticks_push_and_read_back_focus() {
        let mock = MockBackend::default();
        let mut scheduler = scheduler(&mock).await;

        scheduler.start(area("1"));
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.stop().await;

        assert!(mock.pushes.load(Ordering::SeqCst) >= 2);
        let lookups = mock.lookups.lock().unwrap().clone();
        assert!(!lookups.is_empty());
        assert!(lookups.iter().all(|a| a == "1"));
    }

    #[tokio::test]
    async fn switch_area_restarts_with_new_focus() {
        let mock = MockBackend::default();
        let mut scheduler = scheduler(&mock).await;

        scheduler.start(area("1"));
        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.switch_area(area("2"));
        assert_eq!(scheduler.focus(), Some(&area("2")));
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop().await;

        let lookups = mock.lookups.lock().unwrap().clone();
        assert_eq!(lookups.last().map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn stop_halts_pushes() {
        let mock = MockBackend::default();
        let mut scheduler = scheduler(&mock).await;

        scheduler.start(area("1"));
        tokio::time::sleep(Duration::from_millis(60)).await;
        scheduler.stop().await;
        assert!(!scheduler.is_running());

        let after_stop = mock.pushes.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(mock.pushes.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test]
    async fn unreachable_backend_does_not_stop_ticker() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut scheduler = PollScheduler::new(
            BackendClient::new(format!("http://{addr}")).unwrap(),
            vec![area("1")],
            Duration::from_millis(20),
        );
        scheduler.start(area("1"));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(scheduler.is_running());
        scheduler.stop().await;
    }
}
