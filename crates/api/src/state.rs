use std::sync::Arc;

use lemos_core::thresholds::ThresholdRule;
use lemos_notify::Notifier;

use crate::latest::LatestReadings;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Notification service (contacts + SMS transport).
    pub notifier: Notifier,
    /// Threshold table used to evaluate ingested readings. Never mutated.
    pub rules: Arc<[ThresholdRule]>,
    /// Most recent reading per area.
    pub latest: Arc<LatestReadings>,
}
