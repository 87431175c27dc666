//! Read-only system overview endpoints.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use lemos_core::metric::Metric;
use lemos_core::reading::Reading;
use lemos_core::thresholds::{classify, evaluate, MetricStatus, ThresholdRule};
use lemos_core::types::{AreaId, Timestamp};
use serde::Serialize;

use crate::state::AppState;

/// Response body for `GET /api/status`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub server_time: Timestamp,
    pub latest_readings: BTreeMap<AreaId, Reading>,
    /// Per area, the dashboard status of every metric that has a rule.
    pub area_status: BTreeMap<AreaId, BTreeMap<Metric, MetricStatus>>,
    pub areas_monitored: Vec<AreaId>,
    pub total_areas: usize,
    /// Number of areas whose latest reading raises at least one alert.
    pub active_alerts: usize,
    pub system_mode: &'static str,
}

/// GET /api/status
pub async fn system_status(State(state): State<AppState>) -> Json<StatusResponse> {
    let latest = state.latest.snapshot().await;

    let area_status: BTreeMap<AreaId, BTreeMap<Metric, MetricStatus>> = latest
        .iter()
        .map(|(area_id, reading)| {
            let statuses: BTreeMap<Metric, MetricStatus> = state
                .rules
                .iter()
                .map(|rule| {
                    let status: MetricStatus = classify(reading.value(rule.metric), rule).into();
                    (rule.metric, status)
                })
                .collect();
            (area_id.clone(), statuses)
        })
        .collect();

    let active_alerts = latest
        .values()
        .filter(|reading| !evaluate(reading, &state.rules).is_empty())
        .count();

    let areas_monitored: Vec<AreaId> = latest.keys().cloned().collect();
    let total_areas = areas_monitored.len();

    Json(StatusResponse {
        server_time: Utc::now(),
        latest_readings: latest,
        area_status,
        areas_monitored,
        total_areas,
        active_alerts,
        system_mode: if total_areas > 1 {
            "multi-zone"
        } else {
            "single-zone"
        },
    })
}

/// GET /api/thresholds
///
/// The static threshold table in effect.
pub async fn list_thresholds(State(state): State<AppState>) -> Json<Vec<ThresholdRule>> {
    Json(state.rules.to_vec())
}
