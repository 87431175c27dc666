//! Handlers for sensor reading ingestion and lookup.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use lemos_core::alert::Alert;
use lemos_core::error::CoreError;
use lemos_core::reading::{IngestPayload, Reading};
use lemos_core::thresholds::evaluate_batch;
use lemos_core::types::AreaId;
use lemos_notify::NotifyError;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{malformed, Payload, PayloadJson};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Raw body of `POST /api/readings`.
///
/// The device format is detected and its shape checked by
/// [`IngestPayload::from_json`]; at the HTTP boundary the body only has to
/// be well-formed JSON.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct ReadingSubmission(pub serde_json::Value);

impl Payload for ReadingSubmission {
    const REJECTION: &'static str = "Failed to process reading";
}

/// Response body for `POST /api/readings`.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
    pub message: String,
    pub areas_processed: Vec<AreaId>,
    pub alerts: Vec<Alert>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/readings
///
/// Accepts a single-zone or multi-zone device payload. Every reading is
/// clamped to its sensor ranges, cached as the area's latest reading and
/// evaluated; each resulting alert is forwarded to the SMS fanout.
/// Notification problems are logged and never fail the ingestion.
pub async fn ingest_readings(
    State(state): State<AppState>,
    PayloadJson(ReadingSubmission(body)): PayloadJson<ReadingSubmission>,
) -> AppResult<Json<IngestResponse>> {
    let payload = IngestPayload::from_json(body).map_err(|e| match e {
        CoreError::Malformed(detail) => malformed::<ReadingSubmission>(detail),
        other => other.into(),
    })?;
    let multi_zone = payload.is_multi_zone();
    let mut readings = payload.into_readings(Utc::now())?;

    for reading in &mut readings {
        for adjusted in reading.clamp_to_sensor_ranges() {
            tracing::warn!(
                area_id = %reading.area_id,
                metric = %adjusted.metric,
                original = adjusted.original,
                clamped = adjusted.clamped,
                "Reading outside sensor range, clamped"
            );
        }
    }

    state.latest.record(&readings).await;

    let alerts = evaluate_batch(&readings, &state.rules);
    for alert in &alerts {
        notify_alert(&state, alert).await;
    }

    let areas_processed: Vec<AreaId> = readings.iter().map(|r| r.area_id.clone()).collect();
    let message = if multi_zone {
        format!(
            "Multi-zone readings processed for {} areas",
            areas_processed.len()
        )
    } else {
        "Reading processed".to_string()
    };

    tracing::info!(
        areas = areas_processed.len(),
        alerts = alerts.len(),
        multi_zone,
        "Readings ingested"
    );

    Ok(Json(IngestResponse {
        status: "success",
        message,
        areas_processed,
        alerts,
    }))
}

/// GET /api/current/{area_id}
///
/// Latest cached reading for one area; 404 if none has been received.
pub async fn current_reading(
    State(state): State<AppState>,
    Path(area_id): Path<String>,
) -> AppResult<Json<Reading>> {
    let area_id = AreaId::new(area_id)?;
    state
        .latest
        .get(&area_id)
        .await
        .map(Json)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Reading for area",
                id: area_id.to_string(),
            })
        })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Forward one alert to the fanout, logging instead of failing.
async fn notify_alert(state: &AppState, alert: &Alert) {
    match state.notifier.dispatch_alert(alert).await {
        Ok(report) => {
            tracing::info!(
                area_id = %alert.area_id,
                metric = %alert.metric,
                sent = report.sent_count(),
                failed = report.failed_count(),
                "Alert notification dispatched"
            );
        }
        Err(NotifyError::NotConfigured) => {
            tracing::warn!(message = %alert.message(), "SMS disabled, alert not sent");
        }
        Err(e) => {
            tracing::warn!(area_id = %alert.area_id, error = %e, "Alert notification skipped");
        }
    }
}
