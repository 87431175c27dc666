//! Handlers for the `/alerts` resource.

use axum::extract::State;
use axum::Json;
use lemos_core::alert::{Alert, Severity};
use lemos_core::metric::Metric;
use lemos_core::thresholds::evaluate_batch;
use lemos_core::types::{lenient_timestamp, AreaId, Timestamp};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::AppResult;
use crate::extract::{Payload, ValidatedJson};
use crate::handlers::notification::NotificationResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/alerts`.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_alert_values"))]
pub struct AlertInput {
    #[serde(rename = "type")]
    pub metric: Metric,
    pub area_id: AreaId,
    pub value: f64,
    pub threshold: f64,
    pub severity: Severity,
    #[serde(deserialize_with = "lenient_timestamp::deserialize")]
    pub timestamp: Timestamp,
}

/// `value` and `threshold` must be non-negative unless the metric can go
/// below zero (temperature).
fn validate_alert_values(input: &AlertInput) -> Result<(), ValidationError> {
    for value in [input.value, input.threshold] {
        if input.metric.is_non_negative() && value < 0.0 {
            let mut error = ValidationError::new("negative_value");
            error.message = Some(format!("{} cannot be negative", input.metric).into());
            return Err(error);
        }
    }
    Ok(())
}

impl Payload for AlertInput {
    const REJECTION: &'static str = "Failed to process alert";
}

impl From<AlertInput> for Alert {
    fn from(input: AlertInput) -> Self {
        Alert {
            metric: input.metric,
            area_id: input.area_id,
            value: input.value,
            threshold: input.threshold,
            severity: input.severity,
            timestamp: input.timestamp,
        }
    }
}

/// What happened to the SMS side of an ingested alert.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SmsResult {
    Processed(NotificationResponse),
    /// Nothing was sent; `error` says why.
    Skipped { error: String },
}

/// Response body for `POST /api/alerts`.
#[derive(Debug, Serialize)]
pub struct AlertIngestResponse {
    pub success: bool,
    pub alert: Alert,
    pub sms_result: SmsResult,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/alerts
///
/// Forward an alert raised by a client to the SMS fanout. A missing transport
/// configuration or an empty recipient list does not fail the request; it is
/// reported in `sms_result`.
pub async fn ingest_alert(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<AlertInput>,
) -> AppResult<Json<AlertIngestResponse>> {
    let alert = Alert::from(input);
    tracing::info!(
        area_id = %alert.area_id,
        metric = %alert.metric,
        severity = %alert.severity,
        value = alert.value,
        "Alert received"
    );

    let sms_result = match state.notifier.dispatch_alert(&alert).await {
        Ok(report) => SmsResult::Processed(report.into()),
        Err(e) => {
            tracing::warn!(area_id = %alert.area_id, error = %e, "Alert notification skipped");
            SmsResult::Skipped {
                error: e.to_string(),
            }
        }
    };

    Ok(Json(AlertIngestResponse {
        success: true,
        alert,
        sms_result,
    }))
}

/// GET /api/alerts
///
/// Alerts raised by the latest reading of every area.
pub async fn list_active_alerts(State(state): State<AppState>) -> Json<Vec<Alert>> {
    let latest: Vec<_> = state.latest.snapshot().await.into_values().collect();
    Json(evaluate_batch(&latest, &state.rules))
}
