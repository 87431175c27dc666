//! Handlers for the `/sms` resource: direct notification and health check.

use axum::extract::State;
use axum::Json;
use lemos_core::alert::Severity;
use lemos_core::types::AreaId;
use lemos_notify::{DeliveryOutcome, DispatchReport, NotificationRequest};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppResult;
use crate::extract::{Payload, ValidatedJson};
use crate::state::AppState;

/// Body sent by the notification test endpoint.
pub const TEST_MESSAGE: &str = "LEMOS System Test - SMS notifications are working correctly.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/sms`.
#[derive(Debug, Deserialize, Validate)]
pub struct NotificationInput {
    /// At most 1600 characters (Twilio's concatenated-SMS limit).
    #[validate(length(min = 1, max = 1600))]
    pub message: String,
    /// Defaults to `medium`.
    #[serde(default)]
    pub severity: Severity,
    /// Omit for a system-wide notification.
    pub area_id: Option<AreaId>,
}

impl Payload for NotificationInput {
    const REJECTION: &'static str = "Failed to send SMS alerts";
}

/// Response body for a completed fanout.
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub success: bool,
    pub message: &'static str,
    pub results: Vec<DeliveryOutcome>,
}

impl From<DispatchReport> for NotificationResponse {
    fn from(report: DispatchReport) -> Self {
        Self {
            success: true,
            message: "SMS alerts processed",
            results: report.results,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/sms
///
/// Resolve recipients for the area and severity, prefix the message and send
/// it to each. Responds 500 when transport credentials are missing and 400
/// when no recipients are configured.
pub async fn send_notification(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<NotificationInput>,
) -> AppResult<Json<NotificationResponse>> {
    let request = NotificationRequest::new(input.message, input.severity, input.area_id);
    let report = state.notifier.notify(&request).await?;
    Ok(Json(report.into()))
}

/// GET /api/sms
///
/// Send a canned low-severity, system-wide message through the same path.
pub async fn send_test_notification(
    State(state): State<AppState>,
) -> AppResult<Json<NotificationResponse>> {
    tracing::info!("Sending SMS test notification");
    let request = NotificationRequest::new(TEST_MESSAGE, Severity::Low, None);
    let report = state.notifier.notify(&request).await?;
    Ok(Json(report.into()))
}
