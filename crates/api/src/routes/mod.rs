pub mod alerts;
pub mod health;
pub mod notification;
pub mod readings;
pub mod status;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /alerts                  active alerts (GET), ingest alert (POST)
/// /sms                     test notification (GET), send notification (POST)
/// /readings                ingest readings (POST)
/// /current/{area_id}       latest reading for an area (GET)
/// /status                  system overview (GET)
/// /thresholds              threshold table (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/alerts", alerts::router())
        .nest("/sms", notification::router())
        .merge(readings::router())
        .merge(status::router())
}
