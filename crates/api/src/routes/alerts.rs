//! Route definitions for the `/alerts` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /    -> list_active_alerts
/// POST   /    -> ingest_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(alerts::list_active_alerts).post(alerts::ingest_alert),
    )
}
