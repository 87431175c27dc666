use axum::routing::get;
use axum::Router;

use crate::handlers::status;
use crate::state::AppState;

/// Routes merged at the API root.
///
/// ```text
/// GET    /status       -> system_status
/// GET    /thresholds   -> list_thresholds
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status::system_status))
        .route("/thresholds", get(status::list_thresholds))
}
