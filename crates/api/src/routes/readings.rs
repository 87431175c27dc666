//! Route definitions for reading ingestion and lookup.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::readings;
use crate::state::AppState;

/// Routes merged at the API root.
///
/// ```text
/// POST   /readings              -> ingest_readings
/// GET    /current/{area_id}     -> current_reading
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/readings", post(readings::ingest_readings))
        .route("/current/{area_id}", get(readings::current_reading))
}
