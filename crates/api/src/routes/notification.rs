//! Route definitions for the `/sms` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/sms`.
///
/// ```text
/// GET    /    -> send_test_notification
/// POST   /    -> send_notification
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(notification::send_test_notification).post(notification::send_notification),
    )
}
