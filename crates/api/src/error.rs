use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lemos_core::error::CoreError;
use lemos_notify::NotifyError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain errors from `lemos_core` and `lemos_notify` and adds
/// the request-body rejection. Implements [`IntoResponse`] to produce consistent
/// `{ "error": ..., "code": ... }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    /// The request body could not be parsed or failed schema validation.
    ///
    /// `message` is the endpoint's generic failure text returned to the
    /// client; `detail` is only logged.
    #[error("Malformed payload: {detail}")]
    Malformed {
        message: &'static str,
        detail: String,
    },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";
const MALFORMED_MESSAGE: &str = "Malformed request body";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Core(core) => match core {
                CoreError::NotFound { .. } => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND", core.to_string())
                }
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Malformed(detail) => {
                    tracing::error!(error = %detail, "Rejected malformed input");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "MALFORMED_PAYLOAD",
                        MALFORMED_MESSAGE.to_string(),
                    )
                }
            },

            AppError::Notify(notify) => match notify {
                NotifyError::NotConfigured => {
                    tracing::error!("SMS transport credentials are not configured");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "NOT_CONFIGURED",
                        notify.to_string(),
                    )
                }
                NotifyError::NoRecipients => {
                    (StatusCode::BAD_REQUEST, "NO_RECIPIENTS", notify.to_string())
                }
                NotifyError::Client(err) => {
                    tracing::error!(error = %err, "SMS transport client error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        INTERNAL_MESSAGE.to_string(),
                    )
                }
            },

            AppError::Malformed { message, detail } => {
                tracing::error!(error = %detail, "Rejected malformed request body");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_PAYLOAD",
                    (*message).to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
