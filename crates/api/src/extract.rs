//! JSON body extraction with a uniform rejection path.
//!
//! [`ValidatedJson`] deserializes and then runs the `validator` rules of the
//! payload type. [`PayloadJson`] only deserializes, for bodies whose shape is
//! checked further down. Either way a rejected body becomes
//! [`AppError::Malformed`] carrying the endpoint's generic failure text.

use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// An inbound request body schema.
pub trait Payload: DeserializeOwned {
    /// Message returned to the client when the body is rejected.
    const REJECTION: &'static str;
}

/// Rejection for `T` with the parser or validator diagnostic attached.
pub fn malformed<T: Payload>(detail: impl Into<String>) -> AppError {
    AppError::Malformed {
        message: T::REJECTION,
        detail: detail.into(),
    }
}

async fn parse_body<S, T>(req: Request, state: &S) -> Result<T, AppError>
where
    S: Send + Sync,
    T: Payload,
{
    let Json(value) = Json::<T>::from_request(req, state)
        .await
        .map_err(|rejection| malformed::<T>(rejection.body_text()))?;
    Ok(value)
}

/// A JSON body that has been deserialized into `T`.
#[derive(Debug)]
pub struct PayloadJson<T>(pub T);

impl<S, T> FromRequest<S> for PayloadJson<T>
where
    S: Send + Sync,
    T: Payload,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        parse_body(req, state).await.map(Self)
    }
}

/// A JSON body that has been deserialized into `T` and validated.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Payload + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let value: T = parse_body(req, state).await?;
        value
            .validate()
            .map_err(|errors| malformed::<T>(errors.to_string()))?;
        Ok(Self(value))
    }
}
