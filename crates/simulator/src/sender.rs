//! HTTP client for the LEMOS API.
//!
//! Pushes generated payloads to `POST /api/readings` and reads an area's
//! latest reading back from `GET /api/current/{area_id}`.

use std::time::Duration;

use lemos_core::alert::Alert;
use lemos_core::types::AreaId;
use serde::Deserialize;

use crate::generator::SimulatedPayload;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum SenderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

/// Summary returned by the ingestion endpoint.
#[derive(Debug, Deserialize)]
pub struct IngestSummary {
    pub message: String,
    pub areas_processed: Vec<AreaId>,
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, SenderError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Submit one payload for ingestion.
    pub async fn push_readings(
        &self,
        payload: &SimulatedPayload,
    ) -> Result<IngestSummary, SenderError> {
        let response = self
            .client
            .post(format!("{}/api/readings", self.base_url))
            .json(payload)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Fetch the latest reading stored for `area_id`.
    pub async fn current_reading(
        &self,
        area_id: &AreaId,
    ) -> Result<serde_json::Value, SenderError> {
        let response = self
            .client
            .get(format!("{}/api/current/{}", self.base_url, area_id))
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

/// Turn a non-2xx response into [`SenderError::Status`].
async fn check(response: reqwest::Response) -> Result<reqwest::Response, SenderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SenderError::Status {
        status: status.as_u16(),
        body,
    })
}
