//! SMS delivery through the Twilio Messages REST API.
//!
//! [`TwilioTransport`] posts one form-encoded request per recipient to
//! `/2010-04-01/Accounts/{sid}/Messages.json`. There is no retry: a failed
//! request becomes a failed [`DeliveryOutcome`] and the caller moves on.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{DeliveryOutcome, SmsTransport, TransportProvider};
use crate::error::NotifyError;

/// HTTP request timeout for a single send.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Production API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.twilio.com";

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for a single Twilio send.
#[derive(Debug, thiserror::Error)]
pub enum TwilioError {
    /// The HTTP request failed (network, DNS, timeout, body decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Twilio answered with a non-2xx status.
    #[error("Twilio returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

/// Success body (only the fields we use).
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
}

/// Error body returned on 4xx/5xx.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// TwilioConfig
// ---------------------------------------------------------------------------

/// Credentials and endpoint for the Twilio API.
#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender phone number or messaging service address.
    pub from: String,
    /// API base URL, overridable for testing.
    pub api_base: String,
}

impl TwilioConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` unless all three credentials are set and non-empty.
    ///
    /// | Variable             | Required | Default                  |
    /// |----------------------|----------|--------------------------|
    /// | `TWILIO_ACCOUNT_SID` | yes      | --                       |
    /// | `TWILIO_AUTH_TOKEN`  | yes      | --                       |
    /// | `TWILIO_FROM`        | yes      | --                       |
    /// | `TWILIO_API_BASE`    | no       | `https://api.twilio.com` |
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let required = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            account_sid: required("TWILIO_ACCOUNT_SID")?,
            auth_token: required("TWILIO_AUTH_TOKEN")?,
            from: required("TWILIO_FROM")?,
            api_base: required("TWILIO_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base.trim_end_matches('/'),
            self.account_sid
        )
    }
}

// ---------------------------------------------------------------------------
// TwilioTransport
// ---------------------------------------------------------------------------

/// Sends SMS messages with one set of Twilio credentials.
pub struct TwilioTransport {
    client: reqwest::Client,
    config: TwilioConfig,
}

impl TwilioTransport {
    pub fn new(client: reqwest::Client, config: TwilioConfig) -> Self {
        Self { client, config }
    }

    /// Execute a single create-message request and return the message sid.
    async fn try_send(&self, to: &str, body: &str) -> Result<String, TwilioError> {
        let response = self
            .client
            .post(self.config.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[("To", to), ("From", self.config.from.as_str()), ("Body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.message,
                Err(_) => status.to_string(),
            };
            return Err(TwilioError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let resource: MessageResource = response.json().await?;
        Ok(resource.sid)
    }
}

#[async_trait]
impl SmsTransport for TwilioTransport {
    async fn send(&self, to: &str, body: &str) -> DeliveryOutcome {
        match self.try_send(to, body).await {
            Ok(sid) => DeliveryOutcome::sent(to, sid),
            Err(e) => DeliveryOutcome::failed(to, e.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// TwilioProvider
// ---------------------------------------------------------------------------

/// Builds a [`TwilioTransport`] from the environment on every call, sharing
/// one HTTP client (and its connection pool) between calls.
pub struct TwilioProvider {
    client: reqwest::Client,
}

impl TwilioProvider {
    pub fn new() -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl TransportProvider for TwilioProvider {
    fn transport(&self) -> Result<Arc<dyn SmsTransport>, NotifyError> {
        let config = TwilioConfig::from_env().ok_or(NotifyError::NotConfigured)?;
        Ok(Arc::new(TwilioTransport::new(self.client.clone(), config)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
