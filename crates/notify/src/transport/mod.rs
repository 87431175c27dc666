//! Outbound message transports.
//!
//! [`SmsTransport`] is the boundary over the third-party messaging API: one
//! call per recipient, always answered with a [`DeliveryOutcome`]. A
//! [`TransportProvider`] builds a transport from the current configuration
//! and fails closed when credentials are missing.

pub mod twilio;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::NotifyError;

// ---------------------------------------------------------------------------
// DeliveryOutcome
// ---------------------------------------------------------------------------

/// Result of one send attempt to one recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryOutcome {
    pub recipient: String,
    #[serde(flatten)]
    pub status: DeliveryStatus,
}

/// Serialized as `"status": "sent"` + `sid`, or `"status": "failed"` + `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent { sid: String },
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn sent(recipient: impl Into<String>, sid: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            status: DeliveryStatus::Sent { sid: sid.into() },
        }
    }

    pub fn failed(recipient: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            status: DeliveryStatus::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self.status, DeliveryStatus::Sent { .. })
    }
}

// ---------------------------------------------------------------------------
// Seams
// ---------------------------------------------------------------------------

/// Sends a single text message.
#[async_trait]
pub trait SmsTransport: Send + Sync {
    /// Deliver `body` to `to`. Failures are reported in the outcome.
    async fn send(&self, to: &str, body: &str) -> DeliveryOutcome;
}

/// Builds a transport from configuration read at call time.
pub trait TransportProvider: Send + Sync {
    /// Returns [`NotifyError::NotConfigured`] when credentials are missing.
    fn transport(&self) -> Result<Arc<dyn SmsTransport>, NotifyError>;
}
