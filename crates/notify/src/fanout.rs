//! Notification fanout: format, resolve recipients, send to each.
//!
//! Sends are sequential and isolated. A failed recipient is recorded and the
//! loop continues; the fanout as a whole succeeds once every recipient has
//! been attempted, whatever the individual outcomes.

use lemos_core::alert::{Alert, Severity};
use lemos_core::contacts::{self, ContactSource};
use lemos_core::types::AreaId;
use serde::Serialize;

use crate::error::NotifyError;
use crate::transport::{DeliveryOutcome, DeliveryStatus, SmsTransport};

// ---------------------------------------------------------------------------
// SeverityPrefixes
// ---------------------------------------------------------------------------

/// Marker prepended to every message according to its severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityPrefixes {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl Default for SeverityPrefixes {
    fn default() -> Self {
        Self {
            high: "🚨 URGENT".to_string(),
            medium: "⚠️ WARNING".to_string(),
            low: "ℹ️ INFO".to_string(),
        }
    }
}

impl SeverityPrefixes {
    pub fn prefix(&self, severity: Severity) -> &str {
        match severity {
            Severity::High => &self.high,
            Severity::Medium => &self.medium,
            Severity::Low => &self.low,
        }
    }

    /// `"<prefix> <message>"`.
    pub fn apply(&self, severity: Severity, message: &str) -> String {
        format!("{} {}", self.prefix(severity), message)
    }
}

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

/// A message to deliver to the recipients of an area (or system-wide).
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub message: String,
    pub severity: Severity,
    /// `None` for a system-wide notification.
    pub area_id: Option<AreaId>,
}

impl NotificationRequest {
    pub fn new(message: impl Into<String>, severity: Severity, area_id: Option<AreaId>) -> Self {
        Self {
            message: message.into(),
            severity,
            area_id,
        }
    }

    /// Notification for one alert, addressed to the alert's area.
    pub fn for_alert(alert: &Alert) -> Self {
        Self::new(alert.message(), alert.severity, Some(alert.area_id.clone()))
    }
}

/// Outcome of a completed fanout.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// The full text that was sent, prefix included.
    pub message: String,
    /// One entry per recipient, in recipient order.
    pub results: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    pub fn sent_count(&self) -> usize {
        self.results.iter().filter(|o| o.is_sent()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.results.len() - self.sent_count()
    }
}

// ---------------------------------------------------------------------------
// Fanout
// ---------------------------------------------------------------------------

/// Deliver a notification to every resolved recipient.
///
/// Returns [`NotifyError::NoRecipients`] without touching the transport when
/// recipient resolution comes back empty.
pub async fn notify(
    request: &NotificationRequest,
    prefixes: &SeverityPrefixes,
    contacts: &dyn ContactSource,
    transport: &dyn SmsTransport,
) -> Result<DispatchReport, NotifyError> {
    let recipients = contacts::resolve(contacts, request.area_id.as_ref(), request.severity);
    if recipients.is_empty() {
        tracing::warn!(
            area_id = request.area_id.as_ref().map(AreaId::as_str),
            severity = %request.severity,
            "No recipients configured, notification not sent"
        );
        return Err(NotifyError::NoRecipients);
    }

    let message = prefixes.apply(request.severity, &request.message);
    let mut results = Vec::with_capacity(recipients.len());

    for recipient in &recipients {
        let outcome = transport.send(recipient, &message).await;
        match &outcome.status {
            DeliveryStatus::Sent { sid } => {
                tracing::info!(to = %recipient, sid = %sid, "SMS sent");
            }
            DeliveryStatus::Failed { error } => {
                tracing::warn!(to = %recipient, error = %error, "Failed to send SMS");
            }
        }
        results.push(outcome);
    }

    let report = DispatchReport { message, results };
    tracing::info!(
        recipients = report.results.len(),
        sent = report.sent_count(),
        failed = report.failed_count(),
        "Notification fanout complete"
    );
    Ok(report)
}

/// Format an alert and deliver it to the recipients of its area.
pub async fn dispatch(
    alert: &Alert,
    prefixes: &SeverityPrefixes,
    contacts: &dyn ContactSource,
    transport: &dyn SmsTransport,
) -> Result<DispatchReport, NotifyError> {
    notify(
        &NotificationRequest::for_alert(alert),
        prefixes,
        contacts,
        transport,
    )
    .await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::Utc;
    use lemos_core::contacts::StaticContacts;
    use lemos_core::metric::Metric;

    use super::*;

    /// Records every send; fails the recipients listed in `failing`.
    #[derive(Default)]
    struct RecordingTransport {
        failing: Vec<String>,
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SmsTransport for RecordingTransport {
        async fn send(&self, to: &str, body: &str) -> DeliveryOutcome {
            self.sent
                .lock()
                .unwrap()
                .push((to.to_string(), body.to_string()));
            if self.failing.iter().any(|f| f == to) {
                DeliveryOutcome::failed(to, "carrier rejected")
            } else {
                DeliveryOutcome::sent(to, format!("SM{}", to.len()))
            }
        }
    }

    fn area(id: &str) -> AreaId {
        AreaId::new(id).unwrap()
    }

    fn alert(severity: Severity) -> Alert {
        Alert {
            metric: Metric::Methane,
            area_id: area("1"),
            value: 1100.0,
            threshold: 1000.0,
            severity,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn prefixes_match_severity() {
        let prefixes = SeverityPrefixes::default();
        assert_eq!(prefixes.apply(Severity::High, "x"), "🚨 URGENT x");
        assert_eq!(prefixes.apply(Severity::Medium, "x"), "⚠️ WARNING x");
        assert_eq!(prefixes.apply(Severity::Low, "x"), "ℹ️ INFO x");
    }

    #[tokio::test]
    async fn dispatch_formats_and_sends_to_area_and_escalation() {
        let contacts = StaticContacts::new()
            .with_area(area("1"), "+1001,+1002")
            .with_emergency("+1999");
        let transport = RecordingTransport::default();

        let report = dispatch(
            &alert(Severity::High),
            &SeverityPrefixes::default(),
            &contacts,
            &transport,
        )
        .await
        .unwrap();

        assert_eq!(
            report.message,
            "🚨 URGENT LEMOS ALERT: METHANE level 1100.0 exceeds threshold 1000 in Area 1"
        );
        let sent = transport.sent.lock().unwrap();
        let recipients: Vec<&str> = sent.iter().map(|(to, _)| to.as_str()).collect();
        assert_eq!(recipients, ["+1001", "+1002", "+1999"]);
        assert!(sent.iter().all(|(_, body)| *body == report.message));
        assert_eq!(report.sent_count(), 3);
    }

    #[tokio::test]
    async fn failure_does_not_stop_remaining_recipients() {
        let contacts = StaticContacts::new().with_area(area("1"), "+1001,+1002,+1003,+1004");
        let transport = RecordingTransport {
            failing: vec!["+1002".into()],
            ..Default::default()
        };

        let report = dispatch(
            &alert(Severity::Medium),
            &SeverityPrefixes::default(),
            &contacts,
            &transport,
        )
        .await
        .unwrap();

        assert_eq!(transport.sent.lock().unwrap().len(), 4);
        assert_eq!(report.results.len(), 4);
        assert!(report.results[0].is_sent());
        assert_matches!(
            &report.results[1].status,
            DeliveryStatus::Failed { error } if error == "carrier rejected"
        );
        assert!(report.results[2].is_sent());
        assert!(report.results[3].is_sent());
        assert_eq!(report.failed_count(), 1);
    }

    #[tokio::test]
    async fn no_recipients_skips_transport() {
        let contacts = StaticContacts::new().with_emergency("+1999");
        let transport = RecordingTransport::default();
        let request = NotificationRequest::new("test", Severity::Low, Some(area("1")));

        let result = notify(&request, &SeverityPrefixes::default(), &contacts, &transport).await;

        assert_matches!(result, Err(NotifyError::NoRecipients));
        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn system_wide_notification_goes_to_emergency_list() {
        let contacts = StaticContacts::new()
            .with_area(area("1"), "+1001")
            .with_emergency("+1999,+1998");
        let transport = RecordingTransport::default();
        let request = NotificationRequest::new("System Test", Severity::Low, None);

        let report = notify(&request, &SeverityPrefixes::default(), &contacts, &transport)
            .await
            .unwrap();

        assert_eq!(report.message, "ℹ️ INFO System Test");
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.results[0].recipient, "+1999");
    }

    #[tokio::test]
    async fn duplicate_recipients_are_each_attempted() {
        let contacts = StaticContacts::new()
            .with_area(area("1"), "+1001")
            .with_emergency("+1001");
        let transport = RecordingTransport::default();

        let report = dispatch(
            &alert(Severity::High),
            &SeverityPrefixes::default(),
            &contacts,
            &transport,
        )
        .await
        .unwrap();

        assert_eq!(report.results.len(), 2);
    }
}
