/// Errors that stop a notification before any message is delivered.
///
/// Per-recipient delivery failures are not errors at this level; they are
/// recorded as failed [`DeliveryOutcome`](crate::DeliveryOutcome)s.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Transport credentials are missing from the configuration.
    #[error("Twilio credentials not configured")]
    NotConfigured,

    /// Recipient resolution produced an empty list.
    #[error("No recipients configured for this area")]
    NoRecipients,

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
