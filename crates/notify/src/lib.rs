//! LEMOS notification delivery.
//!
//! - [`transport`]: the [`SmsTransport`] seam and its Twilio implementation.
//! - [`fanout`]: message formatting and per-recipient dispatch.
//! - [`Notifier`]: bundles contact configuration, a transport provider and
//!   the severity prefixes into the service the API calls.

pub mod error;
pub mod fanout;
pub mod notifier;
pub mod transport;

pub use error::NotifyError;
pub use fanout::{DispatchReport, NotificationRequest, SeverityPrefixes};
pub use notifier::Notifier;
pub use transport::twilio::{TwilioConfig, TwilioProvider, TwilioTransport};
pub use transport::{DeliveryOutcome, DeliveryStatus, SmsTransport, TransportProvider};
