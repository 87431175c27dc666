use std::sync::Arc;

use lemos_core::alert::Alert;
use lemos_core::contacts::ContactSource;

use crate::error::NotifyError;
use crate::fanout::{self, DispatchReport, NotificationRequest, SeverityPrefixes};
use crate::transport::TransportProvider;

/// Notification service shared by the HTTP handlers.
///
/// Cheaply cloneable. Both the contact lists and the transport credentials
/// are looked up on every call.
#[derive(Clone)]
pub struct Notifier {
    contacts: Arc<dyn ContactSource>,
    transports: Arc<dyn TransportProvider>,
    prefixes: Arc<SeverityPrefixes>,
}

impl Notifier {
    pub fn new(contacts: Arc<dyn ContactSource>, transports: Arc<dyn TransportProvider>) -> Self {
        Self {
            contacts,
            transports,
            prefixes: Arc::new(SeverityPrefixes::default()),
        }
    }

    pub fn with_prefixes(mut self, prefixes: SeverityPrefixes) -> Self {
        self.prefixes = Arc::new(prefixes);
        self
    }

    /// Whether transport credentials are currently configured.
    pub fn is_configured(&self) -> bool {
        self.transports.transport().is_ok()
    }

    /// Send a notification.
    ///
    /// Fails with [`NotifyError::NotConfigured`] before resolving recipients
    /// if the transport has no credentials.
    pub async fn notify(
        &self,
        request: &NotificationRequest,
    ) -> Result<DispatchReport, NotifyError> {
        let transport = self.transports.transport()?;
        fanout::notify(request, &self.prefixes, self.contacts.as_ref(), transport.as_ref()).await
    }

    /// Send the notification for one alert.
    pub async fn dispatch_alert(&self, alert: &Alert) -> Result<DispatchReport, NotifyError> {
        let transport = self.transports.transport()?;
        fanout::dispatch(alert, &self.prefixes, self.contacts.as_ref(), transport.as_ref()).await
    }
}
