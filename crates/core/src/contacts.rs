//! Recipient resolution for alert notifications.
//!
//! Contact lists are comma-separated strings read through a
//! [`ContactSource`] on every call, so configuration changes take effect
//! without a restart.

use std::collections::HashMap;

use crate::alert::Severity;
use crate::types::AreaId;

/// Environment variable holding the escalation / system-wide contact list.
pub const EMERGENCY_CONTACTS_VAR: &str = "EMERGENCY_CONTACTS";

/// Provider of raw (comma-separated) contact lists.
pub trait ContactSource: Send + Sync {
    /// Contact list configured for one area, if any.
    fn area_contacts(&self, area_id: &AreaId) -> Option<String>;

    /// Escalation list used for high severity and system-wide alerts.
    fn emergency_contacts(&self) -> Option<String>;
}

/// Reads contact lists from the process environment.
///
/// | Variable              | Meaning                                  |
/// |-----------------------|------------------------------------------|
/// | `AREA_<id>_CONTACTS`  | recipients for area `<id>`               |
/// | `EMERGENCY_CONTACTS`  | escalation / system-wide recipients      |
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvContacts;

impl EnvContacts {
    pub fn area_var(area_id: &AreaId) -> String {
        format!("AREA_{}_CONTACTS", area_id.as_str().to_uppercase())
    }
}

impl ContactSource for EnvContacts {
    fn area_contacts(&self, area_id: &AreaId) -> Option<String> {
        std::env::var(Self::area_var(area_id)).ok()
    }

    fn emergency_contacts(&self) -> Option<String> {
        std::env::var(EMERGENCY_CONTACTS_VAR).ok()
    }
}

/// Fixed in-memory contact lists.
#[derive(Debug, Clone, Default)]
pub struct StaticContacts {
    areas: HashMap<AreaId, String>,
    emergency: Option<String>,
}

impl StaticContacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_area(mut self, area_id: AreaId, contacts: impl Into<String>) -> Self {
        self.areas.insert(area_id, contacts.into());
        self
    }

    pub fn with_emergency(mut self, contacts: impl Into<String>) -> Self {
        self.emergency = Some(contacts.into());
        self
    }
}

impl ContactSource for StaticContacts {
    fn area_contacts(&self, area_id: &AreaId) -> Option<String> {
        self.areas.get(area_id).cloned()
    }

    fn emergency_contacts(&self) -> Option<String> {
        self.emergency.clone()
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn parse_contact_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Build the ordered recipient list for a notification.
///
/// - With an area: that area's contacts, followed by the emergency contacts
///   when `severity` is [`Severity::High`].
/// - Without an area (system-wide): the emergency contacts.
///
/// Unconfigured lists contribute nothing; an empty result is a valid
/// outcome, not an error. Duplicates are kept.
pub fn resolve(
    source: &dyn ContactSource,
    area_id: Option<&AreaId>,
    severity: Severity,
) -> Vec<String> {
    let emergency = || {
        source
            .emergency_contacts()
            .map(|raw| parse_contact_list(&raw))
            .unwrap_or_default()
    };

    match area_id {
        Some(area_id) => {
            let mut recipients = source
                .area_contacts(area_id)
                .map(|raw| parse_contact_list(&raw))
                .unwrap_or_default();
            if severity == Severity::High {
                recipients.extend(emergency());
            }
            recipients
        }
        None => emergency(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(id: &str) -> AreaId {
        AreaId::new(id).unwrap()
    }

    fn contacts() -> StaticContacts {
        StaticContacts::new()
            .with_area(area("1"), "+15550001, +15550002")
            .with_area(area("2"), " , +15550003,")
            .with_emergency("+15559999,+15550001")
    }

    #[test]
    fn parses_and_trims_lists() {
        assert_eq!(
            parse_contact_list(" +1 , ,+2,"),
            vec!["+1".to_string(), "+2".to_string()]
        );
        assert!(parse_contact_list("").is_empty());
    }

    #[test]
    fn medium_severity_uses_area_list_only() {
        let recipients = resolve(&contacts(), Some(&area("1")), Severity::Medium);
        assert_eq!(recipients, vec!["+15550001", "+15550002"]);
    }

    #[test]
    fn high_severity_appends_emergency_contacts() {
        let recipients = resolve(&contacts(), Some(&area("1")), Severity::High);
        assert_eq!(
            recipients,
            vec!["+15550001", "+15550002", "+15559999", "+15550001"]
        );
    }

    #[test]
    fn high_is_superset_of_lower_severities() {
        let source = contacts();
        for id in ["1", "2", "3"] {
            let high = resolve(&source, Some(&area(id)), Severity::High);
            for lower in [Severity::Low, Severity::Medium] {
                let subset = resolve(&source, Some(&area(id)), lower);
                assert!(subset.iter().all(|r| high.contains(r)));
                assert_eq!(&high[..subset.len()], &subset[..]);
            }
        }
    }

    #[test]
    fn unconfigured_area_is_empty() {
        let recipients = resolve(&contacts(), Some(&area("9")), Severity::Low);
        assert!(recipients.is_empty());
    }

    #[test]
    fn unconfigured_area_high_severity_still_escalates() {
        let recipients = resolve(&contacts(), Some(&area("9")), Severity::High);
        assert_eq!(recipients, vec!["+15559999", "+15550001"]);
    }

    #[test]
    fn system_wide_uses_emergency_contacts() {
        let recipients = resolve(&contacts(), None, Severity::Low);
        assert_eq!(recipients, vec!["+15559999", "+15550001"]);
    }

    #[test]
    fn nothing_configured_is_empty() {
        let source = StaticContacts::new();
        assert!(resolve(&source, None, Severity::High).is_empty());
        assert!(resolve(&source, Some(&area("1")), Severity::High).is_empty());
    }

    /// Contact lists that can be edited between calls.
    #[derive(Default)]
    struct EditableContacts {
        area: std::sync::Mutex<Option<String>>,
        emergency: std::sync::Mutex<Option<String>>,
    }

    impl ContactSource for EditableContacts {
        fn area_contacts(&self, _area_id: &AreaId) -> Option<String> {
            self.area.lock().unwrap().clone()
        }

        fn emergency_contacts(&self) -> Option<String> {
            self.emergency.lock().unwrap().clone()
        }
    }

    #[test]
    fn lists_are_read_on_every_call() {
        let source = EditableContacts::default();
        assert!(resolve(&source, Some(&area("1")), Severity::High).is_empty());

        *source.area.lock().unwrap() = Some("+15550001".into());
        *source.emergency.lock().unwrap() = Some("+15559999".into());
        assert_eq!(
            resolve(&source, Some(&area("1")), Severity::High),
            vec!["+15550001", "+15559999"]
        );

        *source.area.lock().unwrap() = Some("+15550002".into());
        *source.emergency.lock().unwrap() = None;
        assert_eq!(
            resolve(&source, Some(&area("1")), Severity::High),
            vec!["+15550002"]
        );
    }

    #[test]
    fn env_contacts_follow_environment_changes() {
        // Area id unique to this test so parallel tests never share the var.
        let area_id = area("envreload");
        let var = EnvContacts::area_var(&area_id);

        std::env::remove_var(&var);
        assert!(resolve(&EnvContacts, Some(&area_id), Severity::Medium).is_empty());

        std::env::set_var(&var, "+15551230001");
        assert_eq!(
            resolve(&EnvContacts, Some(&area_id), Severity::Medium),
            vec!["+15551230001"]
        );

        std::env::set_var(&var, "+15551230002, +15551230003");
        assert_eq!(
            resolve(&EnvContacts, Some(&area_id), Severity::Medium),
            vec!["+15551230002", "+15551230003"]
        );

        std::env::remove_var(&var);
    }

    #[test]
    fn env_var_name_uses_area_id() {
        assert_eq!(EnvContacts::area_var(&area("3")), "AREA_3_CONTACTS");
        assert_eq!(EnvContacts::area_var(&area("north")), "AREA_NORTH_CONTACTS");
    }
}
