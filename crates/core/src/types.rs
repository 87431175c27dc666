//! Identifier and time types shared by every LEMOS crate.

use std::fmt;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<Utc>;

/// Identifier of a monitored area.
///
/// Devices and dashboards send area ids either as JSON strings (`"1"`) or as
/// numbers (`1`); both forms deserialize to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AreaId(String);

impl AreaId {
    /// Build an area id, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(CoreError::Validation("area_id must not be empty".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AreaId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Number(u64),
        }

        let raw = match Wire::deserialize(deserializer)? {
            Wire::Text(s) => s,
            Wire::Number(n) => n.to_string(),
        };
        AreaId::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Parse an ISO-8601 timestamp.
///
/// Accepts RFC 3339 strings (`2024-05-01T10:00:00Z`, `...+02:00`) and naive
/// date-times without an offset (`2024-05-01T10:00:00.123456`), which are
/// taken to be UTC.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp, CoreError> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| CoreError::Validation(format!("invalid timestamp: {raw}")))
}

/// Serde adapter for [`parse_timestamp`].
pub mod lenient_timestamp {
    use serde::{Deserialize, Deserializer};

    use super::Timestamp;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
