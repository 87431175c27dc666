//! Alert records produced by threshold evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metric::Metric;
use crate::types::{lenient_timestamp, AreaId, Timestamp};

/// Ordinal alert severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single threshold violation for one metric in one area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub metric: Metric,
    pub area_id: AreaId,
    /// The observed value that triggered the alert.
    pub value: f64,
    /// The boundary that was crossed (warning for medium, danger for high).
    pub threshold: f64,
    pub severity: Severity,
    #[serde(deserialize_with = "lenient_timestamp::deserialize")]
    pub timestamp: Timestamp,
}

impl Alert {
    /// Human-readable notification text, without a severity prefix.
    pub fn message(&self) -> String {
        format!(
            "LEMOS ALERT: {} level {:.1} exceeds threshold {} in Area {}",
            self.metric.as_str().to_uppercase(),
            self.value,
            self.threshold,
            self.area_id,
        )
    }
}
