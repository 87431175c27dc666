//! Threshold evaluation engine for sensor readings.
//!
//! Pure logic, no I/O. The caller passes the readings and the rule table in
//! and decides what to do with the resulting alerts.

use serde::Serialize;

use crate::alert::{Alert, Severity};
use crate::error::CoreError;
use crate::metric::Metric;
use crate::reading::Reading;

/// Warning/danger boundaries for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdRule {
    pub metric: Metric,
    pub warning: f64,
    pub danger: f64,
}

impl ThresholdRule {
    /// Build a rule, requiring finite bounds with `warning < danger`.
    pub fn new(metric: Metric, warning: f64, danger: f64) -> Result<Self, CoreError> {
        if !warning.is_finite() || !danger.is_finite() {
            return Err(CoreError::Validation(format!(
                "{metric} thresholds must be finite numbers"
            )));
        }
        if warning >= danger {
            return Err(CoreError::Validation(format!(
                "{metric} warning threshold ({warning}) must be less than danger threshold ({danger})"
            )));
        }
        Ok(Self {
            metric,
            warning,
            danger,
        })
    }
}

/// Methane in ppm.
pub const METHANE_RULE: ThresholdRule = ThresholdRule {
    metric: Metric::Methane,
    warning: 800.0,
    danger: 1000.0,
};

/// Carbon monoxide in ppm.
pub const CO_RULE: ThresholdRule = ThresholdRule {
    metric: Metric::Co,
    warning: 30.0,
    danger: 50.0,
};

/// The canonical process-wide rule table.
pub const DEFAULT_RULES: [ThresholdRule; 2] = [METHANE_RULE, CO_RULE];

/// Classify a value against a rule.
///
/// `None` below the warning threshold and for NaN or infinite values.
pub fn classify(value: f64, rule: &ThresholdRule) -> Option<Severity> {
    if !value.is_finite() {
        return None;
    }
    if value >= rule.danger {
        Some(Severity::High)
    } else if value >= rule.warning {
        Some(Severity::Medium)
    } else {
        None
    }
}

/// Dashboard status of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Normal,
    Warning,
    Danger,
}

impl From<Option<Severity>> for MetricStatus {
    fn from(severity: Option<Severity>) -> Self {
        match severity {
            Some(Severity::High) => MetricStatus::Danger,
            Some(Severity::Medium | Severity::Low) => MetricStatus::Warning,
            None => MetricStatus::Normal,
        }
    }
}

/// Evaluate one reading against every rule.
///
/// Produces at most one alert per rule, in rule order.
pub fn evaluate(reading: &Reading, rules: &[ThresholdRule]) -> Vec<Alert> {
    rules
        .iter()
        .filter_map(|rule| {
            let value = reading.value(rule.metric);
            let severity = classify(value, rule)?;
            let threshold = match severity {
                Severity::High => rule.danger,
                Severity::Medium | Severity::Low => rule.warning,
            };
            Some(Alert {
                metric: rule.metric,
                area_id: reading.area_id.clone(),
                value,
                threshold,
                severity,
                timestamp: reading.timestamp,
            })
        })
        .collect()
}

/// Evaluate a batch of readings (typically one per area).
pub fn evaluate_batch(readings: &[Reading], rules: &[ThresholdRule]) -> Vec<Alert> {
    readings
        .iter()
        .flat_map(|reading| evaluate(reading, rules))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
