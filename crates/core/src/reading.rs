//! Sensor readings and the ingestion normalization step.
//!
//! Devices report readings in two shapes:
//!
//! - **single-zone**: one flat object carrying `area_id` and the metric fields.
//! - **multi-zone**: one object per zone under `area_1`, `area_2`, ... keys,
//!   plus channels shared by every zone (`water_level`, `soil_moisture`,
//!   `vibration`, `ir_detection`, `timestamp`, `device_id`).
//!
//! Older firmware also uses legacy field names (`mq4_avg` for methane,
//! `mq7_avg` for CO, `temp` for temperature, `distance` /
//! `ultrasonic_distance` for water level). All of that is resolved here, so
//! the evaluator only ever sees a canonical [`Reading`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::metric::Metric;
use crate::types::{parse_timestamp, AreaId, Timestamp};

/// Device id recorded for multi-zone payloads that do not name a device.
pub const DEFAULT_MULTI_ZONE_DEVICE: &str = "ESP32_MultiZone";

/// Key prefix of a zone object inside a multi-zone payload.
const ZONE_KEY_PREFIX: &str = "area_";

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// A normalized sensor reading for one area at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    pub area_id: AreaId,
    pub timestamp: Timestamp,
    pub methane: f64,
    pub co: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub water_level: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ir_detection: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl Reading {
    /// Create a reading with every metric at zero.
    ///
    /// Enrich it with [`with_metric`](Reading::with_metric).
    pub fn new(area_id: AreaId, timestamp: Timestamp) -> Self {
        Self {
            area_id,
            timestamp,
            methane: 0.0,
            co: 0.0,
            temperature: 0.0,
            humidity: 0.0,
            water_level: 0.0,
            soil_moisture: None,
            vibration: None,
            ir_detection: None,
            device_id: None,
        }
    }

    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        *self.metric_mut(metric) = value;
        self
    }

    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Methane => self.methane,
            Metric::Co => self.co,
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::WaterLevel => self.water_level,
        }
    }

    fn metric_mut(&mut self, metric: Metric) -> &mut f64 {
        match metric {
            Metric::Methane => &mut self.methane,
            Metric::Co => &mut self.co,
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::WaterLevel => &mut self.water_level,
        }
    }

    /// Clamp every metric into its [`Metric::sensor_range`].
    ///
    /// Returns the adjustments that were made so the caller can log them.
    pub fn clamp_to_sensor_ranges(&mut self) -> Vec<ClampedValue> {
        let mut clamped = Vec::new();
        for metric in Metric::ALL {
            let (min, max) = metric.sensor_range();
            let slot = self.metric_mut(metric);
            let original = *slot;
            if original < min || original > max {
                *slot = original.clamp(min, max);
                clamped.push(ClampedValue {
                    metric,
                    original,
                    clamped: *slot,
                });
            }
        }
        clamped
    }
}

/// A metric value that was pulled back into its sensor range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampedValue {
    pub metric: Metric,
    pub original: f64,
    pub clamped: f64,
}

// ---------------------------------------------------------------------------
// Raw inbound shapes
// ---------------------------------------------------------------------------

/// A reading as sent by a device, before normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReading {
    pub area_id: Option<AreaId>,
    pub timestamp: Option<String>,
    pub device_id: Option<String>,

    pub methane: Option<f64>,
    pub mq4_avg: Option<f64>,

    pub co: Option<f64>,
    pub mq7_avg: Option<f64>,

    pub temperature: Option<f64>,
    pub temp: Option<f64>,

    pub humidity: Option<f64>,

    pub water_level: Option<f64>,
    pub distance: Option<f64>,
    pub ultrasonic_distance: Option<f64>,

    pub soil_moisture: Option<f64>,
    pub vibration: Option<f64>,
    pub ir_detection: Option<f64>,
}

impl RawReading {
    /// Resolve a metric from its canonical field, falling back to the legacy
    /// field names in order of preference.
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Methane => self.methane.or(self.mq4_avg),
            Metric::Co => self.co.or(self.mq7_avg),
            Metric::Temperature => self.temperature.or(self.temp),
            Metric::Humidity => self.humidity,
            Metric::WaterLevel => self
                .water_level
                .or(self.distance)
                .or(self.ultrasonic_distance),
        }
    }

    /// Turn this raw reading into a canonical [`Reading`].
    ///
    /// `now` is used when the payload carries no timestamp. Every missing
    /// required field is reported in a single validation error.
    pub fn normalize(&self, now: Timestamp) -> Result<Reading, CoreError> {
        let mut missing: Vec<&'static str> = Vec::new();
        if self.area_id.is_none() {
            missing.push("area_id");
        }
        for metric in Metric::ALL {
            if self.metric(metric).is_none() {
                missing.push(metric.as_str());
            }
        }
        let area_id = match (&self.area_id, missing.is_empty()) {
            (Some(area_id), true) => area_id.clone(),
            _ => {
                return Err(CoreError::Validation(format!(
                    "Missing required fields: {}",
                    missing.join(", ")
                )))
            }
        };

        let timestamp = match &self.timestamp {
            Some(raw) => parse_timestamp(raw)?,
            None => now,
        };

        let mut reading = Reading::new(area_id, timestamp);
        for metric in Metric::ALL {
            if let Some(value) = self.metric(metric) {
                reading = reading.with_metric(metric, value);
            }
        }
        reading.soil_moisture = self.soil_moisture;
        reading.vibration = self.vibration;
        reading.ir_detection = self.ir_detection;
        reading.device_id = self.device_id.clone();
        Ok(reading)
    }
}

/// Channels reported once per multi-zone payload and copied into every zone.
#[derive(Debug, Clone, Default, Deserialize)]
struct SharedChannels {
    water_level: Option<f64>,
    soil_moisture: Option<f64>,
    vibration: Option<f64>,
    ir_detection: Option<f64>,
    timestamp: Option<String>,
    device_id: Option<String>,
}

// ---------------------------------------------------------------------------
// IngestPayload
// ---------------------------------------------------------------------------

/// A parsed reading submission in either device format.
#[derive(Debug, Clone)]
pub enum IngestPayload {
    Single(RawReading),
    /// Zones in ascending zone-number order.
    MultiZone(Vec<RawReading>),
}

impl IngestPayload {
    /// Detect the payload format and parse it.
    ///
    /// Shape errors (not an object, wrongly typed fields) are
    /// [`CoreError::Malformed`]; missing fields are only detected later by
    /// [`into_readings`](Self::into_readings).
    ///
    /// An object with at least one `area_<n>` key is a multi-zone payload.
    /// Each zone inherits the shared channels; a zone without its own
    /// `area_id` takes `<n>` from its key. Shared `water_level` overrides the
    /// zone's own value and defaults to `0` when neither is present.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CoreError> {
        let serde_json::Value::Object(map) = &value else {
            return Err(CoreError::Malformed(
                "reading payload must be a JSON object".into(),
            ));
        };

        let mut zones: Vec<(u32, &serde_json::Value)> = map
            .iter()
            .filter_map(|(key, zone)| zone_number(key).map(|n| (n, zone)))
            .collect();

        if zones.is_empty() {
            let raw: RawReading = serde_json::from_value(value.clone())
                .map_err(|e| CoreError::Malformed(format!("invalid reading: {e}")))?;
            return Ok(Self::Single(raw));
        }

        zones.sort_by_key(|(n, _)| *n);

        let shared: SharedChannels = serde_json::from_value(value.clone())
            .map_err(|e| CoreError::Malformed(format!("invalid shared channels: {e}")))?;

        let mut readings = Vec::with_capacity(zones.len());
        for (number, zone) in zones {
            let mut raw: RawReading = serde_json::from_value(zone.clone()).map_err(|e| {
                CoreError::Malformed(format!("invalid reading for {ZONE_KEY_PREFIX}{number}: {e}"))
            })?;
            if raw.area_id.is_none() {
                raw.area_id = Some(AreaId::new(number.to_string())?);
            }
            raw.water_level = Some(shared.water_level.or(raw.water_level).unwrap_or(0.0));
            raw.soil_moisture = shared.soil_moisture.or(raw.soil_moisture);
            raw.vibration = shared.vibration.or(raw.vibration);
            raw.ir_detection = shared.ir_detection.or(raw.ir_detection);
            raw.timestamp = shared.timestamp.clone().or(raw.timestamp);
            raw.device_id = Some(
                shared
                    .device_id
                    .clone()
                    .or(raw.device_id)
                    .unwrap_or_else(|| DEFAULT_MULTI_ZONE_DEVICE.to_string()),
            );
            readings.push(raw);
        }

        Ok(Self::MultiZone(readings))
    }

    pub fn is_multi_zone(&self) -> bool {
        matches!(self, Self::MultiZone(_))
    }

    /// Normalize every zone of the payload.
    ///
    /// Fails on the first zone that cannot be normalized; nothing is returned
    /// for a partially valid payload.
    pub fn into_readings(self, now: Timestamp) -> Result<Vec<Reading>, CoreError> {
        match self {
            Self::Single(raw) => Ok(vec![raw.normalize(now)?]),
            Self::MultiZone(zones) => zones.iter().map(|raw| raw.normalize(now)).collect(),
        }
    }
}

/// `area_7` -> `Some(7)`.
fn zone_number(key: &str) -> Option<u32> {
    key.strip_prefix(ZONE_KEY_PREFIX)?.parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
