//! Sensor metric identifiers.
//!
//! The serialized names match the JSON field names of a normalized reading
//! and the `type` field of an alert.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Methane concentration in ppm (MQ-4 sensors).
    Methane,
    /// Carbon monoxide concentration in ppm (MQ-7 sensors).
    Co,
    /// Ambient temperature in degrees Celsius.
    Temperature,
    /// Relative humidity in percent.
    Humidity,
    /// Water level in centimetres (ultrasonic distance sensor).
    WaterLevel,
}

impl Metric {
    pub const ALL: [Metric; 5] = [
        Metric::Methane,
        Metric::Co,
        Metric::Temperature,
        Metric::Humidity,
        Metric::WaterLevel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Methane => "methane",
            Metric::Co => "co",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::WaterLevel => "water_level",
        }
    }

    /// Physically plausible sensor range; values outside are clamped on ingest.
    pub fn sensor_range(self) -> (f64, f64) {
        match self {
            Metric::Methane => (0.0, 10_000.0),
            Metric::Co => (0.0, 1_000.0),
            Metric::Temperature => (-40.0, 85.0),
            Metric::Humidity => (0.0, 100.0),
            Metric::WaterLevel => (0.0, 500.0),
        }
    }

    /// Whether a negative value is physically impossible for this metric.
    pub fn is_non_negative(self) -> bool {
        self.sensor_range().0 >= 0.0
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
