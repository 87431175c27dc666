//! Randomized reading generation.
//!
//! Produces one multi-zone device payload per tick, in the same shape the
//! field hardware sends: a zone object per area under `area_<n>` plus the
//! water level shared by every zone.

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::SecondsFormat;
use lemos_core::metric::Metric;
use lemos_core::types::{AreaId, Timestamp};
use rand::Rng;
use serde::Serialize;

/// Device id stamped on simulated payloads.
pub const SIMULATOR_DEVICE_ID: &str = "lemos-simulator";

/// Value range drawn for each metric.
///
/// Methane and CO ranges straddle both alert boundaries so every severity
/// shows up during a run.
pub fn simulated_range(metric: Metric) -> Range<f64> {
    match metric {
        Metric::Methane => 300.0..1500.0,
        Metric::Co => 10.0..90.0,
        Metric::Temperature => 20.0..35.0,
        Metric::Humidity => 40.0..80.0,
        Metric::WaterLevel => 100.0..150.0,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoneReading {
    pub area_id: AreaId,
    pub methane: f64,
    pub co: f64,
    pub temperature: f64,
    pub humidity: f64,
}

/// A multi-zone payload ready to be posted to `/api/readings`.
#[derive(Debug, Clone, Serialize)]
pub struct SimulatedPayload {
    #[serde(flatten)]
    pub zones: BTreeMap<String, ZoneReading>,
    pub water_level: f64,
    pub timestamp: String,
    pub device_id: &'static str,
}

/// Draw one payload covering `areas`.
///
/// Zone keys follow area order (`area_1` is the first area), and each zone
/// names its area explicitly so non-numeric ids survive the round trip.
pub fn generate<R: Rng + ?Sized>(
    rng: &mut R,
    areas: &[AreaId],
    now: Timestamp,
) -> SimulatedPayload {
    let zones = areas
        .iter()
        .enumerate()
        .map(|(index, area_id)| {
            let zone = ZoneReading {
                area_id: area_id.clone(),
                methane: draw(rng, Metric::Methane),
                co: draw(rng, Metric::Co),
                temperature: draw(rng, Metric::Temperature),
                humidity: draw(rng, Metric::Humidity),
            };
            (format!("area_{}", index + 1), zone)
        })
        .collect();

    SimulatedPayload {
        zones,
        water_level: draw(rng, Metric::WaterLevel),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        device_id: SIMULATOR_DEVICE_ID,
    }
}

/// Uniform draw rounded to one decimal, like the field firmware reports.
fn draw<R: Rng + ?Sized>(rng: &mut R, metric: Metric) -> f64 {
    let value = rng.random_range(simulated_range(metric));
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use lemos_core::reading::IngestPayload;

    use super::*;

    fn areas(ids: &[&str]) -> Vec<AreaId> {
        ids.iter().map(|id| AreaId::new(*id).unwrap()).collect()
    }

    #[test]
    fn values_stay_within_simulated_ranges() {
        let mut rng = rand::rng();
        let areas = areas(&["1", "2", "3"]);
        for _ in 0..200 {
            let payload = generate(&mut rng, &areas, Utc::now());
            let water = simulated_range(Metric::WaterLevel);
            assert!(payload.water_level >= water.start && payload.water_level <= water.end);
            for zone in payload.zones.values() {
                for (metric, value) in [
                    (Metric::Methane, zone.methane),
                    (Metric::Co, zone.co),
                    (Metric::Temperature, zone.temperature),
                    (Metric::Humidity, zone.humidity),
                ] {
                    let range = simulated_range(metric);
                    assert!(
                        value >= range.start && value <= range.end,
                        "{metric} = {value}"
                    );
                }
            }
        }
    }

    #[test]
    fn payload_is_accepted_as_multi_zone_ingestion() {
        let areas = areas(&["north", "south"]);
        let now = Utc::now();
        let payload = generate(&mut rand::rng(), &areas, now);
        let json = serde_json::to_value(&payload).unwrap();

        let ingest = IngestPayload::from_json(json).unwrap();
        assert!(ingest.is_multi_zone());

        let readings = ingest.into_readings(now).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].area_id.as_str(), "north");
        assert_eq!(readings[1].area_id.as_str(), "south");
        assert_eq!(readings[0].water_level, payload.water_level);
        assert_eq!(readings[1].device_id.as_deref(), Some(SIMULATOR_DEVICE_ID));
    }

    #[test]
    fn zone_keys_follow_area_order() {
        let payload = generate(&mut rand::rng(), &areas(&["7", "3"]), Utc::now());
        let keys: Vec<&str> = payload.zones.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["area_1", "area_2"]);
        assert_eq!(payload.zones["area_1"].area_id.as_str(), "7");
    }
}
