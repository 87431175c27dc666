//! In-memory cache of the most recent reading per area.
//!
//! Feeds the presentation endpoints (`/status`, `/current/{area_id}`,
//! `GET /alerts`). It is not persistence: the cache starts empty and is lost
//! on restart.

use std::collections::BTreeMap;

use lemos_core::reading::Reading;
use lemos_core::types::AreaId;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct LatestReadings {
    inner: RwLock<BTreeMap<AreaId, Reading>>,
}

impl LatestReadings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store readings, replacing any older reading for the same area.
    ///
    /// A reading older than the cached one is ignored, so overlapping
    /// submissions cannot roll an area back in time.
    pub async fn record(&self, readings: &[Reading]) {
        let mut guard = self.inner.write().await;
        for reading in readings {
            match guard.get(&reading.area_id) {
                Some(current) if current.timestamp > reading.timestamp => {}
                _ => {
                    guard.insert(reading.area_id.clone(), reading.clone());
                }
            }
        }
    }

    pub async fn get(&self, area_id: &AreaId) -> Option<Reading> {
        self.inner.read().await.get(area_id).cloned()
    }

    /// All cached readings, ordered by area id.
    pub async fn snapshot(&self) -> BTreeMap<AreaId, Reading> {
        self.inner.read().await.clone()
    }
}
