//! The per-device stationary-state machine.

use std::collections::HashMap;

use tracing::{debug, warn};

use fleet_core::{DeviceId, GeoPoint, UnixMs};

use crate::store::StateStore;

/// Namespace key the record map is persisted under.
pub const STORAGE_KEY: &str = "fleet.stationary-state.v1";

/// Observable motion state of a device.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotionState {
    Moving,
    Stopped,
    Parked,
}

impl std::fmt::Display for MotionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MotionState::Moving => "moving",
            MotionState::Stopped => "stopped",
            MotionState::Parked => "parked",
        };
        f.write_str(s)
    }
}

/// Dwell record for one stationary device.
///
/// `stopped_since` only moves when the device actually relocates beyond the
/// reuse radius; jitter inside the radius carries it forward unchanged.
#[derive(Copy, Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MotionRecord {
    pub latitude: f64,
    pub longitude: f64,
    /// Start of the current dwell period.
    pub stopped_since: UnixMs,
    /// Last time this record was touched; drives age-based eviction.
    pub last_seen: UnixMs,
}

/// Result of one tracker evaluation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MotionUpdate {
    pub state: MotionState,
    /// Present for `Stopped`/`Parked`, `None` for `Moving`.
    pub stopped_since: Option<UnixMs>,
}

/// Tracker thresholds.
#[derive(Copy, Clone, Debug)]
pub struct TrackerConfig {
    /// Jitter radius: a stationary fix within this distance of the stored
    /// coordinate continues the existing dwell period.
    pub reuse_radius_m: f64,
    /// Dwell duration after which `stopped` becomes `parked`.
    pub parked_after_ms: i64,
    /// Records untouched longer than this are dropped on load.
    pub max_record_age_ms: i64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            reuse_radius_m: 30.0,
            parked_after_ms: 10 * 60 * 1_000,
            max_record_age_ms: 30 * 24 * 60 * 60 * 1_000,
        }
    }
}

/// Per-device moving/stopped/parked state machine.
///
/// Owns its record table (no process-wide statics); create one per live
/// view and hand it the store the host application persists through.  The
/// tracker never fails an update: persistence errors are logged and
/// swallowed, and the machine keeps operating in memory.
pub struct StationaryTracker<S: StateStore> {
    records: HashMap<DeviceId, MotionRecord>,
    config: TrackerConfig,
    store: S,
}

impl<S: StateStore> StationaryTracker<S> {
    /// Create a tracker, loading persisted records through `store`.
    ///
    /// An absent or corrupt blob loads as empty state.  Records whose
    /// `last_seen` is older than `max_record_age_ms` relative to `now` are
    /// dropped so the table cannot grow without bound across restarts.
    pub fn load(store: S, config: TrackerConfig, now: UnixMs) -> Self {
        let mut records: HashMap<DeviceId, MotionRecord> = HashMap::new();

        match store.load(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<HashMap<DeviceId, MotionRecord>>(&raw) {
                Ok(persisted) => {
                    let before = persisted.len();
                    records = persisted
                        .into_iter()
                        .filter(|(_, r)| now.since(r.last_seen) <= config.max_record_age_ms)
                        .collect();
                    debug!(
                        loaded = records.len(),
                        expired = before - records.len(),
                        "loaded stationary state"
                    );
                }
                Err(e) => warn!(error = %e, "corrupt stationary state blob, starting empty"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to load stationary state, starting empty"),
        }

        Self { records, config, store }
    }

    /// Evaluate one fix.
    ///
    /// `speed_kmh` is the already-converted ground speed; any positive
    /// value means the device is moving and its dwell record is deleted —
    /// motion resets the dwell clock entirely.
    pub fn update(
        &mut self,
        device: DeviceId,
        position: GeoPoint,
        speed_kmh: f64,
        fix_time: UnixMs,
        now: UnixMs,
    ) -> MotionUpdate {
        if speed_kmh > 0.0 {
            if self.records.remove(&device).is_some() {
                self.persist();
            }
            return MotionUpdate { state: MotionState::Moving, stopped_since: None };
        }

        // Non-finite coordinates measure as infinitely far and start a
        // fresh dwell period; the next finite fix starts fresh again.
        let stopped_since = match self.records.get(&device) {
            Some(existing) => {
                let stored = GeoPoint::new(existing.latitude, existing.longitude);
                if stored.distance_m(position) <= self.config.reuse_radius_m {
                    existing.stopped_since
                } else {
                    fix_time
                }
            }
            None => fix_time,
        };

        self.records.insert(
            device,
            MotionRecord {
                latitude: position.lat,
                longitude: position.lon,
                stopped_since,
                last_seen: now,
            },
        );
        self.persist();

        let state = if now.since(stopped_since) >= self.config.parked_after_ms {
            MotionState::Parked
        } else {
            MotionState::Stopped
        };
        MotionUpdate { state, stopped_since: Some(stopped_since) }
    }

    /// Forget a device's dwell record.
    pub fn clear(&mut self, device: DeviceId) {
        if self.records.remove(&device).is_some() {
            self.persist();
        }
    }

    /// The current dwell record for a device, if any.
    pub fn record(&self, device: DeviceId) -> Option<&MotionRecord> {
        self.records.get(&device)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize and save the full record map.  Failures are swallowed —
    /// the tracker must keep functioning in-memory-only.
    fn persist(&self) {
        let payload = match serde_json::to_string(&self.records) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "failed to serialize stationary state");
                return;
            }
        };
        if let Err(e) = self.store.save(STORAGE_KEY, &payload) {
            warn!(error = %e, "failed to persist stationary state");
        }
    }
}
