//! The `TrackingEngine` struct and its ingest/frame surface.

use std::collections::BTreeMap;

use tracing::{debug, info};

use fleet_animate::{AnimatedPoint, AnimatorConfig, PositionAnimator};
use fleet_core::{DeviceId, GeofenceId, PositionFix, UnixMs, knots_to_kmh};
use fleet_geocode::{AddressCache, CacheConfig, GeocodeResult, Geocoder, Resolution};
use fleet_geofence::{
    GeofenceDescriptor, GeofenceIndex, Membership, compute_membership, occupant_counts,
};
use fleet_motion::{MotionUpdate, StateStore, StationaryTracker, TrackerConfig};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Per-component configuration, bundled for one engine instance.
#[derive(Copy, Clone, Debug, Default)]
pub struct EngineConfig {
    pub tracker:  TrackerConfig,
    pub cache:    CacheConfig,
    pub animator: AnimatorConfig,
}

// ── TrackingEngine ────────────────────────────────────────────────────────────

/// The live tracking state for one fleet.
///
/// Owns the four stateful components and the latest accepted fix per
/// device.  Everything downstream of a fix — dwell state, occupancy,
/// animation — is driven through [`ingest_fix`](Self::ingest_fix) and the
/// cooperative [`frame`](Self::frame) tick; the engine never reads a real
/// clock, callers pass `now` in.
///
/// Geofence membership is derived on demand from the latest fixes rather
/// than stored, so it can never drift out of sync with them.
pub struct TrackingEngine<S: StateStore> {
    config: EngineConfig,

    /// Latest accepted fix per device.  `BTreeMap` keeps iteration (and
    /// therefore logs and snapshots) in stable id order.
    fixes: BTreeMap<DeviceId, PositionFix>,

    /// Parsed snapshot of the configured geofences.
    geofences: GeofenceIndex,

    /// Dwell state machine with durable records.
    tracker: StationaryTracker<S>,

    /// Reverse-geocode cache shared by all lookups on this engine.
    addresses: AddressCache,

    /// Marker animation for the focused device.
    animator: PositionAnimator,
}

impl<S: StateStore> TrackingEngine<S> {
    /// Build an engine around `store`, loading any persisted dwell records.
    pub fn new(store: S, config: EngineConfig, now: UnixMs) -> Self {
        let tracker = StationaryTracker::load(store, config.tracker, now);
        info!(restored = tracker.len(), "tracking engine started");
        Self {
            fixes:     BTreeMap::new(),
            geofences: GeofenceIndex::new(),
            addresses: AddressCache::new(config.cache),
            animator:  PositionAnimator::new(config.animator),
            tracker,
            config,
        }
    }

    // ── Fix ingest ────────────────────────────────────────────────────────

    /// Accept one position fix.
    ///
    /// Runs the dwell state machine on the converted ground speed, stores
    /// the fix as the device's latest, and forwards it to the animator
    /// when the device is focused.  Returns the dwell outcome so callers
    /// can badge the device immediately.
    pub fn ingest_fix(&mut self, fix: PositionFix, now: UnixMs) -> MotionUpdate {
        let speed_kmh = knots_to_kmh(fix.speed_knots);
        let update = self
            .tracker
            .update(fix.device_id, fix.position, speed_kmh, fix.fix_time, now);
        debug!(device = %fix.device_id, speed_kmh, state = %update.state, "fix ingested");

        self.animator.push_fix(&fix, now);
        self.fixes.insert(fix.device_id, fix);
        update
    }

    /// Drop a device from the live set.
    ///
    /// Clears its dwell record and, when it was focused, cancels the
    /// animation so no stale frame is emitted.
    pub fn remove_device(&mut self, device: DeviceId) {
        self.fixes.remove(&device);
        self.tracker.clear(device);
        self.animator.device_removed(device);
    }

    /// The latest accepted fix for `device`, if any.
    pub fn latest_fix(&self, device: DeviceId) -> Option<&PositionFix> {
        self.fixes.get(&device)
    }

    /// Devices with at least one accepted fix.
    pub fn device_count(&self) -> usize {
        self.fixes.len()
    }

    // ── Geofences ─────────────────────────────────────────────────────────

    /// Replace the geofence set, re-parsing every area string.
    pub fn set_geofences(&mut self, descriptors: &[GeofenceDescriptor]) {
        self.geofences.rebuild(descriptors);
        info!(count = self.geofences.len(), "geofence index rebuilt");
    }

    pub fn geofences(&self) -> &GeofenceIndex {
        &self.geofences
    }

    /// Per-geofence device sets computed from the latest fixes.
    pub fn membership(&self) -> Membership {
        compute_membership(&self.geofences, self.fixes.values())
    }

    /// Occupants of one geofence; 0 when it is empty or unknown.
    pub fn occupant_count(&self, geofence: GeofenceId) -> usize {
        occupant_counts(&self.membership())
            .get(&geofence)
            .copied()
            .unwrap_or(0)
    }

    // ── Dwell state ───────────────────────────────────────────────────────

    pub fn tracker(&self) -> &StationaryTracker<S> {
        &self.tracker
    }

    // ── Addresses ─────────────────────────────────────────────────────────

    /// Resolve a coordinate to an address through the shared cache.
    pub fn resolve_address(
        &self,
        lat: f64,
        lon: f64,
        force: bool,
        geocoder: &dyn Geocoder,
    ) -> GeocodeResult<Resolution> {
        self.addresses.resolve(lat, lon, force, geocoder)
    }

    /// Seed an address the server already attached to a record.
    pub fn seed_address(&self, lat: f64, lon: f64, address: &str) {
        self.addresses.insert_known(lat, lon, address);
    }

    pub fn addresses(&self) -> &AddressCache {
        &self.addresses
    }

    // ── Animation ─────────────────────────────────────────────────────────

    /// Focus a device for animation.
    ///
    /// Focusing a device without a live fix is allowed; it simply appears
    /// in place once its first fix arrives.
    pub fn set_focus(&mut self, device: Option<DeviceId>) {
        self.animator.set_focus(device);
        let seed = device.and_then(|d| self.fixes.get(&d).cloned());
        if let Some(fix) = seed {
            // Seed from the latest known fix so the marker shows
            // immediately instead of waiting for the next report.
            self.animator.push_fix(&fix, fix.fix_time);
        }
    }

    pub fn focused(&self) -> Option<DeviceId> {
        self.animator.focused()
    }

    /// One cooperative animation tick; the marker value to render, if any.
    pub fn frame(&mut self, now: UnixMs) -> Option<AnimatedPoint> {
        self.animator.frame(now)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
