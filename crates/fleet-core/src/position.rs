//! The raw device position sample.

use std::collections::HashMap;

use crate::{DeviceId, GeoPoint, GeofenceId, UnixMs};

/// A single reported device fix.
///
/// Immutable once received; the next fix for the same device supersedes it.
/// Fixes for a given device are assumed to arrive in non-decreasing
/// `fix_time` order — the engine does not reorder them.
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct PositionFix {
    pub device_id: DeviceId,
    pub position: GeoPoint,
    /// Speed over ground in knots, as reported by the device.
    pub speed_knots: f64,
    /// Course over ground in degrees, `[0, 360)`.
    pub course_deg: f64,
    pub fix_time: UnixMs,
    /// Geofence ids the server already attached to this fix.  May lag the
    /// geometric truth; the membership engine unions both signals.
    #[serde(default)]
    pub geofence_ids: Vec<GeofenceId>,
    /// Open protocol attribute map (odometer, battery, ignition, …).
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl PositionFix {
    /// A bare fix with no server geofence ids or attributes.
    pub fn new(
        device_id: DeviceId,
        position: GeoPoint,
        speed_knots: f64,
        course_deg: f64,
        fix_time: UnixMs,
    ) -> Self {
        Self {
            device_id,
            position,
            speed_knots,
            course_deg,
            fix_time,
            geofence_ids: Vec::new(),
            attributes: HashMap::new(),
        }
    }
}
