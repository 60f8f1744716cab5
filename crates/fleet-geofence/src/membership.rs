//! Geofence occupancy: which devices are inside which geofence.
//!
//! Membership is derived, never stored — each evaluation cycle recomputes
//! it from the latest fix per device.  For every geofence the device set is
//! the **union** of two signals:
//!
//! 1. geofence ids the server already attached to the fix (evaluated
//!    server-side, on a coarser cadence), and
//! 2. geometric containment of the fix coordinate against the locally
//!    parsed area.
//!
//! The server signal can lag; local parsing can miss edge cases
//! (antimeridian, self-intersecting rings).  Combining both trades possible
//! false positives near boundaries for fewer false negatives in occupancy
//! counts.

use rustc_hash::{FxHashMap, FxHashSet};

use fleet_core::{DeviceId, GeofenceId, PositionFix};

use crate::Geometry;

/// Read-only snapshot of a server geofence definition.
#[derive(Clone, Debug)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GeofenceDescriptor {
    pub id: GeofenceId,
    pub name: String,
    /// Raw area encoding; see [`Geometry::parse`].
    pub area: String,
    /// Display color from the attribute map, if set.
    #[serde(default)]
    pub color: Option<String>,
    /// The "hide" attribute flag — render filtering only, occupancy still
    /// counts hidden geofences.
    #[serde(default)]
    pub hidden: bool,
}

/// One parsed geofence held by the index.
#[derive(Clone, Debug)]
pub struct ParsedGeofence {
    pub name: String,
    /// `None` when the area string failed to parse; contains nothing.
    pub geometry: Option<Geometry>,
    pub color: Option<String>,
    pub hidden: bool,
}

/// Per-geofence device sets for one evaluation cycle.
pub type Membership = FxHashMap<GeofenceId, FxHashSet<DeviceId>>;

/// Parsed snapshot of the current geofence definition set.
///
/// Rebuilt wholesale whenever the source definitions change; parsing
/// happens once per change, not once per fix.
#[derive(Default)]
pub struct GeofenceIndex {
    entries: FxHashMap<GeofenceId, ParsedGeofence>,
}

impl GeofenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-parse the full descriptor set.
    pub fn rebuild(&mut self, descriptors: &[GeofenceDescriptor]) {
        self.entries = descriptors
            .iter()
            .map(|d| {
                let parsed = ParsedGeofence {
                    name: d.name.clone(),
                    geometry: Geometry::parse(&d.area),
                    color: d.color.clone(),
                    hidden: d.hidden,
                };
                (d.id, parsed)
            })
            .collect();
    }

    pub fn get(&self, id: GeofenceId) -> Option<&ParsedGeofence> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (GeofenceId, &ParsedGeofence)> {
        self.entries.iter().map(|(id, parsed)| (*id, parsed))
    }

    /// Geofences not flagged hidden, for the render layer.
    pub fn visible(&self) -> impl Iterator<Item = (GeofenceId, &ParsedGeofence)> {
        self.iter().filter(|(_, parsed)| !parsed.hidden)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compute per-geofence device sets for one evaluation cycle.
///
/// Every geofence in the index gets an entry (possibly empty, so occupancy
/// reads report 0 rather than "unknown").  Server-reported ids that do not
/// match any indexed geofence are ignored.
pub fn compute_membership<'a, I>(index: &GeofenceIndex, positions: I) -> Membership
where
    I: IntoIterator<Item = &'a PositionFix>,
    I::IntoIter: Clone,
{
    let fixes = positions.into_iter();
    let mut membership = Membership::default();

    for (id, parsed) in index.iter() {
        let mut devices = FxHashSet::default();
        for fix in fixes.clone() {
            let reported = fix.geofence_ids.contains(&id);
            let geometric = parsed
                .geometry
                .as_ref()
                .is_some_and(|g| g.contains(fix.position));
            if reported || geometric {
                devices.insert(fix.device_id);
            }
        }
        membership.insert(id, devices);
    }

    membership
}

/// Collapse a membership map to per-geofence occupant counts.
pub fn occupant_counts(membership: &Membership) -> FxHashMap<GeofenceId, usize> {
    membership
        .iter()
        .map(|(id, devices)| (*id, devices.len()))
        .collect()
}
