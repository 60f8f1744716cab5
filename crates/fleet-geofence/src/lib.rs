//! `fleet-geofence` — geofence geometry and occupancy for the `fleet-rt`
//! tracking engine.
//!
//! | Module         | Contents                                            |
//! |----------------|-----------------------------------------------------|
//! | [`geometry`]   | Area-string parsing (`CIRCLE`, WKT polygon /        |
//! |                | multipolygon) and point containment                 |
//! | [`membership`] | `GeofenceIndex` and per-cycle occupancy computation |
//!
//! Malformed geometry never errors: it parses to `None` and contains
//! nothing, so occupancy math stays total.

pub mod geometry;
pub mod membership;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geometry::{Geometry, Ring};
pub use membership::{
    GeofenceDescriptor, GeofenceIndex, Membership, ParsedGeofence, compute_membership,
    occupant_counts,
};
