//! `fleet-core` — foundational types for the `fleet-rt` tracking engine.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It
//! intentionally has no `fleet-*` dependencies and minimal external ones
//! (only `serde`/`serde_json`).
//!
//! # What lives here
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`ids`]      | `DeviceId`, `GeofenceId`                             |
//! | [`geo`]      | `GeoPoint`, haversine distance, forward projection,  |
//! |              | shortest-path angle interpolation                    |
//! | [`time`]     | `UnixMs` millisecond timestamps                      |
//! | [`units`]    | knots → km/h and m/s conversions                     |
//! | [`position`] | `PositionFix`, the raw device sample                 |

pub mod geo;
pub mod ids;
pub mod position;
pub mod time;
pub mod units;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::{GeoPoint, interpolate_angle};
pub use ids::{DeviceId, GeofenceId};
pub use position::PositionFix;
pub use time::UnixMs;
pub use units::{knots_to_kmh, knots_to_mps};
