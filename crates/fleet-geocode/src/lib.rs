//! `fleet-geocode` — resolve coordinates to addresses with as few network
//! calls as possible.
//!
//! Three layers stand between a lookup and the wire:
//!
//! 1. **Exact key** — coordinates round to a 6-decimal-degree
//!    [`CoordKey`]; a cache hit on the exact key returns immediately.
//! 2. **Spatial reuse** — failing that, the nearest cached entry within a
//!    small geodesic radius (default 25 m) is adopted for this key too;
//!    vehicles idling near a previously geocoded point never hit the wire.
//! 3. **Request coalescing** — an in-flight table guarantees at most one
//!    outstanding network call per coordinate key; concurrent resolvers
//!    for the same key share the single result.
//!
//! | Module       | Contents                                             |
//! |--------------|------------------------------------------------------|
//! | [`key`]      | `CoordKey` fixed-precision cache key                 |
//! | [`cache`]    | `AddressCache`, bounded insertion-order store        |
//! | [`geocoder`] | `Geocoder` network seam, reqwest impl (`http`)       |
//! | [`error`]    | `GeocodeError`                                       |

pub mod cache;
pub mod error;
pub mod geocoder;
pub mod key;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cache::{AddressCache, CacheConfig, Resolution};
pub use error::{GeocodeError, GeocodeResult};
pub use geocoder::Geocoder;
pub use key::CoordKey;

#[cfg(feature = "http")]
pub use geocoder::HttpGeocoder;
