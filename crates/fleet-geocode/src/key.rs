//! Fixed-precision coordinate cache key.

use fleet_core::GeoPoint;

/// A coordinate rounded to 6 decimal degrees (~0.1 m), stored as a
/// microdegree integer pair so it can be hashed and compared exactly.
///
/// Exact key equality governs first-stage cache hits.  This is a
/// deliberately different notion of "same place" than the geodesic
/// reuse-radius search — the two mechanisms stay distinct.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CoordKey {
    micro_lat: i64,
    micro_lon: i64,
}

impl CoordKey {
    /// Round `(lat, lon)` to the key grid.  `None` for non-finite input.
    pub fn new(lat: f64, lon: f64) -> Option<CoordKey> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        Some(CoordKey {
            micro_lat: (lat * 1e6).round() as i64,
            micro_lon: (lon * 1e6).round() as i64,
        })
    }

    /// The key's grid coordinate, for geodesic comparisons against other
    /// cached entries.
    pub fn point(self) -> GeoPoint {
        GeoPoint::new(self.micro_lat as f64 / 1e6, self.micro_lon as f64 / 1e6)
    }
}

impl std::fmt::Display for CoordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.point();
        write!(f, "{:.6},{:.6}", p.lat, p.lon)
    }
}
