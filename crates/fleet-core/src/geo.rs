//! Geographic coordinate type and geodesic utilities.
//!
//! `GeoPoint` uses `f64` latitude/longitude: geocode cache keys are rounded
//! to 6 decimal degrees (~0.1 m) and single precision cannot represent that
//! resolution at city longitudes.
//!
//! All functions here are total for finite-degree inputs and NaN-free.
//! Non-finite input to [`GeoPoint::distance_m`] yields `+infinity` rather
//! than an error: callers feed the result into threshold comparisons
//! (`distance <= radius`), where infinity reads as "never matches".

/// Mean Earth radius in metres (spherical model).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 geographic coordinate in decimal degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `true` when both components are finite degrees.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Haversine great-circle distance in metres.
    ///
    /// Any non-finite input yields `f64::INFINITY` so the result can be used
    /// directly in radius comparisons without a validity pre-check.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        if !self.is_finite() || !other.is_finite() {
            return f64::INFINITY;
        }

        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Forward geodesic projection: the point `distance_m` metres from
    /// `self` along the initial bearing `bearing_deg` (degrees clockwise
    /// from north).
    ///
    /// Used to place a draggable radius handle on a circular geofence.
    pub fn destination_point(self, distance_m: f64, bearing_deg: f64) -> GeoPoint {
        let angular = distance_m / EARTH_RADIUS_M;
        let bearing = bearing_deg.to_radians();

        let lat1 = self.lat.to_radians();
        let lon1 = self.lon.to_radians();

        let lat2 = (lat1.sin() * angular.cos()
            + lat1.cos() * angular.sin() * bearing.cos())
        .asin();
        let lon2 = lon1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        GeoPoint::new(lat2.to_degrees(), lon2.to_degrees())
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Shortest-path angular interpolation between two headings in degrees.
///
/// The result is normalized to `[0, 360)`.  Wraparound takes the short way:
/// `interpolate_angle(350.0, 10.0, 0.5)` is `0.0`, not `180.0`.
pub fn interpolate_angle(from: f64, to: f64, t: f64) -> f64 {
    let from = from.rem_euclid(360.0);
    let to = to.rem_euclid(360.0);

    let mut delta = to - from;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }

    (from + delta * t).rem_euclid(360.0)
}
