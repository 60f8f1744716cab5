//! Speed unit conversions.
//!
//! Device fixes report speed in knots (the tracking protocol convention);
//! the motion tracker thinks in km/h and the animator in m/s.

/// One knot in km/h.
pub const KNOT_KMH: f64 = 1.852;

/// Convert knots to km/h.  Negative or non-finite input clamps to 0.
#[inline]
pub fn knots_to_kmh(knots: f64) -> f64 {
    if knots.is_finite() { (knots * KNOT_KMH).max(0.0) } else { 0.0 }
}

/// Convert knots to metres per second.  Negative or non-finite input clamps
/// to 0.
#[inline]
pub fn knots_to_mps(knots: f64) -> f64 {
    knots_to_kmh(knots) / 3.6
}
