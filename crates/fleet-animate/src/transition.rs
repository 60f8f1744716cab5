//! One animated transition between two fixes.

use fleet_core::{GeoPoint, PositionFix, UnixMs, interpolate_angle};

/// A fix reduced to what animation needs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub position: GeoPoint,
    pub course_deg: f64,
    pub speed_knots: f64,
    pub fix_time: UnixMs,
}

impl Waypoint {
    pub fn from_fix(fix: &PositionFix) -> Self {
        Self {
            position: fix.position,
            course_deg: fix.course_deg,
            speed_knots: fix.speed_knots,
            fix_time: fix.fix_time,
        }
    }
}

/// The interpolated marker value emitted once per frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AnimatedPoint {
    pub position: GeoPoint,
    pub course_deg: f64,
}

impl AnimatedPoint {
    pub fn at(waypoint: &Waypoint) -> Self {
        Self { position: waypoint.position, course_deg: waypoint.course_deg }
    }
}

/// Symmetric quadratic ease-in-out: slow start, slow finish.
///
/// Input is clamped to `[0, 1]`; `ease_in_out(0.5) == 0.5`.
pub fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// An in-progress interpolation from one waypoint to the next.
///
/// Exists only while the focused device is mid-transition; replaced when a
/// newer fix arrives, discarded on cancellation.
#[derive(Copy, Clone, Debug)]
pub struct Transition {
    pub from: Waypoint,
    pub to: Waypoint,
    pub started_at: UnixMs,
    pub duration_ms: i64,
}

impl Transition {
    pub fn new(from: Waypoint, to: Waypoint, started_at: UnixMs, duration_ms: i64) -> Self {
        Self { from, to, started_at, duration_ms }
    }

    /// Raw (un-eased) progress in `[0, 1]`.  Zero or negative duration is
    /// complete immediately.
    pub fn progress(&self, now: UnixMs) -> f64 {
        if self.duration_ms <= 0 {
            return 1.0;
        }
        (now.since(self.started_at) as f64 / self.duration_ms as f64).clamp(0.0, 1.0)
    }

    pub fn finished(&self, now: UnixMs) -> bool {
        self.progress(now) >= 1.0
    }

    /// The eased marker value at `now`.  At completion the value snaps
    /// exactly to the target, not to a float-rounded neighbour.
    pub fn sample(&self, now: UnixMs) -> AnimatedPoint {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return AnimatedPoint::at(&self.to);
        }

        // Linear degree interpolation is fine at city/regional scales; the
        // heading takes the shortest angular path.
        let t = ease_in_out(progress);
        let lat = self.from.position.lat + (self.to.position.lat - self.from.position.lat) * t;
        let lon = self.from.position.lon + (self.to.position.lon - self.from.position.lon) * t;
        let course = interpolate_angle(self.from.course_deg, self.to.course_deg, t);

        AnimatedPoint { position: GeoPoint::new(lat, lon), course_deg: course }
    }
}
