//! Animation state machines for the focused device.

use std::collections::VecDeque;

use tracing::debug;

use fleet_core::{DeviceId, PositionFix, UnixMs, knots_to_mps};

use crate::transition::{AnimatedPoint, Transition, Waypoint};

/// Below this ground speed the reported velocity is GPS noise and cannot
/// drive the duration estimate.
const MIN_ANIMATION_SPEED_MPS: f64 = 0.1;

/// Duration selection parameters.
#[derive(Copy, Clone, Debug)]
pub struct AnimatorConfig {
    /// Clamp floor — shorter transitions read as snaps.
    pub min_duration_ms: i64,
    /// Clamp ceiling — sparse fixes must not produce minute-long creeps.
    pub max_duration_ms: i64,
    /// Fallback when neither speed nor a fix-time gap is usable.
    pub default_duration_ms: i64,
    /// Fraction of the fix-time gap used when falling back to it, slightly
    /// under 1 so the animation finishes before the next fix tends to land.
    pub fix_gap_factor: f64,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: 1_800,
            max_duration_ms: 12_000,
            default_duration_ms: 1_100,
            fix_gap_factor: 0.9,
        }
    }
}

impl AnimatorConfig {
    /// Defaults for the lag-buffered variant: a longer fallback suits the
    /// steadier cadence the buffer provides.
    pub fn lagged() -> Self {
        Self { default_duration_ms: 2_400, ..Self::default() }
    }

    /// Pick a transition duration.
    ///
    /// Preference order: physical `distance / speed`, then
    /// `fix_gap_factor ×` the fix-time gap, then the default — always
    /// clamped to the `[min, max]` band.
    pub fn pick_duration_ms(
        &self,
        distance_m: f64,
        speed_mps: f64,
        fix_gap_ms: Option<i64>,
    ) -> i64 {
        let raw = if speed_mps > MIN_ANIMATION_SPEED_MPS && distance_m > 0.0 {
            (distance_m / speed_mps * 1_000.0) as i64
        } else if let Some(gap) = fix_gap_ms.filter(|gap| *gap > 0) {
            (gap as f64 * self.fix_gap_factor) as i64
        } else {
            self.default_duration_ms
        };
        raw.clamp(self.min_duration_ms, self.max_duration_ms)
    }
}

// ── PositionAnimator ──────────────────────────────────────────────────────────

/// Interpolated marker motion for exactly one focused device.
///
/// Cooperative: the host frame loop calls [`frame`](Self::frame) once per
/// display frame with the current time; the animator holds no timers.
/// Changing focus or losing the focused device cancels everything — no
/// partial frame is emitted afterwards.
pub struct PositionAnimator {
    config: AnimatorConfig,
    focused: Option<DeviceId>,
    /// Last raw fix accepted for the focused device.
    last_raw: Option<Waypoint>,
    /// Most recently emitted marker value.
    current: Option<AnimatedPoint>,
    transition: Option<Transition>,
}

impl PositionAnimator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self { config, focused: None, last_raw: None, current: None, transition: None }
    }

    pub fn focused(&self) -> Option<DeviceId> {
        self.focused
    }

    /// Change (or clear) the focused device.  Any in-progress transition
    /// and all animation state are dropped on a change.
    pub fn set_focus(&mut self, device: Option<DeviceId>) {
        if self.focused != device {
            self.focused = device;
            self.reset();
        }
    }

    /// The focused device disappeared from the live set.
    pub fn device_removed(&mut self, device: DeviceId) {
        if self.focused == Some(device) {
            self.focused = None;
            self.reset();
        }
    }

    /// Feed one fix.  Ignored unless it belongs to the focused device.
    ///
    /// A coordinate change starts a transition from the current
    /// interpolated position (or the previous raw position when idle)
    /// toward the new fix, so motion stays continuous even when fixes
    /// arrive faster than transitions complete.
    pub fn push_fix(&mut self, fix: &PositionFix, now: UnixMs) {
        if self.focused != Some(fix.device_id) {
            return;
        }
        let to = Waypoint::from_fix(fix);

        let Some(prev) = self.last_raw else {
            // First fix after focus: appear in place, nothing to animate.
            self.current = Some(AnimatedPoint::at(&to));
            self.last_raw = Some(to);
            return;
        };

        if prev.position == to.position {
            // Same coordinate — refresh the raw fix, keep any transition.
            self.last_raw = Some(to);
            return;
        }

        let origin = match &self.transition {
            Some(t) => t.sample(now),
            None => self.current.unwrap_or(AnimatedPoint::at(&prev)),
        };
        let from = Waypoint {
            position: origin.position,
            course_deg: origin.course_deg,
            speed_knots: prev.speed_knots,
            fix_time: prev.fix_time,
        };

        let distance_m = from.position.distance_m(to.position);
        let duration_ms = self.config.pick_duration_ms(
            distance_m,
            knots_to_mps(to.speed_knots),
            Some(to.fix_time - prev.fix_time),
        );
        debug!(device = %fix.device_id, distance_m, duration_ms, "animation transition");

        self.transition = Some(Transition::new(from, to, now, duration_ms));
        self.last_raw = Some(to);
    }

    /// One cooperative animation tick.  Returns the marker value to render
    /// this frame, or `None` when there is nothing to show.
    pub fn frame(&mut self, now: UnixMs) -> Option<AnimatedPoint> {
        if let Some(t) = &self.transition {
            let point = t.sample(now);
            if t.finished(now) {
                self.transition = None;
            }
            self.current = Some(point);
        }
        self.current
    }

    pub fn in_transition(&self) -> bool {
        self.transition.is_some()
    }

    fn reset(&mut self) {
        self.last_raw = None;
        self.current = None;
        self.transition = None;
    }
}

impl Default for PositionAnimator {
    fn default() -> Self {
        Self::new(AnimatorConfig::default())
    }
}

// ── LaggedAnimator ────────────────────────────────────────────────────────────

/// Lag-buffered variant: holds at least two unconsumed fixes before
/// starting a transition, so the gap between the consumed fix and the one
/// behind it can pick a more accurate duration than "now minus last fix
/// time" would.
/// The price is one fix of constant display latency; the payoff is
/// smoother, less bursty trail motion.
pub struct LaggedAnimator {
    config: AnimatorConfig,
    focused: Option<DeviceId>,
    queue: VecDeque<Waypoint>,
    current: Option<AnimatedPoint>,
    transition: Option<Transition>,
}

impl LaggedAnimator {
    pub fn new(config: AnimatorConfig) -> Self {
        Self { config, focused: None, queue: VecDeque::new(), current: None, transition: None }
    }

    pub fn set_focus(&mut self, device: Option<DeviceId>) {
        if self.focused != device {
            self.focused = device;
            self.queue.clear();
            self.current = None;
            self.transition = None;
        }
    }

    /// Queue one fix for later consumption.  Consecutive fixes at the same
    /// coordinate collapse so a parked device does not grow the buffer.
    pub fn push_fix(&mut self, fix: &PositionFix) {
        if self.focused != Some(fix.device_id) {
            return;
        }
        let waypoint = Waypoint::from_fix(fix);
        if self.queue.back().is_some_and(|last| last.position == waypoint.position) {
            return;
        }
        self.queue.push_back(waypoint);
    }

    /// One cooperative tick; same contract as [`PositionAnimator::frame`].
    pub fn frame(&mut self, now: UnixMs) -> Option<AnimatedPoint> {
        if let Some(t) = &self.transition {
            let point = t.sample(now);
            if t.finished(now) {
                self.transition = None;
            }
            self.current = Some(point);
        }

        // Start the next transition only while at least two fixes wait.
        while self.transition.is_none() && self.queue.len() >= 2 {
            // Gap between the target and the fix after it, read before the
            // pop; this is the real-world interval the marker should take.
            let lookahead_gap = Some(self.queue[1].fix_time - self.queue[0].fix_time);
            let Some(target) = self.queue.pop_front() else {
                break;
            };

            match self.current {
                None => {
                    // First consumed fix: appear in place.
                    self.current = Some(AnimatedPoint::at(&target));
                }
                Some(current) => {
                    let distance_m = current.position.distance_m(target.position);
                    let duration_ms = self.config.pick_duration_ms(
                        distance_m,
                        knots_to_mps(target.speed_knots),
                        lookahead_gap,
                    );
                    let from = Waypoint {
                        position: current.position,
                        course_deg: current.course_deg,
                        speed_knots: target.speed_knots,
                        fix_time: target.fix_time,
                    };
                    self.transition = Some(Transition::new(from, target, now, duration_ms));
                }
            }
        }

        self.current
    }

    /// Fixes waiting to be consumed.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }
}

impl Default for LaggedAnimator {
    fn default() -> Self {
        Self::new(AnimatorConfig::lagged())
    }
}
