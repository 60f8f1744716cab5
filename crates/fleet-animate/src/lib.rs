//! `fleet-animate` — smooth marker motion for the focused device.
//!
//! Raw fixes arrive seconds apart; rendering them directly makes markers
//! jump.  The animators here interpolate position and heading between
//! successive fixes so consumers can render continuous motion, driven by a
//! cooperative frame loop: the host calls [`PositionAnimator::frame`] once
//! per display frame with the current time, and the animator never touches
//! a real clock or timer itself — which is also what makes it testable.
//!
//! | Module        | Contents                                            |
//! |---------------|-----------------------------------------------------|
//! | [`transition`] | `Waypoint`, `Transition`, easing                   |
//! | [`animator`]   | duration selection, `PositionAnimator` (immediate) |
//! |                | and `LaggedAnimator` (lag buffer, smoother trails) |

pub mod animator;
pub mod transition;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use animator::{AnimatorConfig, LaggedAnimator, PositionAnimator};
pub use transition::{AnimatedPoint, Transition, Waypoint, ease_in_out};
