//! `fleet-motion` — moving/stopped/parked state per device.
//!
//! A device with any reported speed is `moving`.  A device at speed zero
//! enters a **dwell period**: it is `stopped` until it has sat within a
//! small radius for long enough, then `parked`.  GPS jitter must not reset
//! the dwell clock, so the tracker keeps the dwell start (`stopped_since`)
//! as long as successive fixes stay within the reuse radius — that
//! hysteresis is the whole point of this crate.
//!
//! | Module    | Contents                                               |
//! |-----------|--------------------------------------------------------|
//! | [`tracker`] | `StationaryTracker`, `MotionState`, `MotionRecord`   |
//! | [`store`]   | `StateStore` persistence seam, file/memory backends  |
//!
//! Record state is persisted through a [`StateStore`] on every update and
//! reloaded at startup; persistence failures are logged and swallowed so
//! the tracker always keeps working in memory.

pub mod store;
pub mod tracker;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use store::{FileStore, MemoryStore, StateStore, StoreError, StoreResult};
pub use tracker::{MotionRecord, MotionState, MotionUpdate, StationaryTracker, TrackerConfig};
