//! `fleet-engine` — orchestrator for the fleet-rt tracking stack.
//!
//! # Data flow per fix
//!
//! ```text
//! ingest_fix(fix, now):
//!   ① Dwell     — speed (knots → km/h) drives the moving/stopped/parked
//!                 machine; the outcome is returned to the caller.
//!   ② Animation — the fix is forwarded to the animator when its device
//!                 is the focused one.
//!   ③ Latest    — the fix replaces the device's previous latest fix.
//! ```
//!
//! Geofence membership and occupancy are never part of that flow: they are
//! recomputed from the latest fixes on each [`TrackingEngine::membership`]
//! call, so occupancy cannot drift from the fixes that define it.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fleet_engine::{EngineConfig, TrackingEngine};
//! use fleet_motion::FileStore;
//!
//! let store = FileStore::new("/var/lib/fleet-rt")?;
//! let mut engine = TrackingEngine::new(store, EngineConfig::default(), now);
//! engine.set_geofences(&descriptors);
//! let update = engine.ingest_fix(fix, now);
//! ```

pub mod engine;


pub use engine::{EngineConfig, TrackingEngine};
