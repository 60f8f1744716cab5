//! Millisecond Unix timestamps.
//!
//! The engine never reads a wall clock itself — callers pass `now` into
//! every operation that needs it, which keeps trackers and animators
//! deterministic under test.

use std::fmt;

/// Milliseconds since the Unix epoch.
///
/// Signed so that differences (`a - b`) are directly usable; fix times from
/// misbehaving devices can legitimately sit before a stored record.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UnixMs(pub i64);

impl UnixMs {
    pub const ZERO: UnixMs = UnixMs(0);

    /// The timestamp `ms` milliseconds after `self`.
    #[inline]
    pub fn offset(self, ms: i64) -> UnixMs {
        UnixMs(self.0 + ms)
    }

    /// Milliseconds elapsed from `earlier` to `self` (negative if `earlier`
    /// is actually later).
    #[inline]
    pub fn since(self, earlier: UnixMs) -> i64 {
        self.0 - earlier.0
    }
}

impl std::ops::Sub for UnixMs {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: UnixMs) -> i64 {
        self.0 - rhs.0
    }
}

impl std::ops::Add<i64> for UnixMs {
    type Output = UnixMs;
    #[inline]
    fn add(self, rhs: i64) -> UnixMs {
        UnixMs(self.0 + rhs)
    }
}

impl fmt::Display for UnixMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
