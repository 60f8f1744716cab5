//! Strongly typed identifier wrappers.
//!
//! Device and geofence ids are assigned by the tracking server, so unlike an
//! array index they carry no ordering meaning — the wrappers exist purely to
//! keep the two id spaces from being mixed up in map keys and signatures.

use std::fmt;

/// Generate a typed ID wrapper around a server-assigned integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub u64);

        impl From<u64> for $name {
            #[inline]
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            #[inline]
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Server-assigned identifier of a tracked device.
    pub struct DeviceId;
}

typed_id! {
    /// Server-assigned identifier of a geofence.
    pub struct GeofenceId;
}
