//! Geocode error type.
//!
//! Errors are `Clone` because a coalesced in-flight request hands its
//! outcome — success or failure — to every waiter.

use thiserror::Error;

/// Errors produced by address resolution.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GeocodeError {
    /// Latitude or longitude was not a finite number.
    #[error("coordinate is not finite")]
    InvalidCoordinate,

    /// The geocode endpoint answered with a non-2xx status.
    #[error("geocode request failed with status {0}")]
    Status(u16),

    /// Transport-level failure, including the request timeout.
    #[error("geocode transport error: {0}")]
    Transport(String),
}

pub type GeocodeResult<T> = Result<T, GeocodeError>;
