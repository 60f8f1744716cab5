//! The reverse-geocoding network seam.

use crate::error::GeocodeResult;

/// Pluggable reverse geocoder.
///
/// The cache calls the network through this trait so hosts can swap in
/// their own transport and tests can count calls.  Implementations must be
/// `Send + Sync`: a single cache instance serves concurrent resolvers.
pub trait Geocoder: Send + Sync {
    /// Resolve a coordinate to a plain-text address.
    ///
    /// A non-2xx response is a failure, never an empty-string success.
    fn reverse(&self, lat: f64, lon: f64) -> GeocodeResult<String>;
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn reverse(&self, lat: f64, lon: f64) -> GeocodeResult<String> {
        (**self).reverse(lat, lon)
    }
}

// ── HTTP implementation ───────────────────────────────────────────────────────

/// Blocking HTTP geocoder against a Traccar-style endpoint:
/// `GET {base_url}?latitude=<lat>&longitude=<lon>` returning the address as
/// the plain-text body.
#[cfg(feature = "http")]
pub struct HttpGeocoder {
    client: reqwest::blocking::Client,
    base_url: String,
}

#[cfg(feature = "http")]
impl HttpGeocoder {
    /// Default request timeout; a hung geocoder must not wedge resolvers.
    pub const TIMEOUT: std::time::Duration = std::time::Duration::from_secs(8);

    pub fn new(base_url: impl Into<String>) -> GeocodeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        Ok(Self { client, base_url: base_url.into() })
    }
}

#[cfg(feature = "http")]
impl Geocoder for HttpGeocoder {
    fn reverse(&self, lat: f64, lon: f64) -> GeocodeResult<String> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("latitude", lat), ("longitude", lon)])
            .send()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| GeocodeError::Transport(e.to_string()))
    }
}
