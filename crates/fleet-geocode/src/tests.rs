//! Unit tests for fleet-geocode.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::cache::{AddressCache, CacheConfig, Resolution};
use crate::error::{GeocodeError, GeocodeResult};
use crate::geocoder::Geocoder;
use crate::key::CoordKey;

// ── Test geocoders ────────────────────────────────────────────────────────────

/// Counts calls and answers with a formatted address.
struct CountingGeocoder {
    calls: AtomicUsize,
}

impl CountingGeocoder {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Geocoder for CountingGeocoder {
    fn reverse(&self, lat: f64, lon: f64) -> GeocodeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("addr {lat:.6} {lon:.6}"))
    }
}

/// Counts calls, sleeps to widen the in-flight window, then answers.
struct SlowGeocoder {
    calls: AtomicUsize,
}

impl Geocoder for SlowGeocoder {
    fn reverse(&self, _lat: f64, _lon: f64) -> GeocodeResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(100));
        Ok("shared".to_string())
    }
}

struct FailingGeocoder;

impl Geocoder for FailingGeocoder {
    fn reverse(&self, _lat: f64, _lon: f64) -> GeocodeResult<String> {
        Err(GeocodeError::Status(503))
    }
}

// ── CoordKey ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod coord_key {
    use super::*;

    #[test]
    fn rounds_to_six_decimals() {
        let a = CoordKey::new(40.12345649, -3.7).unwrap();
        let b = CoordKey::new(40.12345551, -3.7).unwrap();
        assert_eq!(a, b);

        let c = CoordKey::new(40.123457, -3.7).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn non_finite_is_none() {
        assert!(CoordKey::new(f64::NAN, 0.0).is_none());
        assert!(CoordKey::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn display_matches_wire_format() {
        let key = CoordKey::new(40.4168, -3.7038).unwrap();
        assert_eq!(key.to_string(), "40.416800,-3.703800");
    }
}

// ── Cache behavior ────────────────────────────────────────────────────────────

#[cfg(test)]
mod cache {
    use super::*;

    #[test]
    fn exact_hit_skips_network() {
        let cache = AddressCache::default();
        let geocoder = CountingGeocoder::new();

        let first = cache.resolve(40.4168, -3.7038, false, &geocoder).unwrap();
        assert!(matches!(first, Resolution::Fetched(_)));
        assert_eq!(geocoder.calls(), 1);

        let second = cache.resolve(40.4168, -3.7038, false, &geocoder).unwrap();
        assert!(matches!(second, Resolution::Cached(_)));
        assert_eq!(geocoder.calls(), 1);
    }

    #[test]
    fn nearby_entry_answers_within_reuse_radius() {
        let cache = AddressCache::default();
        let geocoder = CountingGeocoder::new();

        cache.resolve(40.4168, -3.7038, false, &geocoder).unwrap();

        // ~11 m north: different key, inside the 25 m reuse radius.
        let nearby = cache.resolve(40.4169, -3.7038, false, &geocoder).unwrap();
        assert!(matches!(nearby, Resolution::Nearby(_)));
        assert_eq!(geocoder.calls(), 1);

        // The write-through makes the new key an exact hit now.
        let again = cache.resolve(40.4169, -3.7038, false, &geocoder).unwrap();
        assert!(matches!(again, Resolution::Cached(_)));
        assert_eq!(geocoder.calls(), 1);
    }

    #[test]
    fn far_entry_does_not_answer() {
        let cache = AddressCache::default();
        let geocoder = CountingGeocoder::new();

        cache.resolve(40.4168, -3.7038, false, &geocoder).unwrap();
        // ~1.1 km north: beyond the reuse radius.
        cache.resolve(40.4268, -3.7038, false, &geocoder).unwrap();
        assert_eq!(geocoder.calls(), 2);
    }

    #[test]
    fn force_bypasses_cache_but_updates_it() {
        let cache = AddressCache::default();
        let geocoder = CountingGeocoder::new();

        cache.resolve(40.4168, -3.7038, false, &geocoder).unwrap();
        let forced = cache.resolve(40.4168, -3.7038, true, &geocoder).unwrap();
        assert!(matches!(forced, Resolution::Fetched(_)));
        assert_eq!(geocoder.calls(), 2);
    }

    #[test]
    fn failure_is_not_cached_and_is_retryable() {
        let cache = AddressCache::default();

        let err = cache.resolve(40.4168, -3.7038, false, &FailingGeocoder).unwrap_err();
        assert_eq!(err, GeocodeError::Status(503));
        assert!(cache.is_empty());

        // The key is immediately eligible again, now against a healthy
        // geocoder.
        let geocoder = CountingGeocoder::new();
        let ok = cache.resolve(40.4168, -3.7038, false, &geocoder).unwrap();
        assert!(matches!(ok, Resolution::Fetched(_)));
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        let cache = AddressCache::default();
        let geocoder = CountingGeocoder::new();
        let err = cache.resolve(f64::NAN, 0.0, false, &geocoder).unwrap_err();
        assert_eq!(err, GeocodeError::InvalidCoordinate);
        assert_eq!(geocoder.calls(), 0);
    }

    #[test]
    fn insert_known_seeds_without_network() {
        let cache = AddressCache::default();
        let geocoder = CountingGeocoder::new();

        cache.insert_known(40.4168, -3.7038, "Plaza Mayor 1");
        let hit = cache.resolve(40.4168, -3.7038, false, &geocoder).unwrap();
        assert_eq!(hit, Resolution::Cached("Plaza Mayor 1".to_string()));
        assert_eq!(geocoder.calls(), 0);

        // Empty seeds are ignored.
        cache.insert_known(41.0, -3.0, "");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn oldest_entry_evicted_at_capacity() {
        let cache = AddressCache::new(CacheConfig { max_entries: 3, ..Default::default() });
        let geocoder = CountingGeocoder::new();

        // Spread points ~1.1 km apart so reuse never kicks in.
        for i in 0..4 {
            let lat = 40.0 + i as f64 * 0.01;
            cache.resolve(lat, -3.7, false, &geocoder).unwrap();
        }
        assert_eq!(cache.len(), 3);
        // The first insertion is gone; resolving it again hits the network.
        assert!(cache.cached(40.0, -3.7).is_none());
        cache.resolve(40.0, -3.7, false, &geocoder).unwrap();
        assert_eq!(geocoder.calls(), 5);
    }

    #[test]
    fn reinsert_refreshes_eviction_order() {
        let cache = AddressCache::new(CacheConfig { max_entries: 2, ..Default::default() });

        cache.insert_known(40.00, -3.7, "a");
        cache.insert_known(40.01, -3.7, "b");
        // Refresh "a" — "b" is now the oldest.
        cache.insert_known(40.00, -3.7, "a2");
        cache.insert_known(40.02, -3.7, "c");

        assert_eq!(cache.cached(40.00, -3.7).as_deref(), Some("a2"));
        assert!(cache.cached(40.01, -3.7).is_none());
        assert_eq!(cache.cached(40.02, -3.7).as_deref(), Some("c"));
    }

    #[test]
    fn concurrent_resolvers_share_one_network_call() {
        let cache = Arc::new(AddressCache::default());
        let geocoder = Arc::new(SlowGeocoder { calls: AtomicUsize::new(0) });

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let geocoder = Arc::clone(&geocoder);
                std::thread::spawn(move || {
                    cache.resolve(40.4168, -3.7038, false, geocoder.as_ref()).unwrap()
                })
            })
            .collect();

        for handle in handles {
            let resolution = handle.join().unwrap();
            // Threads that raced ahead of the insert see Fetched; stragglers
            // that arrived after completion may see Cached.  Either way the
            // address is the shared one.
            assert_eq!(resolution.address(), "shared");
        }
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }
}
