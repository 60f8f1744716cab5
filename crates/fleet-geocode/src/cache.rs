//! The bounded, coalescing address cache.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use tracing::debug;

use fleet_core::GeoPoint;

use crate::error::{GeocodeError, GeocodeResult};
use crate::geocoder::Geocoder;
use crate::key::CoordKey;

/// Cache limits.
#[derive(Copy, Clone, Debug)]
pub struct CacheConfig {
    /// Maximum stored entries; the oldest insertion is evicted beyond this.
    pub max_entries: usize,
    /// Geodesic radius within which an existing entry answers for a new
    /// key without a network call.
    pub reuse_radius_m: f64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 500, reuse_radius_m: 25.0 }
    }
}

/// How a resolution was satisfied.  A failed resolution is the `Err`
/// branch of [`AddressCache::resolve`], never a variant here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Exact-key cache hit.
    Cached(String),
    /// Adopted from a cached entry within the reuse radius.
    Nearby(String),
    /// Came back from the network.
    Fetched(String),
}

impl Resolution {
    pub fn address(&self) -> &str {
        match self {
            Resolution::Cached(a) | Resolution::Nearby(a) | Resolution::Fetched(a) => a,
        }
    }

    pub fn into_address(self) -> String {
        match self {
            Resolution::Cached(a) | Resolution::Nearby(a) | Resolution::Fetched(a) => a,
        }
    }
}

// ── Spatial index entry ───────────────────────────────────────────────────────

/// R-tree entry: the key's grid coordinate as a `[lat, lon]` point.
#[derive(Clone, PartialEq)]
struct CachedPoint {
    key: CoordKey,
    point: [f64; 2],
}

impl CachedPoint {
    fn new(key: CoordKey) -> Self {
        let p = key.point();
        Self { key, point: [p.lat, p.lon] }
    }

    fn grid_point(&self) -> GeoPoint {
        GeoPoint::new(self.point[0], self.point[1])
    }
}

impl RTreeObject for CachedPoint {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CachedPoint {
    /// Squared distance in degree space; only a prefilter, the exact
    /// haversine comparison decides reuse.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── Internal state ────────────────────────────────────────────────────────────

/// A coalesced network request: the first resolver for a key owns the call,
/// later resolvers block on `ready` and share the outcome.
struct InFlight {
    outcome: Mutex<Option<GeocodeResult<String>>>,
    ready: Condvar,
}

impl InFlight {
    fn new() -> Self {
        Self { outcome: Mutex::new(None), ready: Condvar::new() }
    }

    fn wait(&self) -> GeocodeResult<String> {
        let mut guard = recover(self.outcome.lock());
        loop {
            match guard.as_ref() {
                Some(outcome) => return outcome.clone(),
                None => guard = recover(self.ready.wait(guard)),
            }
        }
    }

    fn publish(&self, outcome: GeocodeResult<String>) {
        *recover(self.outcome.lock()) = Some(outcome);
        self.ready.notify_all();
    }
}

struct CacheState {
    /// Resolved addresses by exact key.
    entries: HashMap<CoordKey, String>,
    /// Insertion order for eviction; re-inserting a key refreshes it.
    order: VecDeque<CoordKey>,
    /// Spatial index over `entries` keys for the reuse-radius search.
    tree: RTree<CachedPoint>,
    /// At most one outstanding network call per key.
    in_flight: HashMap<CoordKey, Arc<InFlight>>,
}

/// Recover a mutex guard even if another resolver panicked mid-hold; the
/// cache state is always internally consistent between operations.
fn recover<'a, T>(r: Result<MutexGuard<'a, T>, std::sync::PoisonError<MutexGuard<'a, T>>>) -> MutexGuard<'a, T> {
    r.unwrap_or_else(std::sync::PoisonError::into_inner)
}

// ── AddressCache ──────────────────────────────────────────────────────────────

/// Deduplicated, spatially-aware reverse-geocode cache.
///
/// Owned and injectable — no global state.  Interior locking lets one
/// instance serve concurrent resolvers; the geocoder call itself happens
/// outside the lock, so cache reads never wait on the network.
pub struct AddressCache {
    config: CacheConfig,
    state: Mutex<CacheState>,
}

impl AddressCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                order: VecDeque::new(),
                tree: RTree::new(),
                in_flight: HashMap::new(),
            }),
        }
    }

    /// Resolve `(lat, lon)` to an address.
    ///
    /// With `force` unset, an exact-key hit or a cached entry within the
    /// reuse radius answers without touching the network.  Otherwise at
    /// most one network call per key is issued system-wide; concurrent
    /// callers for the same key share its outcome.  Failures are never
    /// cached — a failed key is immediately eligible for retry.
    pub fn resolve(
        &self,
        lat: f64,
        lon: f64,
        force: bool,
        geocoder: &dyn Geocoder,
    ) -> GeocodeResult<Resolution> {
        let key = CoordKey::new(lat, lon).ok_or(GeocodeError::InvalidCoordinate)?;

        let flight = {
            let mut state = recover(self.state.lock());

            if !force {
                if let Some(address) = state.entries.get(&key) {
                    return Ok(Resolution::Cached(address.clone()));
                }
                if let Some(address) = nearest_within(&state, key.point(), self.config.reuse_radius_m)
                {
                    // Write-through: the nearby answer becomes this key's
                    // entry too, so the next lookup is an exact hit.
                    insert_bounded(&mut state, key, address.clone(), self.config.max_entries);
                    debug!(%key, "geocode reuse from nearby entry");
                    return Ok(Resolution::Nearby(address));
                }
            }

            match state.in_flight.get(&key) {
                Some(existing) => Err(Arc::clone(existing)),
                None => {
                    let flight = Arc::new(InFlight::new());
                    state.in_flight.insert(key, Arc::clone(&flight));
                    Ok(flight)
                }
            }
        };

        match flight {
            // Another resolver owns the call for this key; share its result.
            Err(flight) => flight.wait().map(Resolution::Fetched),
            Ok(flight) => {
                debug!(%key, force, "geocode network request");
                let outcome = geocoder.reverse(lat, lon);

                let mut state = recover(self.state.lock());
                state.in_flight.remove(&key);
                if let Ok(address) = &outcome {
                    insert_bounded(&mut state, key, address.clone(), self.config.max_entries);
                }
                drop(state);

                flight.publish(outcome.clone());
                outcome.map(Resolution::Fetched)
            }
        }
    }

    /// Seed an address the server already attached to a record, skipping
    /// the network entirely.  Empty addresses are ignored.
    pub fn insert_known(&self, lat: f64, lon: f64, address: &str) {
        if address.is_empty() {
            return;
        }
        let Some(key) = CoordKey::new(lat, lon) else {
            return;
        };
        let mut state = recover(self.state.lock());
        insert_bounded(&mut state, key, address.to_string(), self.config.max_entries);
    }

    /// The exact-key entry, if cached.
    pub fn cached(&self, lat: f64, lon: f64) -> Option<String> {
        let key = CoordKey::new(lat, lon)?;
        recover(self.state.lock()).entries.get(&key).cloned()
    }

    pub fn len(&self) -> usize {
        recover(self.state.lock()).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AddressCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

// ── State helpers ─────────────────────────────────────────────────────────────

/// Nearest cached entry within `radius_m` of `point`, by exact haversine.
fn nearest_within(state: &CacheState, point: GeoPoint, radius_m: f64) -> Option<String> {
    // Degree-space prefilter wide enough for longitude shrink up to ~77°
    // latitude; the haversine comparison below is what decides.
    let max_deg = radius_m / 25_000.0;

    let mut best: Option<(f64, CoordKey)> = None;
    for candidate in state
        .tree
        .locate_within_distance([point.lat, point.lon], max_deg * max_deg)
    {
        let d = point.distance_m(candidate.grid_point());
        if d <= radius_m && best.is_none_or(|(bd, _)| d < bd) {
            best = Some((d, candidate.key));
        }
    }

    best.and_then(|(_, key)| state.entries.get(&key).cloned())
}

/// Insert keeping `entries`, `order`, and `tree` in lockstep; evict the
/// oldest insertion beyond `max_entries`.
fn insert_bounded(state: &mut CacheState, key: CoordKey, address: String, max_entries: usize) {
    if state.entries.insert(key, address).is_some() {
        // Refresh the key's position in the eviction order.
        state.order.retain(|k| *k != key);
    } else {
        state.tree.insert(CachedPoint::new(key));
    }
    state.order.push_back(key);

    while state.entries.len() > max_entries {
        let Some(oldest) = state.order.pop_front() else {
            break;
        };
        state.entries.remove(&oldest);
        let p = oldest.point();
        state.tree.remove_at_point(&[p.lat, p.lon]);
    }
}
