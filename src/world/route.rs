//! Route provider interface and its cache
//!
//! Routes are polylines between places, conditioned on the weather. The
//! cache keeps one entry per (query, weather quadrant); a `None` entry means
//! the provider was asked and found nothing, so failed lookups are not
//! recomputed.

use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use ahash::AHashMap;

use crate::core::types::{BankId, PlaceId, Point};
use crate::world::weather::WeatherCondition;

/// Sequence of 3D points from origin to destination
pub type Polyline = Vec<Point>;

/// Total length of a polyline
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Weather-conditioned shortest-path queries
pub trait RouteProvider: Send + Sync {
    /// Shortest route between two places
    fn route(&self, from: PlaceId, to: PlaceId, weather: WeatherCondition) -> Option<Arc<Polyline>>;

    /// Route from a place to the nearest door of a transport bank
    ///
    /// With `reverse` the polyline runs from that door to the place instead.
    fn route_to_nearest_transport(
        &self,
        place: PlaceId,
        bank: BankId,
        weather: WeatherCondition,
        reverse: bool,
    ) -> Option<Arc<Polyline>>;

    fn path_length(&self, polyline: &Polyline) -> f64 {
        polyline_length(polyline)
    }

    /// Places of the given classes reachable on foot from `home` in fair
    /// weather, in ascending id order
    fn places_reachable_on_foot(&self, home: PlaceId, classes: &[String]) -> BTreeMap<PlaceId, Arc<Polyline>>;

    /// All vertical transport banks
    fn transport_banks(&self) -> Vec<BankId>;
}

type Cache<K> = RwLock<AHashMap<K, Option<Arc<Polyline>>>>;

/// Caching wrapper around any route provider
///
/// Safe to share across scheduling threads. Each entry is written at most
/// once; concurrent misses may both compute but only the first result is
/// stored and returned.
pub struct CachedRoutes<P> {
    inner: P,
    routes: Cache<(PlaceId, PlaceId, u8)>,
    transport: Cache<(PlaceId, BankId, u8, bool)>,
    reachable: RwLock<AHashMap<(PlaceId, Vec<String>), BTreeMap<PlaceId, Arc<Polyline>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<P: RouteProvider> CachedRoutes<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            routes: RwLock::new(AHashMap::new()),
            transport: RwLock::new(AHashMap::new()),
            reachable: RwLock::new(AHashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits.load(Ordering::Relaxed), self.misses.load(Ordering::Relaxed))
    }

    fn cached<K, F>(&self, cache: &Cache<K>, key: K, compute: F) -> Option<Arc<Polyline>>
    where
        K: Eq + Hash,
        F: FnOnce() -> Option<Arc<Polyline>>,
    {
        {
            let guard = cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(entry) = guard.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return entry.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute();
        let mut guard = cache.write().unwrap_or_else(PoisonError::into_inner);
        guard.entry(key).or_insert(value).clone()
    }
}

impl<P: RouteProvider> RouteProvider for CachedRoutes<P> {
    fn route(&self, from: PlaceId, to: PlaceId, weather: WeatherCondition) -> Option<Arc<Polyline>> {
        self.cached(&self.routes, (from, to, weather.quadrant()), || {
            self.inner.route(from, to, weather)
        })
    }

    fn route_to_nearest_transport(
        &self,
        place: PlaceId,
        bank: BankId,
        weather: WeatherCondition,
        reverse: bool,
    ) -> Option<Arc<Polyline>> {
        self.cached(&self.transport, (place, bank, weather.quadrant(), reverse), || {
            self.inner.route_to_nearest_transport(place, bank, weather, reverse)
        })
    }

    fn path_length(&self, polyline: &Polyline) -> f64 {
        self.inner.path_length(polyline)
    }

    fn places_reachable_on_foot(&self, home: PlaceId, classes: &[String]) -> BTreeMap<PlaceId, Arc<Polyline>> {
        let key = (home, classes.to_vec());
        {
            let guard = self.reachable.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = guard.get(&key) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return found.clone();
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = self.inner.places_reachable_on_foot(home, classes);
        let mut guard = self.reachable.write().unwrap_or_else(PoisonError::into_inner);
        guard.entry(key).or_insert(value).clone()
    }

    fn transport_banks(&self) -> Vec<BankId> {
        self.inner.transport_banks()
    }
}
