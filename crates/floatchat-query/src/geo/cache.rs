//! Read-through cache for geocode lookups
//!
//! Entries are never evicted or expired. Only definite answers are stored
//! (a point or a "no such place"); timeouts and service errors are not.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use super::GeoPoint;

/// A definite geocoder answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CachedLookup {
    Found(GeoPoint),
    NotFound,
}

/// Injectable cache for geocode answers, keyed by lower-cased place name
pub trait GeocodeCache: Send + Sync {
    fn get(&self, place: &str) -> Option<CachedLookup>;

    fn insert(&self, place: &str, lookup: CachedLookup);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Process-local cache; readers never block each other
#[derive(Debug, Default)]
pub struct InMemoryGeocodeCache {
    entries: RwLock<HashMap<String, CachedLookup>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl InMemoryGeocodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl GeocodeCache for InMemoryGeocodeCache {
    fn get(&self, place: &str) -> Option<CachedLookup> {
        let found = self.entries.read().get(&place.to_lowercase()).copied();
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    fn insert(&self, place: &str, lookup: CachedLookup) {
        self.entries.write().insert(place.to_lowercase(), lookup);
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// Cache that stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl GeocodeCache for NoCache {
    fn get(&self, _place: &str) -> Option<CachedLookup> {
        None
    }

    fn insert(&self, _place: &str, _lookup: CachedLookup) {}

    fn len(&self) -> usize {
        0
    }
}
