//! Location name to bounding box resolution
//!
//! Lookup order: static region table, geocode cache, bounded geocoder call.
//! A `None` answer means "do not filter by location", never "nothing matches".

pub mod cache;
pub mod geocoder;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use cache::{CacheStats, CachedLookup, GeocodeCache, InMemoryGeocodeCache, NoCache};
pub use geocoder::{Geocoder, NominatimGeocoder};

use crate::deadline::{call_with_deadline, Deadline};

/// Default half-width of the box around a geocoded point, in degrees
pub const DEFAULT_MARGIN_DEGREES: f64 = 2.0;

/// Default bound on one geocoder call
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

/// A latitude/longitude point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Closed latitude/longitude rectangle in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBounds {
    pub const fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// Square box of half-width `margin` around `point`
    pub fn around(point: GeoPoint, margin: f64) -> Self {
        Self {
            lat_min: point.latitude - margin,
            lat_max: point.latitude + margin,
            lon_min: point.longitude - margin,
            lon_max: point.longitude + margin,
        }
    }

    /// Edges are inside
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.lat_min
            && latitude <= self.lat_max
            && longitude >= self.lon_min
            && longitude <= self.lon_max
    }
}

/// Named ocean regions resolved without any lookup
pub const STATIC_REGIONS: &[(&str, GeoBounds)] = &[
    ("arabian sea", GeoBounds::new(10.0, 25.0, 50.0, 80.0)),
    ("bay of bengal", GeoBounds::new(5.0, 22.0, 80.0, 100.0)),
    ("indian ocean", GeoBounds::new(-50.0, 30.0, 20.0, 147.0)),
    ("equatorial indian ocean", GeoBounds::new(-10.0, 10.0, 40.0, 100.0)),
    ("southern ocean", GeoBounds::new(-70.0, -40.0, -180.0, 180.0)),
    ("madagascar", GeoBounds::new(-26.0, -11.0, 43.0, 51.0)),
    ("maldives", GeoBounds::new(-1.0, 8.0, 72.0, 74.0)),
    ("sri lanka", GeoBounds::new(5.0, 10.0, 79.0, 82.0)),
];

/// Exact, case-insensitive lookup in [`STATIC_REGIONS`]
pub fn static_bounds(name: &str) -> Option<GeoBounds> {
    let name = name.trim().to_lowercase();
    STATIC_REGIONS
        .iter()
        .find(|(region, _)| *region == name)
        .map(|(_, bounds)| *bounds)
}

/// Resolves location names to [`GeoBounds`]
pub struct GeoResolver {
    geocoder: Option<Arc<dyn Geocoder>>,
    cache: Arc<dyn GeocodeCache>,
    timeout: Duration,
    margin: f64,
}

impl GeoResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>, cache: Arc<dyn GeocodeCache>) -> Self {
        Self {
            geocoder: Some(geocoder),
            cache,
            timeout: DEFAULT_GEOCODE_TIMEOUT,
            margin: DEFAULT_MARGIN_DEGREES,
        }
    }

    /// Static table only
    pub fn static_only() -> Self {
        Self {
            geocoder: None,
            cache: Arc::new(NoCache),
            timeout: DEFAULT_GEOCODE_TIMEOUT,
            margin: DEFAULT_MARGIN_DEGREES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    pub async fn resolve(&self, name: &str) -> Option<GeoBounds> {
        let key = name.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        if let Some(bounds) = static_bounds(&key) {
            debug!("Resolved '{}' from static region table", key);
            return Some(bounds);
        }

        if let Some(cached) = self.cache.get(&key) {
            debug!("Resolved '{}' from geocode cache", key);
            return match cached {
                CachedLookup::Found(point) => Some(GeoBounds::around(point, self.margin)),
                CachedLookup::NotFound => None,
            };
        }

        let geocoder = self.geocoder.as_ref()?;

        info!("Geocoding location: {}", key);
        match call_with_deadline(self.timeout, geocoder.geocode(&key)).await {
            Deadline::Completed(Ok(Some(point))) => {
                self.cache.insert(&key, CachedLookup::Found(point));
                let bounds = GeoBounds::around(point, self.margin);
                info!("Geocoded {} to bounds: {:?}", key, bounds);
                Some(bounds)
            }
            Deadline::Completed(Ok(None)) => {
                self.cache.insert(&key, CachedLookup::NotFound);
                warn!("Geocoder found no match for '{}'", key);
                None
            }
            Deadline::Completed(Err(e)) => {
                warn!("Geocoding failed for {}: {}", key, e);
                None
            }
            Deadline::TimedOut(limit) => {
                warn!("Geocoding timed out for {} after {:?}", key, limit);
                None
            }
        }
    }
}
