//! Point geocoding (Nominatim)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use super::GeoPoint;
use crate::{error::QueryError, Result};

/// Resolves a free-text place name to its best-match point
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the service answered and knows no such place
    async fn geocode(&self, place: &str) -> Result<Option<GeoPoint>>;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Client for the Nominatim `/search` endpoint
pub struct NominatimGeocoder {
    client: Arc<Client>,
    base_url: String,
}

impl NominatimGeocoder {
    /// # Errors
    /// Returns `ConfigError` if `base_url` is empty or the client cannot be built
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(QueryError::ConfigError(
                "Geocoder base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| QueryError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, place: &str) -> Result<Option<GeoPoint>> {
        let url = format!("{}/search", self.base_url);
        debug!("Geocoding '{}' via {}", place, url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QueryError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let places: Vec<NominatimPlace> = serde_json::from_str(&body)
            .map_err(|e| QueryError::MalformedResponse(format!("geocoder reply: {}", e)))?;

        let Some(best) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = best
            .lat
            .parse::<f64>()
            .map_err(|e| QueryError::GeocodeFailed(format!("bad latitude '{}': {}", best.lat, e)))?;
        let longitude = best
            .lon
            .parse::<f64>()
            .map_err(|e| QueryError::GeocodeFailed(format!("bad longitude '{}': {}", best.lon, e)))?;

        Ok(Some(GeoPoint {
            latitude,
            longitude,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_url_rejected() {
        let result = NominatimGeocoder::new("", "floatchat-test", Duration::from_secs(1));
        assert!(matches!(result, Err(QueryError::ConfigError(_))));
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let geocoder =
            NominatimGeocoder::new("https://nominatim.example.org/", "floatchat-test", Duration::from_secs(1))
                .unwrap();
        assert_eq!(geocoder.base_url(), "https://nominatim.example.org");
    }
}
