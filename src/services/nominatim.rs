//! HTTP geocoder against a Nominatim-compatible API.
//!
//! Forward lookups hit `/search?format=json&q=…` and reverse lookups hit
//! `/reverse?format=json&lat=…&lon=…`. Every transport or decoding failure
//! surfaces to the engine as [`SearchError::GeocodingUnavailable`], which
//! puts the search into degraded mode.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::core::error::SearchError;
use crate::core::geo::{GeocodeHit, Geocoder};
use crate::models::Coordinate;

/// Default user agent; the public Nominatim policy requires one
pub const DEFAULT_USER_AGENT: &str = "kazi-match/0.1";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Errors raised by the geocoding provider
#[derive(Debug, Error)]
pub enum GeocodeProviderError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned status {0}")]
    Status(reqwest::StatusCode),
}

impl From<GeocodeProviderError> for SearchError {
    fn from(err: GeocodeProviderError) -> Self {
        SearchError::GeocodingUnavailable(err.to_string())
    }
}

/// Configuration for [`NominatimGeocoder`]
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl NominatimConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReverseHit {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Nominatim-backed [`Geocoder`]
pub struct NominatimGeocoder {
    client: Client,
    config: NominatimConfig,
}

impl std::fmt::Debug for NominatimGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NominatimGeocoder")
            .field("config", &self.config)
            .finish()
    }
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeocodeProviderError> {
        Self::with_config(NominatimConfig::new(base_url))
    }

    pub fn with_config(config: NominatimConfig) -> Result<Self, GeocodeProviderError> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&limit=1&q={}",
            self.config.base_url.trim_end_matches('/'),
            urlencoding::encode(query)
        )
    }

    fn reverse_url(&self, coordinate: Coordinate) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}",
            self.config.base_url.trim_end_matches('/'),
            coordinate.latitude,
            coordinate.longitude
        )
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, GeocodeProviderError> {
        tracing::debug!("Geocoding request: {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(GeocodeProviderError::Status(response.status()));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn forward(&self, query: &str) -> Result<Vec<GeocodeHit>, SearchError> {
        let hits: Vec<SearchHit> = self.get_json(&self.search_url(query)).await?;

        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                let latitude = hit.lat.trim().parse::<f64>().ok()?;
                let longitude = hit.lon.trim().parse::<f64>().ok()?;
                Some(GeocodeHit {
                    coordinate: Coordinate { latitude, longitude },
                    display_name: hit.display_name,
                })
            })
            .collect())
    }

    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, SearchError> {
        let hit: ReverseHit = self.get_json(&self.reverse_url(coordinate)).await?;

        if let Some(error) = hit.error {
            tracing::debug!("Reverse geocoding found nothing: {}", error);
            return Ok(None);
        }

        Ok(hit.display_name.filter(|name| !name.trim().is_empty()))
    }
}
