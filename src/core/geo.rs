//! Coordinate resolution through an external geocoding service.
//!
//! The network side lives behind the [`Geocoder`] trait so the pipelines can
//! be exercised without one. Distance math is in [`super::distance`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::error::SearchError;
use crate::models::Coordinate;

/// Label used when a coordinate cannot be described
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// A single forward-geocoding result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    pub display_name: Option<String>,
}

/// External geocoding collaborator
///
/// Implementations report transport or service failures as
/// [`SearchError::GeocodingUnavailable`]. An empty hit list (forward) or
/// `None` (reverse) means the service answered but knew nothing.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn forward(&self, query: &str) -> Result<Vec<GeocodeHit>, SearchError>;

    async fn reverse(&self, coordinate: Coordinate) -> Result<Option<String>, SearchError>;
}

/// Resolve free-text location into a coordinate
///
/// Fails with `LocationNotFound` when the service has no result and with
/// `GeocodingUnavailable` when the call itself fails. There is no fallback
/// coordinate.
pub async fn resolve_coordinate(
    geocoder: &dyn Geocoder,
    location: &str,
) -> Result<Coordinate, SearchError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(SearchError::LocationNotFound("empty location".to_string()));
    }

    let hits = geocoder.forward(location).await?;

    hits.into_iter()
        .map(|hit| hit.coordinate)
        .find(Coordinate::is_valid)
        .ok_or_else(|| SearchError::LocationNotFound(location.to_string()))
}

/// Reverse-geocode a coordinate into a human-readable label
pub async fn reverse_geocode(
    geocoder: &dyn Geocoder,
    coordinate: Coordinate,
) -> Result<String, SearchError> {
    match geocoder.reverse(coordinate).await? {
        Some(label) if !label.trim().is_empty() => Ok(label),
        _ => Err(SearchError::LocationNotFound(format!(
            "{}, {}",
            coordinate.latitude, coordinate.longitude
        ))),
    }
}

/// Like [`reverse_geocode`] but never fails
pub async fn describe_coordinate(geocoder: &dyn Geocoder, coordinate: Coordinate) -> String {
    match reverse_geocode(geocoder, coordinate).await {
        Ok(label) => label,
        Err(e) => {
            tracing::debug!("Reverse geocoding failed, using generic label: {}", e);
            CURRENT_LOCATION_LABEL.to_string()
        }
    }
}

/// Geocoder for deployments without a geocoding service
///
/// Every call reports the service as unavailable, so searches that rely on
/// location text run in degraded mode while explicit coordinates still work.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGeocoder;

#[async_trait]
impl Geocoder for OfflineGeocoder {
    async fn forward(&self, _query: &str) -> Result<Vec<GeocodeHit>, SearchError> {
        Err(SearchError::GeocodingUnavailable("no geocoder configured".to_string()))
    }

    async fn reverse(&self, _coordinate: Coordinate) -> Result<Option<String>, SearchError> {
        Err(SearchError::GeocodingUnavailable("no geocoder configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder {
        hits: Vec<GeocodeHit>,
        label: Option<String>,
    }

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn forward(&self, _query: &str) -> Result<Vec<GeocodeHit>, SearchError> {
            Ok(self.hits.clone())
        }

        async fn reverse(&self, _coordinate: Coordinate) -> Result<Option<String>, SearchError> {
            Ok(self.label.clone())
        }
    }

    fn nairobi() -> Coordinate {
        Coordinate { latitude: -1.2921, longitude: 36.8219 }
    }

    #[tokio::test]
    async fn test_resolve_first_hit() {
        let geocoder = FixedGeocoder {
            hits: vec![GeocodeHit {
                coordinate: nairobi(),
                display_name: Some("Nairobi, Kenya".to_string()),
            }],
            label: None,
        };

        let coordinate = resolve_coordinate(&geocoder, " Nairobi ").await.unwrap();
        assert_eq!(coordinate, nairobi());
    }

    #[tokio::test]
    async fn test_resolve_no_results() {
        let geocoder = FixedGeocoder { hits: vec![], label: None };

        let err = resolve_coordinate(&geocoder, "Atlantis").await.unwrap_err();
        assert_eq!(err, SearchError::LocationNotFound("Atlantis".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_blank_skips_service() {
        let err = resolve_coordinate(&OfflineGeocoder, "  ").await.unwrap_err();
        assert!(matches!(err, SearchError::LocationNotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_service_failure() {
        let err = resolve_coordinate(&OfflineGeocoder, "Nairobi").await.unwrap_err();
        assert!(matches!(err, SearchError::GeocodingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_describe_falls_back() {
        assert_eq!(
            describe_coordinate(&OfflineGeocoder, nairobi()).await,
            CURRENT_LOCATION_LABEL
        );

        let silent = FixedGeocoder { hits: vec![], label: None };
        assert_eq!(describe_coordinate(&silent, nairobi()).await, CURRENT_LOCATION_LABEL);
    }

    #[tokio::test]
    async fn test_describe_uses_label() {
        let geocoder = FixedGeocoder {
            hits: vec![],
            label: Some("Kilimani, Nairobi".to_string()),
        };

        assert_eq!(describe_coordinate(&geocoder, nairobi()).await, "Kilimani, Nairobi");
        assert!(reverse_geocode(&geocoder, nairobi()).await.is_ok());
    }
}
