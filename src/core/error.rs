use thiserror::Error;

/// Errors surfaced by the search and matching core
///
/// Geocoding failures (`LocationNotFound`, `GeocodingUnavailable`) are
/// absorbed by the search pipelines, which fall back to degraded mode.
/// `InvalidCriteria` always reaches the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Geocoding service unavailable: {0}")]
    GeocodingUnavailable(String),

    #[error("Invalid search criteria: {0}")]
    InvalidCriteria(String),
}

impl SearchError {
    /// Whether a search can continue without the failed step
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SearchError::LocationNotFound(_) | SearchError::GeocodingUnavailable(_)
        )
    }
}
