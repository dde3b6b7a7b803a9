use serde::{Deserialize, Serialize};

use crate::models::domain::Scored;

/// Response for the search and match endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    pub results: Vec<Scored<T>>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "totalResults")]
    pub total_results: usize,
    /// Set when geocoding failed and distance filtering was skipped
    pub degraded: bool,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveLocationResponse {
    pub query: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DescribeLocationResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
}
