use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::criteria::SearchCriteria;
use crate::models::domain::{Job, Worker};

/// Request body for job and worker searches
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub criteria: SearchCriteria,
    /// Falls back to the configured default when absent
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to find jobs matching a worker's skills
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchJobsRequest {
    pub worker: Worker,
    #[serde(default)]
    pub criteria: SearchCriteria,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Request to rank workers for a job
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchWorkersRequest {
    pub job: Job,
    #[serde(default)]
    pub criteria: SearchCriteria,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
}

/// Forward geocoding query: `GET /geo/resolve?q=...`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResolveLocationQuery {
    #[validate(length(min = 1, max = 200))]
    pub q: String,
}

/// Reverse geocoding query: `GET /geo/describe?lat=...&lon=...`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DescribeLocationQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
}
