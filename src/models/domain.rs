use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::core::error::SearchError;

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SearchError> {
        let coordinate = Self { latitude, longitude };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(SearchError::InvalidCriteria(format!(
                "coordinate ({}, {}) is out of range",
                latitude, longitude
            )))
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Both halves must be present; a lone latitude is not a location
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                let coordinate = Self { latitude, longitude };
                coordinate.is_valid().then_some(coordinate)
            }
            _ => None,
        }
    }
}

/// Lifecycle of a job posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Open,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Job posting as fetched from the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    #[serde(rename = "customerId", alias = "customer_id", default)]
    pub customer_id: Option<Uuid>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "serviceId", alias = "service_id", default)]
    pub service_id: Option<Uuid>,
    pub status: JobStatus,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(rename = "budgetMin", alias = "budget_min")]
    pub budget_min: f64,
    #[serde(rename = "budgetMax", alias = "budget_max")]
    pub budget_max: f64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(
        rename = "requiredSkills",
        alias = "required_skills",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub required_skills: Vec<String>,
    #[serde(rename = "createdAt", alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn is_open(&self) -> bool {
        self.status == JobStatus::Open
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }

    pub fn budget_midpoint(&self) -> f64 {
        (self.budget_min + self.budget_max) / 2.0
    }
}

/// Worker profile joined with its services
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    pub id: Uuid,
    #[serde(rename = "fullName", alias = "full_name")]
    pub full_name: String,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(
        rename = "serviceIds",
        alias = "service_ids",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub service_ids: Vec<Uuid>,
    #[serde(
        rename = "serviceNames",
        alias = "service_names",
        default,
        deserialize_with = "null_as_empty"
    )]
    pub service_names: Vec<String>,
    #[serde(rename = "hourlyRate", alias = "hourly_rate", default)]
    pub hourly_rate: Option<f64>,
    /// `None` means the worker has not been rated yet
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(rename = "reviewCount", alias = "review_count", default)]
    pub review_count: u32,
    #[serde(rename = "yearsExperience", alias = "years_experience", default)]
    pub years_experience: Option<u32>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(rename = "isAvailable", alias = "is_available", default = "default_true")]
    pub is_available: bool,
}

impl Worker {
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }
}

fn default_true() -> bool { true }

/// Treat an explicit `null` array column the same as a missing one
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Composite relevance of a worker against a set of required skills
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelevanceScore {
    pub total: f64,
    #[serde(rename = "skillMatchScore")]
    pub skill_match_score: f64,
    #[serde(rename = "experienceScore")]
    pub experience_score: f64,
    #[serde(rename = "ratingScore")]
    pub rating_score: f64,
}

/// A candidate together with the metrics derived for one search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scored<T> {
    #[serde(flatten)]
    pub candidate: T,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(rename = "skillMatchScore", skip_serializing_if = "Option::is_none", default)]
    pub skill_match_score: Option<f64>,
    #[serde(rename = "relevanceScore", skip_serializing_if = "Option::is_none", default)]
    pub relevance: Option<RelevanceScore>,
}

pub type ScoredJob = Scored<Job>;
pub type ScoredWorker = Scored<Worker>;

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_from_backend_row() {
        let row = json!({
            "id": "0b7c3e1e-59a4-4c59-9d7a-8d1f4f3b2a10",
            "customer_id": null,
            "title": "Paint living room",
            "service_id": "5a1d1a52-2f43-4a39-9b1e-6d8c0e0f7a11",
            "status": "open",
            "urgency": "high",
            "budget_min": 500.0,
            "budget_max": 1000.0,
            "latitude": -1.2921,
            "longitude": 36.8219,
            "required_skills": null,
            "created_at": "2026-10-01T09:30:00Z"
        });

        let job: Job = serde_json::from_value(row).unwrap();

        assert!(job.is_open());
        assert_eq!(job.urgency, Urgency::High);
        assert!(job.required_skills.is_empty());
        assert_eq!(job.budget_midpoint(), 750.0);
        assert!(job.coordinate().is_some());
    }

    #[test]
    fn test_unknown_status_is_not_open() {
        let row = json!({
            "id": "0b7c3e1e-59a4-4c59-9d7a-8d1f4f3b2a10",
            "title": "Fix sink",
            "status": "archived",
            "budgetMin": 100.0,
            "budgetMax": 200.0,
            "createdAt": "2026-10-01T09:30:00Z"
        });

        let job: Job = serde_json::from_value(row).unwrap();

        assert_eq!(job.status, JobStatus::Unknown);
        assert!(!job.is_open());
        assert_eq!(job.urgency, Urgency::Medium);
    }

    #[test]
    fn test_partial_coordinate_is_absent() {
        assert!(Coordinate::from_parts(Some(-1.29), None).is_none());
        assert!(Coordinate::from_parts(None, Some(36.82)).is_none());
        assert!(Coordinate::from_parts(Some(91.0), Some(36.82)).is_none());
        assert!(Coordinate::from_parts(Some(-1.29), Some(36.82)).is_some());
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(-1.2921, 36.8219).is_ok());
        assert!(matches!(
            Coordinate::new(f64::NAN, 36.8219),
            Err(SearchError::InvalidCriteria(_))
        ));
        assert!(Coordinate::new(0.0, 181.0).is_err());
    }

    #[test]
    fn test_unrated_worker_is_distinct_from_zero() {
        let row = json!({
            "id": "9e3f4c1a-1111-4b7a-8c2d-0a0b0c0d0e0f",
            "full_name": "Wanjiru Kamau",
            "rating": null,
            "skills": ["Plumbing"]
        });

        let worker: Worker = serde_json::from_value(row).unwrap();

        assert_eq!(worker.rating, None);
        assert!(worker.is_available);
        assert!(worker.coordinate().is_none());
    }

    #[test]
    fn test_scored_candidate_serialization_flattens() {
        let worker = Worker {
            id: Uuid::nil(),
            full_name: "Otieno".to_string(),
            profession: None,
            service_ids: vec![],
            service_names: vec![],
            hourly_rate: Some(800.0),
            rating: Some(4.5),
            review_count: 12,
            years_experience: Some(3),
            skills: vec![],
            location: None,
            latitude: None,
            longitude: None,
            is_available: true,
        };
        let scored = Scored {
            candidate: worker,
            distance_km: None,
            skill_match_score: None,
            relevance: None,
        };

        let value = serde_json::to_value(&scored).unwrap();

        assert_eq!(value["fullName"], "Otieno");
        assert!(value["distanceKm"].is_null());
        assert!(value.get("relevanceScore").is_none());
    }
}
