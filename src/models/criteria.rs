use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::SearchError;
use crate::models::domain::{Coordinate, Urgency};

/// Posted-date window for job searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePosted {
    Today,
    Week,
    Month,
    #[default]
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Date,
    Budget,
    Relevance,
    Distance,
    Rating,
    Rate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Search criteria shared by the job and worker pipelines
///
/// Every field is optional. An empty criteria object matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(default)]
    pub query: Option<String>,
    /// Free-text location, resolved through the geocoder
    #[serde(default)]
    pub location: Option<String>,
    /// Explicit target, takes precedence over `location`
    #[serde(default)]
    pub coordinates: Option<Coordinate>,
    #[serde(rename = "maxDistance", default)]
    pub max_distance_km: Option<f64>,
    #[serde(rename = "minBudget", default)]
    pub min_budget: Option<f64>,
    #[serde(rename = "maxBudget", default)]
    pub max_budget: Option<f64>,
    #[serde(rename = "minRate", default)]
    pub min_rate: Option<f64>,
    #[serde(rename = "maxRate", default)]
    pub max_rate: Option<f64>,
    #[serde(rename = "minRating", default)]
    pub min_rating: Option<f64>,
    #[serde(rename = "serviceIds", default)]
    pub service_ids: Vec<Uuid>,
    #[serde(default)]
    pub urgency: Vec<Urgency>,
    #[serde(rename = "datePosted", default)]
    pub date_posted: DatePosted,
    #[serde(rename = "requiredSkills", default)]
    pub required_skills: Vec<String>,
    #[serde(rename = "sortBy", default)]
    pub sort_by: Option<SortKey>,
    #[serde(rename = "sortOrder", default)]
    pub sort_order: Option<SortOrder>,
}

impl SearchCriteria {
    /// Reject malformed or contradictory bounds
    ///
    /// Bounds are never swapped or clamped: a reversed range is a caller bug.
    pub fn validate_bounds(&self) -> Result<(), SearchError> {
        check_non_negative("maxDistance", self.max_distance_km)?;
        check_non_negative("minBudget", self.min_budget)?;
        check_non_negative("maxBudget", self.max_budget)?;
        check_non_negative("minRate", self.min_rate)?;
        check_non_negative("maxRate", self.max_rate)?;
        check_range("minBudget", "maxBudget", self.min_budget, self.max_budget)?;
        check_range("minRate", "maxRate", self.min_rate, self.max_rate)?;

        if let Some(rating) = self.min_rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(SearchError::InvalidCriteria(format!(
                    "minRating {} must be between 0 and 5",
                    rating
                )));
            }
        }

        if let Some(coordinate) = self.coordinates {
            if !coordinate.is_valid() {
                return Err(SearchError::InvalidCriteria(format!(
                    "coordinates ({}, {}) are out of range",
                    coordinate.latitude, coordinate.longitude
                )));
            }
        }

        Ok(())
    }

    /// Location text, if any, with surrounding whitespace removed
    pub fn location_text(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    /// Whether at least one non-blank skill was supplied
    pub fn has_required_skills(&self) -> bool {
        self.required_skills.iter().any(|s| !s.trim().is_empty())
    }
}

fn check_non_negative(field: &str, value: Option<f64>) -> Result<(), SearchError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(SearchError::InvalidCriteria(format!(
            "{} must be a non-negative number, got {}",
            field, v
        ))),
        _ => Ok(()),
    }
}

fn check_range(
    min_field: &str,
    max_field: &str,
    min: Option<f64>,
    max: Option<f64>,
) -> Result<(), SearchError> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(SearchError::InvalidCriteria(format!(
            "{} {} exceeds {} {}",
            min_field, min, max_field, max
        ))),
        _ => Ok(()),
    }
}
