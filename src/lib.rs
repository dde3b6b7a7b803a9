//! Kazi Match - search and matching engine for a local services marketplace
//!
//! Customers post jobs, workers keep profiles. This library filters and ranks
//! both sides: attribute filters, great-circle distance from a geocoded
//! target, and a weighted relevance score for workers.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance::{calculate_bounding_box, haversine_distance},
    Geocoder, Matcher, SearchError, SearchOutcome,
};
pub use models::{Coordinate, Job, Scored, ScoredJob, ScoredWorker, SearchCriteria, Worker};
