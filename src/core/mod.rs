// Core algorithm exports
pub mod distance;
pub mod error;
pub mod filters;
pub mod geo;
pub mod job_search;
pub mod matcher;
pub mod ordering;
pub mod scoring;
pub mod skills;
pub mod worker_search;

pub use distance::{calculate_bounding_box, distance_between, haversine_distance, is_within_bounding_box};
pub use error::SearchError;
pub use geo::{describe_coordinate, resolve_coordinate, reverse_geocode, GeocodeHit, Geocoder, OfflineGeocoder};
pub use job_search::filter_and_rank_jobs;
pub use matcher::{Matcher, SearchOutcome, TargetResolution};
pub use scoring::relevance_score;
pub use skills::{skill_match_score, ContainmentMatcher, ExactMatcher, SkillMatcher};
pub use worker_search::filter_and_rank_workers;
