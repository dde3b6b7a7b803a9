use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::core::{
    error::SearchError,
    geo::{describe_coordinate, resolve_coordinate, Geocoder, OfflineGeocoder},
    job_search::filter_and_rank_jobs,
    skills::{ContainmentMatcher, SkillMatcher},
    worker_search::filter_and_rank_workers,
};
use crate::models::{Coordinate, Job, Scored, SearchCriteria, SortKey, Worker};

/// Default upper bound on a single geocoding call
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of a search
#[derive(Debug)]
pub struct SearchOutcome<T> {
    pub results: Vec<Scored<T>>,
    pub total_candidates: usize,
    /// Geocoding failed and distance filtering was skipped
    pub degraded: bool,
}

/// Search target after geocoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetResolution {
    pub coordinate: Option<Coordinate>,
    pub degraded: bool,
}

/// Search and matching orchestrator
///
/// Owns no data: candidates are passed in per call, already fetched by the
/// caller. The geocoder and skill matching strategy are injected.
///
/// # Pipeline Stages
/// 1. Criteria validation (errors propagate)
/// 2. Target resolution (geocoding errors degrade)
/// 3. Filtering and annotation
/// 4. Sorting
#[derive(Clone)]
pub struct Matcher {
    geocoder: Arc<dyn Geocoder>,
    skill_matcher: Arc<dyn SkillMatcher>,
    geocode_timeout: Duration,
}

impl std::fmt::Debug for Matcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matcher")
            .field("geocoder", &"<dyn Geocoder>")
            .field("skill_matcher", &"<dyn SkillMatcher>")
            .field("geocode_timeout", &self.geocode_timeout)
            .finish()
    }
}

impl Matcher {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            geocoder,
            skill_matcher: Arc::new(ContainmentMatcher),
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
        }
    }

    /// Matcher without a geocoding service; location text always degrades
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineGeocoder))
    }

    pub fn with_skill_matcher(mut self, skill_matcher: Arc<dyn SkillMatcher>) -> Self {
        self.skill_matcher = skill_matcher;
        self
    }

    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout = timeout;
        self
    }

    /// Resolve free-text location, treating a timeout as unavailability
    pub async fn resolve_location(&self, location: &str) -> Result<Coordinate, SearchError> {
        match tokio::time::timeout(
            self.geocode_timeout,
            resolve_coordinate(self.geocoder.as_ref(), location),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(SearchError::GeocodingUnavailable(format!(
                "geocoding timed out after {:?}",
                self.geocode_timeout
            ))),
        }
    }

    /// Human-readable label for a coordinate, never fails
    pub async fn describe_location(&self, coordinate: Coordinate) -> String {
        tokio::time::timeout(
            self.geocode_timeout,
            describe_coordinate(self.geocoder.as_ref(), coordinate),
        )
        .await
        .unwrap_or_else(|_| crate::core::geo::CURRENT_LOCATION_LABEL.to_string())
    }

    /// Work out the search target
    ///
    /// Explicit coordinates win over location text. Geocoding failures are
    /// absorbed and reported through `degraded`.
    pub async fn resolve_target(&self, criteria: &SearchCriteria) -> TargetResolution {
        if let Some(coordinate) = criteria.coordinates {
            return TargetResolution {
                coordinate: Some(coordinate),
                degraded: false,
            };
        }

        let Some(location) = criteria.location_text() else {
            return TargetResolution {
                coordinate: None,
                degraded: false,
            };
        };

        match self.resolve_location(location).await {
            Ok(coordinate) => {
                tracing::debug!("Resolved '{}' to {:?}", location, coordinate);
                TargetResolution {
                    coordinate: Some(coordinate),
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Geocoding '{}' failed, searching without distance filter: {}",
                    location,
                    e
                );
                TargetResolution {
                    coordinate: None,
                    degraded: true,
                }
            }
        }
    }

    /// Search job postings
    ///
    /// # Arguments
    /// * `criteria` - Search criteria; malformed bounds are rejected
    /// * `jobs` - Candidate jobs from the backend
    pub async fn search_jobs(
        &self,
        criteria: &SearchCriteria,
        jobs: Vec<Job>,
    ) -> Result<SearchOutcome<Job>, SearchError> {
        self.search_jobs_at(criteria, jobs, Utc::now()).await
    }

    /// [`Matcher::search_jobs`] with an explicit clock for date windows
    pub async fn search_jobs_at(
        &self,
        criteria: &SearchCriteria,
        jobs: Vec<Job>,
        now: DateTime<Utc>,
    ) -> Result<SearchOutcome<Job>, SearchError> {
        criteria.validate_bounds()?;
        let target = self.resolve_target(criteria).await;
        Ok(self.rank_jobs(criteria, target, jobs, now))
    }

    /// Filter and rank jobs against an already-resolved target
    pub fn rank_jobs(
        &self,
        criteria: &SearchCriteria,
        target: TargetResolution,
        jobs: Vec<Job>,
        now: DateTime<Utc>,
    ) -> SearchOutcome<Job> {
        let total_candidates = jobs.len();
        let results = filter_and_rank_jobs(
            criteria,
            target.coordinate,
            jobs,
            self.skill_matcher.as_ref(),
            now,
        );

        tracing::debug!(
            "Job search kept {} of {} candidates (degraded: {})",
            results.len(),
            total_candidates,
            target.degraded
        );

        SearchOutcome {
            results,
            total_candidates,
            degraded: target.degraded,
        }
    }

    /// Search worker profiles
    pub async fn search_workers(
        &self,
        criteria: &SearchCriteria,
        workers: Vec<Worker>,
    ) -> Result<SearchOutcome<Worker>, SearchError> {
        criteria.validate_bounds()?;
        let target = self.resolve_target(criteria).await;
        Ok(self.rank_workers(criteria, &criteria.required_skills, target, workers))
    }

    /// Filter and rank workers against an already-resolved target
    pub fn rank_workers(
        &self,
        criteria: &SearchCriteria,
        ranking_skills: &[String],
        target: TargetResolution,
        workers: Vec<Worker>,
    ) -> SearchOutcome<Worker> {
        let total_candidates = workers.len();
        let results = filter_and_rank_workers(
            criteria,
            ranking_skills,
            target.coordinate,
            workers,
            self.skill_matcher.as_ref(),
        );

        tracing::debug!(
            "Worker search kept {} of {} candidates (degraded: {})",
            results.len(),
            total_candidates,
            target.degraded
        );

        SearchOutcome {
            results,
            total_candidates,
            degraded: target.degraded,
        }
    }

    /// Find open jobs that fit a worker's skills
    ///
    /// The worker's skills and location fill in whatever the criteria leave
    /// out, and results rank by skill match unless another sort is asked for.
    pub async fn match_jobs_for_worker(
        &self,
        worker: &Worker,
        criteria: &SearchCriteria,
        jobs: Vec<Job>,
    ) -> Result<SearchOutcome<Job>, SearchError> {
        let criteria = criteria_for_worker(worker, criteria);
        self.search_jobs(&criteria, jobs).await
    }

    /// Rank workers by how well they fit a job
    ///
    /// Relevance is scored against the job's required skills. The job's
    /// service and location fill in whatever the criteria leave out.
    pub async fn rank_workers_for_job(
        &self,
        job: &Job,
        criteria: &SearchCriteria,
        workers: Vec<Worker>,
    ) -> Result<SearchOutcome<Worker>, SearchError> {
        let criteria = criteria_for_job(job, criteria);
        criteria.validate_bounds()?;
        let target = self.resolve_target(&criteria).await;
        Ok(self.rank_workers(&criteria, &job.required_skills, target, workers))
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::offline()
    }
}

/// Criteria for a worker's own job feed
pub fn criteria_for_worker(worker: &Worker, criteria: &SearchCriteria) -> SearchCriteria {
    let mut criteria = criteria.clone();
    if !criteria.has_required_skills() {
        criteria.required_skills = worker.skills.clone();
    }
    if criteria.coordinates.is_none() && criteria.location_text().is_none() {
        criteria.coordinates = worker.coordinate();
    }
    if criteria.sort_by.is_none() {
        criteria.sort_by = Some(SortKey::Relevance);
    }
    criteria
}

/// Criteria for ranking workers against a job
pub fn criteria_for_job(job: &Job, criteria: &SearchCriteria) -> SearchCriteria {
    let mut criteria = criteria.clone();
    if criteria.service_ids.is_empty() {
        criteria.service_ids.extend(job.service_id);
    }
    if criteria.coordinates.is_none() && criteria.location_text().is_none() {
        criteria.coordinates = job.coordinate();
    }
    criteria
}
