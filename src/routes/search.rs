use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;

use crate::core::matcher::{criteria_for_job, criteria_for_worker};
use crate::core::{Matcher, SearchError, SearchOutcome};
use crate::models::{
    Coordinate, DescribeLocationQuery, DescribeLocationResponse, ErrorResponse, HealthResponse,
    MatchJobsRequest, MatchWorkersRequest, ResolveLocationQuery, ResolveLocationResponse,
    SearchRequest, SearchResponse,
};
use crate::services::{CandidateRepository, RepositoryError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn CandidateRepository>,
    pub matcher: Matcher,
    pub default_limit: usize,
    pub max_limit: usize,
}

/// Configure search, match and geo routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/search/jobs", web::post().to(search_jobs))
        .route("/search/workers", web::post().to(search_workers))
        .route("/match/jobs-for-worker", web::post().to(match_jobs_for_worker))
        .route("/match/workers-for-job", web::post().to(match_workers_for_job))
        .route("/geo/resolve", web::get().to(resolve_location))
        .route("/geo/describe", web::get().to(describe_location));
}

fn error_response(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

fn validation_failed(errors: validator::ValidationErrors) -> HttpResponse {
    tracing::info!("Request validation failed: {}", errors);
    error_response(StatusCode::BAD_REQUEST, "validation_failed", errors.to_string())
}

/// Map engine errors onto HTTP statuses
pub fn search_error_response(err: &SearchError) -> HttpResponse {
    let (status, error) = match err {
        SearchError::InvalidCriteria(_) => (StatusCode::BAD_REQUEST, "invalid_criteria"),
        SearchError::LocationNotFound(_) => (StatusCode::NOT_FOUND, "location_not_found"),
        SearchError::GeocodingUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "geocoding_unavailable"),
    };
    error_response(status, error, err.to_string())
}

fn repository_error_response(err: &RepositoryError) -> HttpResponse {
    tracing::error!("Candidate fetch failed: {}", err);
    error_response(StatusCode::BAD_GATEWAY, "repository_error", err.to_string())
}

fn respond<T: Serialize>(mut outcome: SearchOutcome<T>, limit: usize) -> HttpResponse {
    let total_results = outcome.results.len();
    outcome.results.truncate(limit);

    tracing::info!(
        "Returning {} of {} results (from {} candidates, degraded: {})",
        outcome.results.len(),
        total_results,
        outcome.total_candidates,
        outcome.degraded
    );

    HttpResponse::Ok().json(SearchResponse {
        results: outcome.results,
        total_candidates: outcome.total_candidates,
        total_results,
        degraded: outcome.degraded,
    })
}

impl AppState {
    fn cap(&self, limit: Option<u16>) -> usize {
        limit.map_or(self.default_limit, usize::from).min(self.max_limit)
    }
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Search job postings
///
/// POST /api/v1/search/jobs
///
/// Request body:
/// ```json
/// {
///   "location": "Westlands, Nairobi",
///   "maxDistance": 10,
///   "minBudget": 500,
///   "requiredSkills": ["painting"],
///   "sortBy": "relevance",
///   "limit": 20
/// }
/// ```
async fn search_jobs(state: web::Data<AppState>, req: web::Json<SearchRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }
    if let Err(e) = req.criteria.validate_bounds() {
        return search_error_response(&e);
    }

    let limit = state.cap(req.limit);
    tracing::info!("Searching jobs, limit: {}", limit);

    let jobs = match state.repository.fetch_candidate_jobs(&req.criteria).await {
        Ok(jobs) => jobs,
        Err(e) => return repository_error_response(&e),
    };

    match state.matcher.search_jobs(&req.criteria, jobs).await {
        Ok(outcome) => respond(outcome, limit),
        Err(e) => search_error_response(&e),
    }
}

/// Search worker profiles
///
/// POST /api/v1/search/workers
async fn search_workers(state: web::Data<AppState>, req: web::Json<SearchRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }
    if let Err(e) = req.criteria.validate_bounds() {
        return search_error_response(&e);
    }

    let limit = state.cap(req.limit);
    tracing::info!("Searching workers, limit: {}", limit);

    let workers = match state.repository.fetch_candidate_workers(&req.criteria).await {
        Ok(workers) => workers,
        Err(e) => return repository_error_response(&e),
    };

    match state.matcher.search_workers(&req.criteria, workers).await {
        Ok(outcome) => respond(outcome, limit),
        Err(e) => search_error_response(&e),
    }
}

/// Jobs that fit a worker's profile
///
/// POST /api/v1/match/jobs-for-worker
async fn match_jobs_for_worker(
    state: web::Data<AppState>,
    req: web::Json<MatchJobsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let limit = state.cap(req.limit);
    tracing::info!("Matching jobs for worker: {}, limit: {}", req.worker.id, limit);

    // Fetch with the worker-derived criteria so the bounding box applies
    let fetch_criteria = criteria_for_worker(&req.worker, &req.criteria);
    if let Err(e) = fetch_criteria.validate_bounds() {
        return search_error_response(&e);
    }

    let jobs = match state.repository.fetch_candidate_jobs(&fetch_criteria).await {
        Ok(jobs) => jobs,
        Err(e) => return repository_error_response(&e),
    };

    match state.matcher.match_jobs_for_worker(&req.worker, &req.criteria, jobs).await {
        Ok(outcome) => respond(outcome, limit),
        Err(e) => search_error_response(&e),
    }
}

/// Workers ranked for a job
///
/// POST /api/v1/match/workers-for-job
async fn match_workers_for_job(
    state: web::Data<AppState>,
    req: web::Json<MatchWorkersRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_failed(errors);
    }

    let limit = state.cap(req.limit);
    tracing::info!("Ranking workers for job: {}, limit: {}", req.job.id, limit);

    let fetch_criteria = criteria_for_job(&req.job, &req.criteria);
    if let Err(e) = fetch_criteria.validate_bounds() {
        return search_error_response(&e);
    }

    let workers = match state.repository.fetch_candidate_workers(&fetch_criteria).await {
        Ok(workers) => workers,
        Err(e) => return repository_error_response(&e),
    };

    match state.matcher.rank_workers_for_job(&req.job, &req.criteria, workers).await {
        Ok(outcome) => respond(outcome, limit),
        Err(e) => search_error_response(&e),
    }
}

/// Forward geocoding
///
/// GET /api/v1/geo/resolve?q={text}
async fn resolve_location(
    state: web::Data<AppState>,
    query: web::Query<ResolveLocationQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    match state.matcher.resolve_location(&query.q).await {
        Ok(coordinate) => HttpResponse::Ok().json(ResolveLocationResponse {
            query: query.q.clone(),
            latitude: coordinate.latitude,
            longitude: coordinate.longitude,
        }),
        Err(e) => {
            tracing::info!("Could not resolve '{}': {}", query.q, e);
            search_error_response(&e)
        }
    }
}

/// Reverse geocoding, falls back to a generic label
///
/// GET /api/v1/geo/describe?lat={lat}&lon={lon}
async fn describe_location(
    state: web::Data<AppState>,
    query: web::Query<DescribeLocationQuery>,
) -> impl Responder {
    if let Err(errors) = query.validate() {
        return validation_failed(errors);
    }

    let coordinate = match Coordinate::new(query.lat, query.lon) {
        Ok(coordinate) => coordinate,
        Err(e) => return search_error_response(&e),
    };

    let label = state.matcher.describe_location(coordinate).await;

    HttpResponse::Ok().json(DescribeLocationResponse {
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_error_statuses() {
        let cases = [
            (SearchError::InvalidCriteria("x".into()), StatusCode::BAD_REQUEST),
            (SearchError::LocationNotFound("x".into()), StatusCode::NOT_FOUND),
            (SearchError::GeocodingUnavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (err, status) in cases {
            assert_eq!(search_error_response(&err).status(), status);
        }
    }

    #[test]
    fn test_repository_error_is_bad_gateway() {
        let err = RepositoryError::ApiError("boom".into());
        assert_eq!(repository_error_response(&err).status(), StatusCode::BAD_GATEWAY);
    }
}
