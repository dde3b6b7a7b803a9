use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Job, SearchCriteria, Worker};

/// Errors raised while fetching candidates from the backing store
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Broad candidate fetch
///
/// Implementations push down what the store can filter cheaply (open status,
/// services, a bounding box) and leave exact filtering to the pipelines.
/// Over-fetching is fine, under-fetching is not: implementations return
/// every row that survives the pushdown, paging if the store caps responses.
#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn fetch_candidate_jobs(&self, criteria: &SearchCriteria) -> Result<Vec<Job>, RepositoryError>;

    async fn fetch_candidate_workers(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Worker>, RepositoryError>;
}
