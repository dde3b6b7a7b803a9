use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

use crate::core::distance::calculate_bounding_box;
use crate::models::{Job, SearchCriteria, Urgency, Worker};
use crate::services::repository::{CandidateRepository, RepositoryError};

/// Table names exposed through the REST API
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub jobs: String,
    pub workers: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            jobs: "jobs".to_string(),
            workers: "worker_profiles".to_string(),
        }
    }
}

/// Supabase (PostgREST) candidate repository
///
/// Handles the broad fetch for both pipelines:
/// - Open jobs, narrowed by service, urgency and budget overlap
/// - Available workers, narrowed by service, rating and rate
/// - A bounding-box pre-filter when explicit coordinates and a radius are given
///
/// Results are paged with `limit`/`offset` until a short page comes back.
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
    page_size: usize,
}

/// Hard stop for runaway paging
const MAX_PAGES: usize = 200;

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        tables: SupabaseTables,
        page_size: usize,
    ) -> Result<Self, RepositoryError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
            page_size: page_size.max(1),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    async fn select_all<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<Vec<T>, RepositoryError> {
        let mut records = Vec::new();

        for page in 0..MAX_PAGES {
            let mut paged = filters.to_vec();
            paged.push(("limit".to_string(), self.page_size.to_string()));
            paged.push(("offset".to_string(), (page * self.page_size).to_string()));

            let (mut rows, fetched) = self.select_page(table, &paged).await?;
            records.append(&mut rows);

            if fetched < self.page_size {
                tracing::debug!("Fetched {} candidates from {} in {} page(s)", records.len(), table, page + 1);
                return Ok(records);
            }
        }

        tracing::warn!(
            "Stopped paging {} after {} pages, candidates beyond {} rows were not fetched",
            table,
            MAX_PAGES,
            MAX_PAGES * self.page_size
        );
        Ok(records)
    }

    /// One page of rows, plus the raw row count before malformed rows are dropped
    async fn select_page<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(String, String)],
    ) -> Result<(Vec<T>, usize), RepositoryError> {
        let query = filters
            .iter()
            .map(|(column, filter)| format!("{}={}", column, urlencoding::encode(filter)))
            .collect::<Vec<_>>()
            .join("&");
        let url = format!("{}?{}", self.table_url(table), query);

        tracing::debug!("Fetching candidates from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Query on {} failed: {} - {}", table, status, body);
            return Err(RepositoryError::ApiError(format!(
                "Failed to query {}: {}",
                table, status
            )));
        }

        let json: Value = response.json().await?;

        let rows = json
            .as_array()
            .ok_or_else(|| RepositoryError::InvalidResponse("Expected an array of rows".into()))?;

        // Malformed rows are skipped rather than failing the whole search
        let records: Vec<T> = rows
            .iter()
            .filter_map(|row| match serde_json::from_value(row.clone()) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed {} row: {}", table, e);
                    None
                }
            })
            .collect();

        tracing::debug!("Fetched {} of {} rows from {}", records.len(), rows.len(), table);

        Ok((records, rows.len()))
    }

    /// PostgREST filters for the job fetch
    pub fn job_filters(&self, criteria: &SearchCriteria) -> Vec<(String, String)> {
        let mut filters = vec![
            ("select".to_string(), "*".to_string()),
            ("status".to_string(), "eq.open".to_string()),
        ];

        if !criteria.service_ids.is_empty() {
            filters.push(("service_id".to_string(), format!("in.({})", join_ids(&criteria.service_ids))));
        }

        if !criteria.urgency.is_empty() {
            let levels = criteria
                .urgency
                .iter()
                .map(|u| urgency_value(*u))
                .collect::<Vec<_>>()
                .join(",");
            filters.push(("urgency".to_string(), format!("in.({})", levels)));
        }

        // Budget overlap: job max reaches the floor, job min stays under the ceiling
        if let Some(min) = criteria.min_budget {
            filters.push(("budget_max".to_string(), format!("gte.{}", min)));
        }
        if let Some(max) = criteria.max_budget {
            filters.push(("budget_min".to_string(), format!("lte.{}", max)));
        }

        push_bounding_box(&mut filters, criteria);

        filters.push(("order".to_string(), "created_at.desc,id.asc".to_string()));
        filters
    }

    /// PostgREST filters for the worker fetch
    pub fn worker_filters(&self, criteria: &SearchCriteria) -> Vec<(String, String)> {
        let mut filters = vec![
            ("select".to_string(), "*".to_string()),
            ("is_available".to_string(), "eq.true".to_string()),
        ];

        if !criteria.service_ids.is_empty() {
            filters.push(("service_ids".to_string(), format!("ov.{{{}}}", join_ids(&criteria.service_ids))));
        }

        if let Some(rating) = criteria.min_rating {
            filters.push(("rating".to_string(), format!("gte.{}", rating)));
        }
        if let Some(min) = criteria.min_rate {
            filters.push(("hourly_rate".to_string(), format!("gte.{}", min)));
        }
        if let Some(max) = criteria.max_rate {
            filters.push(("hourly_rate".to_string(), format!("lte.{}", max)));
        }

        push_bounding_box(&mut filters, criteria);

        filters.push(("order".to_string(), "rating.desc.nullslast,id.asc".to_string()));
        filters
    }
}

#[async_trait]
impl CandidateRepository for SupabaseClient {
    async fn fetch_candidate_jobs(&self, criteria: &SearchCriteria) -> Result<Vec<Job>, RepositoryError> {
        let filters = self.job_filters(criteria);
        self.select_all(&self.tables.jobs, &filters).await
    }

    async fn fetch_candidate_workers(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Worker>, RepositoryError> {
        let filters = self.worker_filters(criteria);
        self.select_all(&self.tables.workers, &filters).await
    }
}

/// Bounding box pre-filter, only for explicit coordinates with a radius
///
/// Geocoded targets are resolved later by the engine, so text locations
/// fetch without a box.
fn push_bounding_box(filters: &mut Vec<(String, String)>, criteria: &SearchCriteria) {
    let (Some(center), Some(radius_km)) = (criteria.coordinates, criteria.max_distance_km) else {
        return;
    };

    let bbox = calculate_bounding_box(center.latitude, center.longitude, radius_km);
    filters.push(("latitude".to_string(), format!("gte.{}", bbox.min_lat)));
    filters.push(("latitude".to_string(), format!("lte.{}", bbox.max_lat)));
    filters.push(("longitude".to_string(), format!("gte.{}", bbox.min_lon)));
    filters.push(("longitude".to_string(), format!("lte.{}", bbox.max_lon)));
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",")
}

fn urgency_value(urgency: Urgency) -> &'static str {
    match urgency {
        Urgency::Low => "low",
        Urgency::Medium => "medium",
        Urgency::High => "high",
        Urgency::Urgent => "urgent",
    }
}
