use chrono::{DateTime, Utc};

use crate::core::filters::{
    apply_geo_filter, budget_overlaps, job_matches_query, job_matches_skills, matches_service,
    matches_urgency, within_date_window, GeoVerdict,
};
use crate::core::ordering::{compare_metric, directed};
use crate::core::skills::{skill_match_score_with, SkillMatcher};
use crate::models::{Coordinate, Job, ScoredJob, SearchCriteria, SortKey, SortOrder};

/// Filter and rank job postings
///
/// # Pipeline Stages
/// 1. Attribute filters (open status, service, budget, urgency, date, text)
/// 2. Geo-filter against `target` with distance annotation
/// 3. Required-skills filter against the caller's skills
/// 4. Sorting
///
/// `target` is the already-resolved search coordinate; `None` disables the
/// geo stage entirely.
pub fn filter_and_rank_jobs(
    criteria: &SearchCriteria,
    target: Option<Coordinate>,
    jobs: Vec<Job>,
    matcher: &dyn SkillMatcher,
    now: DateTime<Utc>,
) -> Vec<ScoredJob> {
    let caller_skills = &criteria.required_skills;
    let score_skills = criteria.has_required_skills();
    let query = criteria.query.as_deref();

    let mut scored: Vec<ScoredJob> = jobs
        .into_iter()
        // Stage 1: attribute filters, closed jobs never surface
        .filter(|job| job.is_open())
        .filter(|job| matches_service(job.service_id, &criteria.service_ids))
        .filter(|job| budget_overlaps(job, criteria.min_budget, criteria.max_budget))
        .filter(|job| matches_urgency(job.urgency, &criteria.urgency))
        .filter(|job| within_date_window(job.created_at, criteria.date_posted, now))
        .filter(|job| job_matches_query(job, query))
        // Stage 2: geo-filter
        .filter_map(|job| {
            match apply_geo_filter(job.coordinate(), target, criteria.max_distance_km) {
                GeoVerdict::Excluded => None,
                GeoVerdict::Included(distance_km) => Some((job, distance_km)),
            }
        })
        // Stage 3: required skills
        .filter(|(job, _)| job_matches_skills(&job.required_skills, caller_skills, matcher))
        .map(|(job, distance_km)| {
            let skill_match_score = score_skills
                .then(|| skill_match_score_with(matcher, caller_skills, &job.required_skills));

            ScoredJob {
                candidate: job,
                distance_km,
                skill_match_score,
                relevance: None,
            }
        })
        .collect();

    // Stage 4: sort
    let key = effective_sort_key(criteria.sort_by, score_skills, target.is_some());
    let order = criteria.sort_order.unwrap_or_else(|| default_order(key));
    sort_jobs(&mut scored, key, order);

    scored
}

/// Sort key actually applied
///
/// Relevance needs caller skills and distance needs a target; both fall
/// back to date, as do keys that only make sense for workers.
pub fn effective_sort_key(requested: Option<SortKey>, has_skills: bool, has_target: bool) -> SortKey {
    match requested {
        Some(SortKey::Budget) => SortKey::Budget,
        Some(SortKey::Relevance) if has_skills => SortKey::Relevance,
        Some(SortKey::Distance) if has_target => SortKey::Distance,
        Some(other) if other != SortKey::Date => {
            tracing::debug!("Sort key {:?} not applicable to jobs, sorting by date", other);
            SortKey::Date
        }
        _ => SortKey::Date,
    }
}

fn default_order(key: SortKey) -> SortOrder {
    match key {
        SortKey::Distance => SortOrder::Asc,
        _ => SortOrder::Desc,
    }
}

/// Sort in place, breaking ties by newest first and then by id
pub fn sort_jobs(jobs: &mut [ScoredJob], key: SortKey, order: SortOrder) {
    jobs.sort_by(|a, b| {
        let primary = match key {
            SortKey::Budget => compare_metric(
                Some(a.candidate.budget_midpoint()),
                Some(b.candidate.budget_midpoint()),
                order,
            ),
            SortKey::Relevance => compare_metric(a.skill_match_score, b.skill_match_score, order),
            SortKey::Distance => compare_metric(a.distance_km, b.distance_km, order),
            _ => directed(a.candidate.created_at.cmp(&b.candidate.created_at), order),
        };

        primary
            .then_with(|| b.candidate.created_at.cmp(&a.candidate.created_at))
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });
}
