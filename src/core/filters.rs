use chrono::{DateTime, Months, TimeDelta, Utc};
use uuid::Uuid;

use crate::core::distance::distance_between;
use crate::core::skills::{has_any_skill, normalize_skill_set, skill_match_score_with, SkillMatcher};
use crate::models::{Coordinate, DatePosted, Job, Urgency, Worker};

/// Outcome of the geo-filter for one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeoVerdict {
    /// Outside the radius, or no coordinates while a radius is active
    Excluded,
    /// Kept, with the distance to the target when both points are known
    Included(Option<f64>),
}

/// Geo-filter and distance annotation
///
/// Without a target nothing is filtered or annotated. With a target and a
/// radius, candidates lacking coordinates are excluded rather than given the
/// benefit of the doubt.
#[inline]
pub fn apply_geo_filter(
    candidate: Option<Coordinate>,
    target: Option<Coordinate>,
    max_distance_km: Option<f64>,
) -> GeoVerdict {
    let Some(target) = target else {
        return GeoVerdict::Included(None);
    };

    match (candidate, max_distance_km) {
        (Some(point), max) => {
            let distance = distance_between(target, point);
            match max {
                Some(max) if distance > max => GeoVerdict::Excluded,
                _ => GeoVerdict::Included(Some(distance)),
            }
        }
        (None, Some(_)) => GeoVerdict::Excluded,
        (None, None) => GeoVerdict::Included(None),
    }
}

/// Check a service against the requested set; an empty set accepts all
#[inline]
pub fn matches_service(service_id: Option<Uuid>, requested: &[Uuid]) -> bool {
    requested.is_empty() || service_id.is_some_and(|id| requested.contains(&id))
}

/// Budget range overlap
///
/// A job matches when its range intersects the requested one, so a wide
/// job budget can satisfy a narrow filter and the other way round.
#[inline]
pub fn budget_overlaps(job: &Job, min_budget: Option<f64>, max_budget: Option<f64>) -> bool {
    if let Some(min) = min_budget {
        if job.budget_max < min {
            return false;
        }
    }
    if let Some(max) = max_budget {
        if job.budget_min > max {
            return false;
        }
    }
    true
}

#[inline]
pub fn matches_urgency(urgency: Urgency, requested: &[Urgency]) -> bool {
    requested.is_empty() || requested.contains(&urgency)
}

/// Posted-date window relative to `now`
///
/// `Today` compares UTC calendar days, `Week` is the trailing seven days and
/// `Month` the trailing calendar month.
pub fn within_date_window(created_at: DateTime<Utc>, window: DatePosted, now: DateTime<Utc>) -> bool {
    match window {
        DatePosted::Any => true,
        DatePosted::Today => created_at.date_naive() == now.date_naive(),
        DatePosted::Week => created_at >= now - TimeDelta::days(7),
        DatePosted::Month => {
            let start = now
                .checked_sub_months(Months::new(1))
                .unwrap_or(DateTime::<Utc>::MIN_UTC);
            created_at >= start
        }
    }
}

/// Case-insensitive substring search across several fields
///
/// A missing or blank query matches everything.
pub fn matches_text_query<'a>(
    query: Option<&str>,
    fields: impl IntoIterator<Item = &'a str>,
) -> bool {
    let needle = match query.map(|q| q.trim().to_lowercase()) {
        Some(needle) if !needle.is_empty() => needle,
        _ => return true,
    };

    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Required-skills filter for jobs
///
/// Jobs without stated requirements are open to everyone. Otherwise the
/// caller's skills must satisfy at least one requirement.
pub fn job_matches_skills(
    job_required: &[String],
    caller_skills: &[String],
    matcher: &dyn SkillMatcher,
) -> bool {
    if normalize_skill_set(job_required).is_empty() || normalize_skill_set(caller_skills).is_empty() {
        return true;
    }

    skill_match_score_with(matcher, caller_skills, job_required) > 0.0
}

#[inline]
pub fn job_matches_query(job: &Job, query: Option<&str>) -> bool {
    matches_text_query(
        query,
        std::iter::once(job.title.as_str()).chain(job.description.as_deref()),
    )
}

#[inline]
pub fn is_available(worker: &Worker) -> bool {
    worker.is_available
}

/// Rating floor; unrated workers fail any explicit floor
#[inline]
pub fn meets_rating_floor(worker: &Worker, min_rating: Option<f64>) -> bool {
    match min_rating {
        None => true,
        Some(floor) => worker.rating.is_some_and(|rating| rating >= floor),
    }
}

/// Hourly rate bounds; workers without a rate fail any explicit bound
#[inline]
pub fn within_rate_range(worker: &Worker, min_rate: Option<f64>, max_rate: Option<f64>) -> bool {
    if min_rate.is_none() && max_rate.is_none() {
        return true;
    }

    let Some(rate) = worker.hourly_rate else {
        return false;
    };

    min_rate.map_or(true, |min| rate >= min) && max_rate.map_or(true, |max| rate <= max)
}

#[inline]
pub fn offers_service(worker: &Worker, requested: &[Uuid]) -> bool {
    requested.is_empty() || worker.service_ids.iter().any(|id| requested.contains(id))
}

/// Free-text search over name, profession and service names
pub fn worker_matches_query(worker: &Worker, query: Option<&str>) -> bool {
    let fields = std::iter::once(worker.full_name.as_str())
        .chain(worker.profession.as_deref())
        .chain(worker.service_names.iter().map(String::as_str));

    matches_text_query(query, fields)
}

/// Skills filter for workers: any requested skill will do
#[inline]
pub fn worker_has_any_skill(worker: &Worker, requested: &[String]) -> bool {
    has_any_skill(&worker.skills, requested)
}
