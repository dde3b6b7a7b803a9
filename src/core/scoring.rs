use crate::core::skills::{skill_match_score_with, ContainmentMatcher, SkillMatcher};
use crate::models::{RelevanceScore, Worker};

/// Weight of the skill overlap in the composite relevance score
pub const SKILL_WEIGHT: f64 = 0.5;
/// Weight of years of experience in the composite relevance score
pub const EXPERIENCE_WEIGHT: f64 = 0.3;
/// Weight of the star rating in the composite relevance score
pub const RATING_WEIGHT: f64 = 0.2;

/// Years of experience at which the experience score saturates
pub const EXPERIENCE_CAP_YEARS: f64 = 10.0;

const MIN_STARS: f64 = 1.0;
const MAX_STARS: f64 = 5.0;

/// Calculate the composite relevance (0-1) of a worker for a skill set
///
/// Scoring formula:
/// total = (
///     skill_match_score * 0.5 +     # share of required skills covered
///     experience_score * 0.3 +      # years / 10, capped at 1
///     rating_score * 0.2            # 1-5 stars mapped onto 0-1
/// )
pub fn relevance_score(worker: &Worker, required_skills: &[String]) -> RelevanceScore {
    relevance_score_with(&ContainmentMatcher, worker, required_skills)
}

/// [`relevance_score`] with an explicit skill matching strategy
pub fn relevance_score_with(
    matcher: &dyn SkillMatcher,
    worker: &Worker,
    required_skills: &[String],
) -> RelevanceScore {
    let skill_match_score = skill_match_score_with(matcher, &worker.skills, required_skills);
    let experience_score = calculate_experience_score(worker.years_experience);
    let rating_score = calculate_rating_score(worker.rating);

    RelevanceScore {
        total: combine(skill_match_score, experience_score, rating_score),
        skill_match_score,
        experience_score,
        rating_score,
    }
}

/// Weighted combination of the three sub-scores
#[inline]
pub fn combine(skill_match_score: f64, experience_score: f64, rating_score: f64) -> f64 {
    let total = skill_match_score * SKILL_WEIGHT
        + experience_score * EXPERIENCE_WEIGHT
        + rating_score * RATING_WEIGHT;

    total.clamp(0.0, 1.0)
}

/// Calculate experience score (0-1)
/// Linear ramp that saturates at ten years; unknown experience counts as none
#[inline]
pub fn calculate_experience_score(years_experience: Option<u32>) -> f64 {
    let years = years_experience.unwrap_or(0) as f64;
    (years / EXPERIENCE_CAP_YEARS).min(1.0)
}

/// Calculate rating score (0-1) on a 1-5 star scale
/// Unrated workers score zero here, but stay distinguishable via `Worker::rating`
#[inline]
pub fn calculate_rating_score(rating: Option<f64>) -> f64 {
    match rating {
        Some(stars) if stars.is_finite() => {
            ((stars - MIN_STARS) / (MAX_STARS - MIN_STARS)).clamp(0.0, 1.0)
        }
        _ => 0.0,
    }
}
