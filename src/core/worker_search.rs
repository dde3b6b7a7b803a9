use crate::core::filters::{
    apply_geo_filter, is_available, meets_rating_floor, offers_service, within_rate_range,
    worker_has_any_skill, worker_matches_query, GeoVerdict,
};
use crate::core::ordering::compare_metric;
use crate::core::scoring::relevance_score_with;
use crate::core::skills::SkillMatcher;
use crate::models::{Coordinate, ScoredWorker, SearchCriteria, SortKey, SortOrder, Worker};

/// Filter and rank worker profiles
///
/// `ranking_skills` feeds the composite relevance score and may differ from
/// `criteria.required_skills`, which only drives the any-skill filter. A
/// plain search passes the criteria skills for both.
///
/// With a target and a radius the geo-filter is active and results come
/// back nearest first, whatever `sort_by` asks for. A target without a
/// radius only annotates distances.
pub fn filter_and_rank_workers(
    criteria: &SearchCriteria,
    ranking_skills: &[String],
    target: Option<Coordinate>,
    workers: Vec<Worker>,
    matcher: &dyn SkillMatcher,
) -> Vec<ScoredWorker> {
    let query = criteria.query.as_deref();

    let mut scored: Vec<ScoredWorker> = workers
        .into_iter()
        // Stage 1: profile filters
        .filter(|worker| is_available(worker))
        .filter(|worker| meets_rating_floor(worker, criteria.min_rating))
        .filter(|worker| within_rate_range(worker, criteria.min_rate, criteria.max_rate))
        .filter(|worker| offers_service(worker, &criteria.service_ids))
        .filter(|worker| worker_matches_query(worker, query))
        .filter(|worker| worker_has_any_skill(worker, &criteria.required_skills))
        // Stage 2: geo-filter
        .filter_map(|worker| {
            match apply_geo_filter(worker.coordinate(), target, criteria.max_distance_km) {
                GeoVerdict::Excluded => None,
                GeoVerdict::Included(distance_km) => Some((worker, distance_km)),
            }
        })
        // Stage 3: relevance
        .map(|(worker, distance_km)| {
            let relevance = relevance_score_with(matcher, &worker, ranking_skills);

            ScoredWorker {
                candidate: worker,
                distance_km,
                skill_match_score: Some(relevance.skill_match_score),
                relevance: Some(relevance),
            }
        })
        .collect();

    // Stage 4: sort, proximity wins once the geo-filter is active
    let (key, order) = if target.is_some() && criteria.max_distance_km.is_some() {
        (SortKey::Distance, SortOrder::Asc)
    } else {
        let key = effective_sort_key(criteria.sort_by, target.is_some());
        (key, criteria.sort_order.unwrap_or_else(|| default_order(key)))
    };
    sort_workers(&mut scored, key, order);

    scored
}

/// Sort key applied when the geo-filter is not forcing proximity
///
/// Distance needs a target; it and the job-only keys fall back to relevance.
pub fn effective_sort_key(requested: Option<SortKey>, has_target: bool) -> SortKey {
    match requested {
        Some(SortKey::Rating) => SortKey::Rating,
        Some(SortKey::Rate) => SortKey::Rate,
        Some(SortKey::Distance) if has_target => SortKey::Distance,
        _ => SortKey::Relevance,
    }
}

fn default_order(key: SortKey) -> SortOrder {
    match key {
        SortKey::Rate | SortKey::Distance => SortOrder::Asc,
        _ => SortOrder::Desc,
    }
}

/// Sort in place; ties go to higher relevance, then higher rating, then id
pub fn sort_workers(workers: &mut [ScoredWorker], key: SortKey, order: SortOrder) {
    workers.sort_by(|a, b| {
        let primary = match key {
            SortKey::Distance => compare_metric(a.distance_km, b.distance_km, order),
            SortKey::Rating => compare_metric(a.candidate.rating, b.candidate.rating, order),
            SortKey::Rate => compare_metric(a.candidate.hourly_rate, b.candidate.hourly_rate, order),
            _ => compare_metric(total(a), total(b), order),
        };

        primary
            .then_with(|| compare_metric(total(a), total(b), SortOrder::Desc))
            .then_with(|| compare_metric(a.candidate.rating, b.candidate.rating, SortOrder::Desc))
            .then_with(|| a.candidate.id.cmp(&b.candidate.id))
    });
}

#[inline]
fn total(worker: &ScoredWorker) -> Option<f64> {
    worker.relevance.map(|r| r.total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::skills::ContainmentMatcher;
    use uuid::Uuid;

    fn nairobi() -> Coordinate {
        Coordinate { latitude: -1.2921, longitude: 36.8219 }
    }

    fn create_worker(
        id: u128,
        rating: Option<f64>,
        years: Option<u32>,
        skills: &[&str],
        coordinate: Option<Coordinate>,
    ) -> Worker {
        Worker {
            id: Uuid::from_u128(id),
            full_name: format!("Worker {}", id),
            profession: Some("Fundi".to_string()),
            service_ids: vec![],
            service_names: vec![],
            hourly_rate: Some(100.0 * id as f64),
            rating,
            review_count: 1,
            years_experience: years,
            skills: skills.iter().map(|s| s.to_string()).collect(),
            location: None,
            latitude: coordinate.map(|c| c.latitude),
            longitude: coordinate.map(|c| c.longitude),
            is_available: true,
        }
    }

    fn ids(results: &[ScoredWorker]) -> Vec<u128> {
        results.iter().map(|r| r.candidate.id.as_u128()).collect()
    }

    #[test]
    fn test_default_ranking_by_relevance() {
        let workers = vec![
            create_worker(1, Some(3.0), Some(2), &["painting"], None),
            create_worker(2, Some(5.0), Some(10), &["painting"], None),
            create_worker(3, None, None, &["painting"], None),
        ];

        let results =
            filter_and_rank_workers(&SearchCriteria::default(), &[], None, workers, &ContainmentMatcher);

        assert_eq!(ids(&results), vec![2, 1, 3]);
        let top = results[0].relevance.unwrap();
        assert!((top.total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_geo_filter_sorts_by_distance() {
        let near = Coordinate { latitude: -1.30, longitude: 36.82 };
        let mid = Coordinate { latitude: -1.35, longitude: 36.85 };
        let far = Coordinate { latitude: -1.60, longitude: 37.00 };
        let workers = vec![
            create_worker(1, Some(5.0), Some(10), &[], Some(mid)),
            create_worker(2, Some(1.0), None, &[], Some(near)),
            create_worker(3, Some(5.0), Some(10), &[], Some(far)),
            create_worker(4, Some(5.0), Some(10), &[], None),
        ];
        let criteria = SearchCriteria {
            coordinates: Some(nairobi()),
            max_distance_km: Some(25.0),
            sort_by: Some(SortKey::Rating),
            ..Default::default()
        };

        let results =
            filter_and_rank_workers(&criteria, &[], Some(nairobi()), workers, &ContainmentMatcher);

        assert_eq!(ids(&results), vec![2, 1]);
        let distances: Vec<f64> = results.iter().filter_map(|r| r.distance_km).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_target_without_radius_keeps_requested_sort() {
        let near = Coordinate { latitude: -1.2922, longitude: 36.8219 };
        let far = Coordinate { latitude: -1.40, longitude: 36.90 };
        let workers = vec![
            create_worker(1, Some(5.0), Some(10), &[], Some(far)),
            create_worker(2, Some(1.0), None, &[], Some(near)),
        ];
        let mut criteria = SearchCriteria {
            coordinates: Some(nairobi()),
            ..Default::default()
        };

        let results =
            filter_and_rank_workers(&criteria, &[], Some(nairobi()), workers.clone(), &ContainmentMatcher);
        assert_eq!(ids(&results), vec![1, 2]);
        assert!(results.iter().all(|r| r.distance_km.is_some()));

        criteria.sort_by = Some(SortKey::Rate);
        criteria.sort_order = Some(SortOrder::Desc);
        let results = filter_and_rank_workers(&criteria, &[], Some(nairobi()), workers, &ContainmentMatcher);
        assert_eq!(ids(&results), vec![2, 1]);
    }

    #[test]
    fn test_skills_filter_is_any() {
        let workers = vec![
            create_worker(1, None, None, &["Plumbing"], None),
            create_worker(2, None, None, &["Electrical"], None),
            create_worker(3, None, None, &["Masonry"], None),
        ];
        let skills = vec!["plumbing".to_string(), "electrical ".to_string()];
        let criteria = SearchCriteria {
            required_skills: skills.clone(),
            ..Default::default()
        };

        let results = filter_and_rank_workers(&criteria, &skills, None, workers, &ContainmentMatcher);

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.skill_match_score == Some(0.5)));
    }

    #[test]
    fn test_rating_floor_excludes_unrated() {
        let workers = vec![
            create_worker(1, Some(4.8), None, &[], None),
            create_worker(2, None, None, &[], None),
            create_worker(3, Some(3.9), None, &[], None),
        ];
        let criteria = SearchCriteria {
            min_rating: Some(4.0),
            ..Default::default()
        };

        let results = filter_and_rank_workers(&criteria, &[], None, workers, &ContainmentMatcher);

        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn test_sort_by_rate() {
        let workers = vec![
            create_worker(3, None, None, &[], None),
            create_worker(1, None, None, &[], None),
            create_worker(2, None, None, &[], None),
        ];
        let mut criteria = SearchCriteria {
            sort_by: Some(SortKey::Rate),
            ..Default::default()
        };

        let results = filter_and_rank_workers(&criteria, &[], None, workers.clone(), &ContainmentMatcher);
        assert_eq!(ids(&results), vec![1, 2, 3]);

        criteria.sort_order = Some(SortOrder::Desc);
        let results = filter_and_rank_workers(&criteria, &[], None, workers, &ContainmentMatcher);
        assert_eq!(ids(&results), vec![3, 2, 1]);
    }

    #[test]
    fn test_unavailable_workers_are_excluded() {
        let mut busy = create_worker(2, Some(5.0), Some(10), &["painting"], None);
        busy.is_available = false;
        let workers = vec![create_worker(1, Some(3.0), None, &["painting"], None), busy];

        let results =
            filter_and_rank_workers(&SearchCriteria::default(), &[], None, workers, &ContainmentMatcher);

        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn test_rate_range_and_query() {
        let mut plumber = create_worker(5, None, None, &[], None);
        plumber.profession = Some("Plumber".to_string());
        let workers = vec![
            create_worker(1, None, None, &[], None),
            plumber,
            create_worker(9, None, None, &[], None),
        ];
        let criteria = SearchCriteria {
            query: Some("plumb".to_string()),
            min_rate: Some(200.0),
            max_rate: Some(600.0),
            ..Default::default()
        };

        let results = filter_and_rank_workers(&criteria, &[], None, workers, &ContainmentMatcher);

        assert_eq!(ids(&results), vec![5]);
    }

    #[test]
    fn test_effective_sort_key() {
        assert_eq!(effective_sort_key(None, true), SortKey::Relevance);
        assert_eq!(effective_sort_key(Some(SortKey::Budget), false), SortKey::Relevance);
        assert_eq!(effective_sort_key(Some(SortKey::Distance), false), SortKey::Relevance);
        assert_eq!(effective_sort_key(Some(SortKey::Distance), true), SortKey::Distance);
        assert_eq!(effective_sort_key(Some(SortKey::Rating), true), SortKey::Rating);
    }
}
