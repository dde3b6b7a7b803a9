// Unit tests for Kazi Match

use chrono::{TimeDelta, TimeZone, Utc};
use geo::{HaversineDistance, Point};
use kazi_match::core::{
    distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box},
    filters::{apply_geo_filter, budget_overlaps, within_date_window, GeoVerdict},
    scoring::relevance_score,
    skills::skill_match_score,
};
use kazi_match::models::{Coordinate, DatePosted, Job, JobStatus, SearchCriteria, Urgency, Worker};
use kazi_match::SearchError;
use uuid::Uuid;

const NAIROBI: (f64, f64) = (-1.2921, 36.8219);
const MOMBASA: (f64, f64) = (-4.0435, 39.6682);

fn skills(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn create_test_job(budget_min: f64, budget_max: f64) -> Job {
    Job {
        id: Uuid::new_v4(),
        customer_id: None,
        title: "Paint a two-bedroom flat".to_string(),
        description: None,
        service_id: None,
        status: JobStatus::Open,
        urgency: Urgency::Medium,
        budget_min,
        budget_max,
        location: None,
        latitude: None,
        longitude: None,
        required_skills: vec![],
        created_at: Utc::now(),
    }
}

fn create_test_worker(years: Option<u32>, rating: Option<f64>, worker_skills: &[&str]) -> Worker {
    Worker {
        id: Uuid::new_v4(),
        full_name: "Achieng Otieno".to_string(),
        profession: Some("Painter".to_string()),
        service_ids: vec![],
        service_names: vec![],
        hourly_rate: Some(500.0),
        rating,
        review_count: 12,
        years_experience: years,
        skills: skills(worker_skills),
        location: Some("Kilimani".to_string()),
        latitude: None,
        longitude: None,
        is_available: true,
    }
}

#[test]
fn test_haversine_identity_and_symmetry() {
    assert_eq!(haversine_distance(NAIROBI.0, NAIROBI.1, NAIROBI.0, NAIROBI.1), 0.0);

    let there = haversine_distance(NAIROBI.0, NAIROBI.1, MOMBASA.0, MOMBASA.1);
    let back = haversine_distance(MOMBASA.0, MOMBASA.1, NAIROBI.0, NAIROBI.1);
    assert!((there - back).abs() < 1e-9);
}

#[test]
fn test_haversine_agrees_with_geo_crate() {
    let ours = haversine_distance(NAIROBI.0, NAIROBI.1, MOMBASA.0, MOMBASA.1);

    // geo works in metres on a slightly larger mean radius
    let theirs = Point::new(NAIROBI.1, NAIROBI.0).haversine_distance(&Point::new(MOMBASA.1, MOMBASA.0)) / 1000.0;

    assert!((ours - theirs).abs() / theirs < 1e-4, "ours={} theirs={}", ours, theirs);
}

#[test]
fn test_bounding_box_contains_circle() {
    let bbox = calculate_bounding_box(NAIROBI.0, NAIROBI.1, 10.0);

    assert!(is_within_bounding_box(NAIROBI.0, NAIROBI.1, &bbox));
    assert!(!is_within_bounding_box(MOMBASA.0, MOMBASA.1, &bbox));

    // Roughly 0.18 degrees of latitude for a 10 km radius
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.18).abs() < 0.02);
}

#[test]
fn test_skill_match_score_edge_cases() {
    assert_eq!(skill_match_score(&[], &[]), 1.0);
    assert_eq!(skill_match_score(&skills(&["tiling"]), &[]), 1.0);
    assert_eq!(skill_match_score(&[], &skills(&["tiling"])), 0.0);
    assert_eq!(skill_match_score(&skills(&["Plumbing "]), &skills(&["plumbing"])), 1.0);
}

#[test]
fn test_budget_overlap() {
    let job = create_test_job(100.0, 200.0);

    assert!(budget_overlaps(&job, Some(150.0), Some(300.0)));
    assert!(!budget_overlaps(&job, Some(250.0), Some(300.0)));
    assert!(budget_overlaps(&job, None, None));
}

#[test]
fn test_date_posted_today() {
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0).unwrap();

    assert!(within_date_window(now - TimeDelta::hours(1), DatePosted::Today, now));
    assert!(!within_date_window(now - TimeDelta::hours(25), DatePosted::Today, now));
    assert!(within_date_window(now - TimeDelta::days(400), DatePosted::Any, now));
}

#[test]
fn test_geo_filter_excludes_missing_coordinates() {
    let target = Coordinate { latitude: NAIROBI.0, longitude: NAIROBI.1 };

    assert_eq!(apply_geo_filter(None, Some(target), Some(20_000.0)), GeoVerdict::Excluded);
    assert_eq!(apply_geo_filter(None, None, Some(10.0)), GeoVerdict::Included(None));
}

#[test]
fn test_relevance_perfect_worker() {
    let worker = create_test_worker(Some(10), Some(5.0), &["painting"]);

    let score = relevance_score(&worker, &skills(&["painting"]));

    assert!((score.total - 1.0).abs() < 1e-12);
    assert_eq!(score.skill_match_score, 1.0);
}

#[test]
fn test_relevance_unrated_worker() {
    let rated = relevance_score(&create_test_worker(Some(5), Some(1.0), &["painting"]), &[]);
    let unrated = relevance_score(&create_test_worker(Some(5), None, &["painting"]), &[]);

    assert_eq!(rated.rating_score, 0.0);
    assert_eq!(unrated.rating_score, 0.0);
    assert!(unrated.total >= 0.0 && unrated.total <= 1.0);
}

#[test]
fn test_criteria_bounds() {
    let inverted = SearchCriteria {
        min_rate: Some(900.0),
        max_rate: Some(100.0),
        ..Default::default()
    };
    assert!(matches!(inverted.validate_bounds(), Err(SearchError::InvalidCriteria(_))));

    let negative = SearchCriteria {
        max_distance_km: Some(-1.0),
        ..Default::default()
    };
    assert!(negative.validate_bounds().is_err());

    let rating = SearchCriteria {
        min_rating: Some(5.5),
        ..Default::default()
    };
    assert!(rating.validate_bounds().is_err());

    assert!(SearchCriteria::default().validate_bounds().is_ok());
}

#[test]
fn test_criteria_deserializes_camel_case() {
    let criteria: SearchCriteria = serde_json::from_str(
        r#"{
            "location": "Westlands",
            "maxDistance": 15,
            "minBudget": 500,
            "urgency": ["high", "urgent"],
            "datePosted": "week",
            "requiredSkills": ["painting"],
            "sortBy": "budget",
            "sortOrder": "asc"
        }"#,
    )
    .unwrap();

    assert_eq!(criteria.max_distance_km, Some(15.0));
    assert_eq!(criteria.min_budget, Some(500.0));
    assert_eq!(criteria.urgency, vec![Urgency::High, Urgency::Urgent]);
    assert_eq!(criteria.date_posted, DatePosted::Week);
    assert!(criteria.has_required_skills());
}

#[test]
fn test_offline_matcher_degrades_on_location_text() {
    let matcher = kazi_match::Matcher::offline();
    let criteria = SearchCriteria {
        location: Some("Kilimani".to_string()),
        max_distance_km: Some(5.0),
        ..Default::default()
    };

    let outcome = tokio_test::block_on(matcher.search_jobs(&criteria, vec![create_test_job(100.0, 200.0)])).unwrap();

    assert!(outcome.degraded);
    assert_eq!(outcome.results.len(), 1);
}
