use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate length of one degree of latitude in kilometers
const KM_PER_DEGREE: f64 = 111.0;

#[inline]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Great-circle distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = degrees_to_radians(lat1);
    let lat2_rad = degrees_to_radians(lat2);
    let delta_lat = degrees_to_radians(lat2 - lat1);
    let delta_lon = degrees_to_radians(lon2 - lon1);

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine distance between two coordinates in kilometers
#[inline]
pub fn distance_between(from: Coordinate, to: Coordinate) -> f64 {
    haversine_distance(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Calculate a bounding box around a center point
///
/// Used to narrow the broad fetch from the backend before the exact
/// Haversine check runs in memory.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
///
/// # Arguments
/// * `lat` - Center latitude in degrees
/// * `lon` - Center longitude in degrees
/// * `radius_km` - Radius in kilometers
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;

    // Near the poles every longitude is within reach
    let cos_lat = degrees_to_radians(lat).cos().abs();
    let lon_delta = if cos_lat < 1e-6 {
        180.0
    } else {
        radius_km / (KM_PER_DEGREE * cos_lat)
    };

    BoundingBox {
        min_lat: (lat - lat_delta).max(-90.0),
        max_lat: (lat + lat_delta).min(90.0),
        min_lon: (lon - lon_delta).max(-180.0),
        max_lon: (lon + lon_delta).min(180.0),
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(
    lat: f64,
    lon: f64,
    bbox: &BoundingBox,
) -> bool {
    lat >= bbox.min_lat
        && lat <= bbox.max_lat
        && lon >= bbox.min_lon
        && lon <= bbox.max_lon
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAIROBI: (f64, f64) = (-1.2921, 36.8219);
    const MOMBASA: (f64, f64) = (-4.0435, 39.6682);

    #[test]
    fn test_degrees_to_radians() {
        assert_eq!(degrees_to_radians(0.0), 0.0);
        assert!((degrees_to_radians(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((degrees_to_radians(-90.0) + std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_haversine_distance() {
        // Nairobi to Mombasa is roughly 440 km as the crow flies
        let distance = haversine_distance(NAIROBI.0, NAIROBI.1, MOMBASA.0, MOMBASA.1);
        assert!((distance - 440.0).abs() < 15.0, "Distance should be ~440km, got {}", distance);
    }

    #[test]
    fn test_haversine_zero_and_symmetric() {
        assert_eq!(haversine_distance(NAIROBI.0, NAIROBI.1, NAIROBI.0, NAIROBI.1), 0.0);

        let there = haversine_distance(NAIROBI.0, NAIROBI.1, MOMBASA.0, MOMBASA.1);
        let back = haversine_distance(MOMBASA.0, MOMBASA.1, NAIROBI.0, NAIROBI.1);
        assert!((there - back).abs() < 1e-9);
    }

    #[test]
    fn test_haversine_monotonic() {
        let mut previous = 0.0;
        for step in 1..=10 {
            let distance = haversine_distance(0.0, 0.0, 0.0, step as f64);
            assert!(distance > previous);
            previous = distance;
        }
    }

    #[test]
    fn test_antipodal_points() {
        let distance = haversine_distance(0.0, 0.0, 0.0, 180.0);
        assert!((distance - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn test_bounding_box() {
        let bbox = calculate_bounding_box(NAIROBI.0, NAIROBI.1, 10.0);

        assert!(bbox.min_lat < NAIROBI.0);
        assert!(bbox.max_lat > NAIROBI.0);
        assert!(bbox.min_lon < NAIROBI.1);
        assert!(bbox.max_lon > NAIROBI.1);

        // Check approximate size (20km / 111km per degree = ~0.18 degrees)
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_bounding_box_at_pole() {
        let bbox = calculate_bounding_box(90.0, 0.0, 50.0);

        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, 180.0);
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(NAIROBI.0, NAIROBI.1, 10.0);

        // Center point should be within
        assert!(is_within_bounding_box(NAIROBI.0, NAIROBI.1, &bbox));

        // Westlands, a few km away
        assert!(is_within_bounding_box(-1.2676, 36.8108, &bbox));

        assert!(!is_within_bounding_box(MOMBASA.0, MOMBASA.1, &bbox));
    }
}
