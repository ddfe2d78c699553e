use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Lower bound on the length of one degree of latitude (true value ≈ 111.19km).
/// Underestimating it widens the box, which keeps the box conservative.
const KM_PER_DEGREE: f64 = 111.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// NaN inputs propagate to the result; coordinates are validated at batch entry.
#[inline]
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box containing every point within `radius_km` of `center`
///
/// The box is only a pre-filter: exact containment is re-checked with
/// [`haversine_distance`], so it may be too large but never too small.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude), where the
/// latitude used is the one closest to the pole inside the box.
///
/// When the box reaches a pole or crosses the antimeridian it falls back to
/// the full longitude range.
pub fn calculate_bounding_box(center: Coordinate, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let min_lat = center.lat - lat_delta;
    let max_lat = center.lat + lat_delta;

    if min_lat <= -90.0 || max_lat >= 90.0 {
        return BoundingBox {
            min_lat: min_lat.max(-90.0),
            max_lat: max_lat.min(90.0),
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    // Longitude degrees shrink toward the poles, so size the box for its poleward edge
    let poleward_lat = min_lat.abs().max(max_lat.abs());
    let lon_delta = radius_km / (KM_PER_DEGREE * poleward_lat.to_radians().cos());
    let min_lon = center.lon - lon_delta;
    let max_lon = center.lon + lon_delta;

    if !lon_delta.is_finite() || min_lon < -180.0 || max_lon > 180.0 {
        return BoundingBox {
            min_lat,
            max_lat,
            min_lon: -180.0,
            max_lon: 180.0,
        };
    }

    BoundingBox {
        min_lat,
        max_lat,
        min_lon,
        max_lon,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(point: Coordinate, bbox: &BoundingBox) -> bool {
    bbox.contains(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london = Coordinate::new(51.5074, -0.1278);
        let paris = Coordinate::new(48.8566, 2.3522);

        let distance = haversine_distance(london, paris);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_haversine_small_offset() {
        // 0.001° of longitude at the equator is ~111m
        let distance = haversine_distance(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 0.001));
        assert!((distance - 0.1112).abs() < 0.001, "got {}", distance);
    }

    #[test]
    fn test_haversine_nan_propagates() {
        let distance = haversine_distance(Coordinate::new(f64::NAN, 0.0), Coordinate::new(0.0, 0.0));
        assert!(distance.is_nan());
    }

    #[test]
    fn test_bounding_box() {
        let center = Coordinate::new(40.7128, -74.0060);
        let bbox = calculate_bounding_box(center, 10.0);

        assert!(bbox.min_lat < center.lat);
        assert!(bbox.max_lat > center.lat);
        assert!(bbox.min_lon < center.lon);
        assert!(bbox.max_lon > center.lon);

        // Check approximate size (20km / 111km per degree = ~0.18 degrees)
        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }

    #[test]
    fn test_bounding_box_contains_circle_edge() {
        let center = Coordinate::new(60.0, 10.0);
        let radius = 5.0;
        let bbox = calculate_bounding_box(center, radius);

        // Walk points at the circle edge and make sure none escapes the box
        for step in 0..360 {
            let bearing = (step as f64).to_radians();
            let d = radius / EARTH_RADIUS_KM;
            let lat1 = center.lat.to_radians();
            let lon1 = center.lon.to_radians();
            let lat2 = (lat1.sin() * d.cos() + lat1.cos() * d.sin() * bearing.cos()).asin();
            let lon2 = lon1
                + (bearing.sin() * d.sin() * lat1.cos()).atan2(d.cos() - lat1.sin() * lat2.sin());
            let point = Coordinate::new(lat2.to_degrees(), lon2.to_degrees());
            assert!(is_within_bounding_box(point, &bbox), "escaped at bearing {}", step);
        }
    }

    #[test]
    fn test_bounding_box_near_pole_spans_all_longitudes() {
        let bbox = calculate_bounding_box(Coordinate::new(89.995, 45.0), 1.0);
        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, 180.0);
    }

    #[test]
    fn test_bounding_box_across_antimeridian() {
        let bbox = calculate_bounding_box(Coordinate::new(0.0, 179.999), 1.0);
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, 180.0);
        assert!(is_within_bounding_box(Coordinate::new(0.0, -179.999), &bbox));
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(Coordinate::new(40.7128, -74.0060), 10.0);

        assert!(is_within_bounding_box(Coordinate::new(40.7128, -74.0060), &bbox));
        assert!(is_within_bounding_box(Coordinate::new(40.71, -74.0), &bbox));
        assert!(!is_within_bounding_box(Coordinate::new(50.0, -80.0), &bbox));
    }
}
