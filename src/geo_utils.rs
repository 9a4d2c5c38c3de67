//! Geographic primitives for route editing and POI matching.
//!
//! Projection is done in raw (lat, lng) pairs treated as a flat plane. That
//! is a short-segment approximation: adequate at hiking-route scales, and
//! never compared directly to a meter threshold. Every threshold comparison
//! goes through [`haversine_distance`], which is what scales results to
//! real-world meters.

use geo::{Distance, Haversine, Point};

use crate::error::{Result, RoutePlanError};
use crate::{Bounds, Coordinate, HikePoint};

/// Great-circle distance between two coordinates in meters.
#[inline]
pub fn haversine_distance(p: &Coordinate, q: &Coordinate) -> f64 {
    let a = Point::new(p.longitude, p.latitude);
    let b = Point::new(q.longitude, q.latitude);
    Haversine::distance(a, b)
}

/// Orthogonal projection of `p` onto the line through `a` and `b`, clamped
/// to the segment. The degenerate segment `a == b` returns `a`.
///
/// Planar approximation: inputs and output are raw (lat, lng) treated as
/// Euclidean coordinates. See the module docs for the precision bound.
pub fn project_point_on_segment(p: Coordinate, a: Coordinate, b: Coordinate) -> Coordinate {
    let abx = b.latitude - a.latitude;
    let aby = b.longitude - a.longitude;
    let apx = p.latitude - a.latitude;
    let apy = p.longitude - a.longitude;

    let ab2 = abx * abx + aby * aby;
    if ab2 == 0.0 {
        // Zero-length segment
        return a;
    }

    let t = ((apx * abx + apy * aby) / ab2).clamp(0.0, 1.0);

    Coordinate::new(a.latitude + t * abx, a.longitude + t * aby)
}

/// Geodesic distance in meters from `p` to its clamped projection on the
/// segment `[a, b]`. The threshold primitive shared by the insertion planner
/// and the POI matcher.
#[inline]
pub fn segment_distance(p: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let projection = project_point_on_segment(p, a, b);
    haversine_distance(&p, &projection)
}

/// Total length of a point sequence in meters (summed haversine over
/// consecutive points). Fewer than 2 points yields 0.0.
pub fn polyline_length(points: &[HikePoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0].coordinate(), &w[1].coordinate()))
        .sum()
}

/// Bounding box over the full point sequence.
///
/// An empty input has no defined box and is an error; callers that only use
/// the box to scope a POI query should skip the query instead of failing.
pub fn bounding_box(points: &[HikePoint]) -> Result<Bounds> {
    Bounds::from_points(points).ok_or(RoutePlanError::UndefinedBoundingBox)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn test_haversine_distance_same_point() {
        let p = Coordinate::new(45.9, 6.85);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_haversine_distance_known_value() {
        // Annecy to Chamonix is roughly 53 km
        let annecy = Coordinate::new(45.8992, 6.1294);
        let chamonix = Coordinate::new(45.9237, 6.8694);
        let dist = haversine_distance(&annecy, &chamonix);
        assert!(approx_eq(dist, 57_400.0, 2_000.0));
    }

    #[test]
    fn test_projection_idempotent_on_segment() {
        let a = Coordinate::new(45.0, 6.0);
        let b = Coordinate::new(45.0, 7.0);
        let p = Coordinate::new(45.0, 6.4);

        let q = project_point_on_segment(p, a, b);
        assert!(approx_eq(q.latitude, p.latitude, 1e-12));
        assert!(approx_eq(q.longitude, p.longitude, 1e-12));
    }

    #[test]
    fn test_projection_degenerate_segment_returns_a() {
        let a = Coordinate::new(45.0, 6.0);
        let p = Coordinate::new(46.5, 7.5);
        assert_eq!(project_point_on_segment(p, a, a), a);
    }

    #[test]
    fn test_projection_clamps_to_endpoints() {
        let a = Coordinate::new(45.0, 6.0);
        let b = Coordinate::new(45.0, 7.0);

        let before = project_point_on_segment(Coordinate::new(45.2, 5.0), a, b);
        assert_eq!(before, a);

        let after = project_point_on_segment(Coordinate::new(44.8, 8.0), a, b);
        assert_eq!(after, b);
    }

    #[test]
    fn test_projection_drops_perpendicular() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 2.0);
        let q = project_point_on_segment(Coordinate::new(1.0, 1.0), a, b);
        assert!(approx_eq(q.latitude, 0.0, 1e-12));
        assert!(approx_eq(q.longitude, 1.0, 1e-12));
    }

    #[test]
    fn test_polyline_length() {
        let points = vec![
            HikePoint::new(45.0, 6.0, 0.0),
            HikePoint::new(45.0, 6.01, 0.0),
            HikePoint::new(45.01, 6.01, 0.0),
        ];
        let length = polyline_length(&points);
        // ~780m east then ~1.1km north
        assert!(length > 1_500.0 && length < 2_500.0);
        assert_eq!(polyline_length(&points[..1]), 0.0);
    }

    #[test]
    fn test_bounding_box() {
        let points = vec![
            HikePoint::new(1.0, 1.0, 0.0),
            HikePoint::new(3.0, 2.0, 0.0),
            HikePoint::new(2.0, 5.0, 0.0),
        ];
        let bounds = bounding_box(&points).unwrap();
        assert_eq!(bounds.min(), Coordinate::new(1.0, 1.0));
        assert_eq!(bounds.max(), Coordinate::new(3.0, 5.0));
    }

    #[test]
    fn test_bounding_box_empty_is_undefined() {
        assert_eq!(
            bounding_box(&[]).unwrap_err(),
            RoutePlanError::UndefinedBoundingBox
        );
    }
}
