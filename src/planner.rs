//! Waypoint insertion and deletion planning.
//!
//! Pure functions: they return a plan (an index, or a new point sequence)
//! and never touch the caller's route. The route order inside a
//! [`crate::Hike`] is only ever changed by applying these plans.

use crate::error::{Result, RoutePlanError};
use crate::geo_utils::segment_distance;
use crate::{Coordinate, HikePoint};

/// Decide where a new coordinate belongs in an existing route.
///
/// With `at_end` set, or with fewer than 2 existing points, the answer is
/// simply the end of the route. Otherwise every consecutive segment is
/// scanned; the new point goes right after the left endpoint of the segment
/// with the smallest geodesic distance to the coordinate's projection. Ties
/// are broken by the first segment scanned.
///
/// Precondition: points already saved (index >= 0) must appear in strictly
/// ascending index order. A violation means an upstream logic error and
/// yields [`RoutePlanError::InvalidInsertion`].
pub fn plan_insertion(
    existing: &[HikePoint],
    new_coordinate: Coordinate,
    at_end: bool,
) -> Result<usize> {
    check_index_order(existing)?;

    if at_end || existing.len() < 2 {
        return Ok(existing.len());
    }

    let mut best_segment = 0usize;
    let mut best_distance = f64::INFINITY;

    for (i, pair) in existing.windows(2).enumerate() {
        let distance = segment_distance(
            new_coordinate,
            pair[0].coordinate(),
            pair[1].coordinate(),
        );
        if distance < best_distance {
            best_distance = distance;
            best_segment = i;
        }
    }

    Ok(best_segment + 1)
}

/// Remove the point at `index`, returning the new sequence.
///
/// No re-indexing is performed; indices are finalized by renumbering at save
/// time.
pub fn plan_deletion(points: &[HikePoint], index: usize) -> Result<Vec<HikePoint>> {
    if index >= points.len() {
        return Err(RoutePlanError::internal(format!(
            "delete index {} out of bounds ({} points)",
            index,
            points.len()
        )));
    }

    let mut updated = points.to_vec();
    updated.remove(index);
    Ok(updated)
}

/// Saved indices must be strictly ascending and unique; unsaved points
/// (index -1) are exempt until renumbering.
fn check_index_order(points: &[HikePoint]) -> Result<()> {
    let mut previous: Option<i32> = None;
    for point in points {
        if point.index < 0 {
            continue;
        }
        if let Some(prev) = previous {
            if point.index <= prev {
                return Err(RoutePlanError::InvalidInsertion {
                    message: format!(
                        "point indices not in ascending unique order ({} after {})",
                        point.index, prev
                    ),
                });
            }
        }
        previous = Some(point.index);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> Vec<HikePoint> {
        vec![
            HikePoint::new(0.0, 0.0, 0.0),
            HikePoint::new(0.0, 1.0, 0.0),
            HikePoint::new(0.0, 2.0, 0.0),
        ]
    }

    #[test]
    fn test_insertion_picks_nearest_segment() {
        // Clearly closer to the second segment (B-C) than the first.
        let coord = Coordinate::new(0.1, 1.7);
        assert_eq!(plan_insertion(&route(), coord, false).unwrap(), 2);
    }

    #[test]
    fn test_insertion_tie_prefers_lower_segment() {
        // Equidistant from both segments: both projections land on B.
        let coord = Coordinate::new(1.0, 1.0);
        assert_eq!(plan_insertion(&route(), coord, false).unwrap(), 1);
    }

    #[test]
    fn test_insertion_at_end_appends() {
        let coord = Coordinate::new(0.1, 1.7);
        assert_eq!(plan_insertion(&route(), coord, true).unwrap(), 3);
    }

    #[test]
    fn test_insertion_short_route_appends() {
        let one = [HikePoint::new(0.0, 0.0, 0.0)];
        assert_eq!(plan_insertion(&one, Coordinate::new(5.0, 5.0), false).unwrap(), 1);
        assert_eq!(plan_insertion(&[], Coordinate::new(5.0, 5.0), false).unwrap(), 0);
    }

    #[test]
    fn test_insertion_rejects_unordered_indices() {
        let mut points = route();
        points[0].index = 2;
        points[1].index = 1;
        points[2].index = 3;

        let err = plan_insertion(&points, Coordinate::new(0.0, 0.5), false).unwrap_err();
        assert!(matches!(err, RoutePlanError::InvalidInsertion { .. }));
    }

    #[test]
    fn test_insertion_rejects_duplicate_indices() {
        let mut points = route();
        points[0].index = 0;
        points[1].index = 0;

        assert!(plan_insertion(&points, Coordinate::new(0.0, 0.5), false).is_err());
    }

    #[test]
    fn test_insertion_allows_unsaved_points() {
        let mut points = route();
        points[0].index = 0;
        // points[1] stays at -1 (not yet saved)
        points[2].index = 1;

        assert!(plan_insertion(&points, Coordinate::new(0.1, 1.7), false).is_ok());
    }

    #[test]
    fn test_deletion_preserves_remaining_order() {
        let updated = plan_deletion(&route(), 1).unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].longitude, 0.0);
        assert_eq!(updated[1].longitude, 2.0);
    }

    #[test]
    fn test_deletion_does_not_renumber() {
        let mut points = route();
        points[0].index = 0;
        points[1].index = 1;
        points[2].index = 2;

        let updated = plan_deletion(&points, 0).unwrap();
        assert_eq!(updated[0].index, 1);
    }

    #[test]
    fn test_deletion_out_of_bounds() {
        assert!(plan_deletion(&route(), 3).is_err());
    }
}
