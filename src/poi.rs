//! Point-of-interest matching along a route.
//!
//! A candidate is "near" when any route segment puts its projection within
//! the threshold, measured geodesically. Scanning stops at the first
//! qualifying segment. Matched candidates are classified by the provider's
//! type identifier and deduplicated on a coordinate key rounded to 5 decimal
//! places (about 1.1 m), the same trick the provider uses for duplicate
//! listings of one physical site.

use std::collections::HashSet;

use log::debug;

use crate::geo_utils::segment_distance;
use crate::providers::RawPoi;
use crate::{HikePoint, Poi, PoiKind};

/// Provider type identifier denoting a water point; every other matched
/// type is treated as a refuge.
pub const WATER_POINT_TYPE_ID: i64 = 23;

/// Default nearness threshold in meters.
pub const DEFAULT_POI_THRESHOLD_M: f64 = 1000.0;

/// POIs near the route, partitioned by kind, in candidate insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiMatches {
    pub refuges: Vec<Poi>,
    pub water_points: Vec<Poi>,
}

impl PoiMatches {
    pub fn is_empty(&self) -> bool {
        self.refuges.is_empty() && self.water_points.is_empty()
    }
}

/// Match candidates against the route within `threshold_m` meters.
///
/// Empty route or empty candidate list yields empty matches, not an error.
pub fn match_pois(route: &[HikePoint], candidates: &[RawPoi], threshold_m: f64) -> PoiMatches {
    let near: Vec<&RawPoi> = candidates
        .iter()
        .filter(|poi| is_near_route(poi, route, threshold_m))
        .collect();
    collect_matches(near, candidates.len())
}

/// Parallel variant of [`match_pois`] for large candidate sets.
///
/// Nearness checks run in parallel; classification and dedup stay a single
/// ordered pass, so output is identical to the sequential version.
#[cfg(feature = "parallel")]
pub fn match_pois_parallel(
    route: &[HikePoint],
    candidates: &[RawPoi],
    threshold_m: f64,
) -> PoiMatches {
    use rayon::prelude::*;

    let near: Vec<&RawPoi> = candidates
        .par_iter()
        .filter(|poi| is_near_route(poi, route, threshold_m))
        .collect();
    collect_matches(near, candidates.len())
}

/// True if any route segment is within `threshold_m` of the candidate.
/// Stops at the first qualifying segment.
fn is_near_route(poi: &RawPoi, route: &[HikePoint], threshold_m: f64) -> bool {
    let coordinate = poi.coordinate();
    route.windows(2).any(|pair| {
        segment_distance(coordinate, pair[0].coordinate(), pair[1].coordinate()) < threshold_m
    })
}

fn collect_matches(near: Vec<&RawPoi>, candidate_count: usize) -> PoiMatches {
    let mut seen: HashSet<(i64, i64)> = HashSet::new();
    let mut matches = PoiMatches::default();

    for raw in near {
        if !seen.insert(coordinate_key(raw)) {
            continue;
        }

        let kind = if raw.type_id == WATER_POINT_TYPE_ID {
            PoiKind::WaterPoint
        } else {
            PoiKind::Refuge
        };

        let poi = Poi {
            name: raw.name.clone(),
            link: raw.link.clone(),
            kind,
            coordinate: raw.coordinate(),
        };

        match kind {
            PoiKind::Refuge => matches.refuges.push(poi),
            PoiKind::WaterPoint => matches.water_points.push(poi),
        }
    }

    debug!(
        "POI match: {} candidates -> {} refuges, {} water points",
        candidate_count,
        matches.refuges.len(),
        matches.water_points.len()
    );

    matches
}

/// Coordinate rounded to 5 decimal places, as an integer pair.
fn coordinate_key(poi: &RawPoi) -> (i64, i64) {
    (
        (poi.latitude * 1e5).round() as i64,
        (poi.longitude * 1e5).round() as i64,
    )
}
