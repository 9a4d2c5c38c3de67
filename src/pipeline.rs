//! One-shot route recompute pipeline.
//!
//! Each user edit runs the same sequence: routed path from the provider,
//! geometry decode, summary, bounding box, POI fetch, threshold match. The
//! pipeline is a pure composition over the provider seams; serialization of
//! concurrent edits is the coordinator's job ([`crate::engine`]).

use log::{debug, warn};

use crate::error::{Result, RoutePlanError};
use crate::providers::{PoiProvider, RoutingProvider};
use crate::{geo_utils, planner, summary};
use crate::{Bounds, Coordinate, Hike, HikePoint, Poi, RouteSummary};

#[cfg(not(feature = "parallel"))]
use crate::poi::match_pois;

#[cfg(feature = "parallel")]
use crate::poi::match_pois_parallel as match_pois;

/// Knobs for a single recompute.
#[derive(Debug, Clone)]
pub struct RecomputeOptions {
    /// POI nearness threshold in meters
    pub poi_threshold_m: f64,
    /// Ask the renderer to fit the viewport to the new route
    pub zoom_to_fit: bool,
    /// Request elevation from the polyline decoder
    pub include_elevation: bool,
}

impl Default for RecomputeOptions {
    fn default() -> Self {
        Self {
            poi_threshold_m: crate::poi::DEFAULT_POI_THRESHOLD_M,
            zoom_to_fit: false,
            include_elevation: true,
        }
    }
}

/// Result of one completed recompute.
#[derive(Debug, Clone, Default)]
pub struct RouteUpdate {
    /// Dense routed path (decoded provider geometry)
    pub points: Vec<HikePoint>,
    pub summary: RouteSummary,
    pub refuges: Vec<Poi>,
    pub water_points: Vec<Poi>,
    /// Viewport hint, populated when the caller asked to zoom to fit
    pub fit_bounds: Option<Bounds>,
}

/// Run the full recompute pipeline for the given waypoints.
///
/// Fewer than 2 waypoints short-circuits to a pass-through update (the
/// waypoints themselves, a zeroed summary, no POIs) without touching any
/// provider. An empty routed path skips POI lookup rather than failing.
///
/// Errors never leave partial state behind: the caller only applies a
/// returned `RouteUpdate`, so a failed recompute leaves the previous
/// route/summary/POI lists intact.
pub async fn recompute_route<R, P>(
    routing: &R,
    pois: &P,
    waypoints: &[HikePoint],
    options: &RecomputeOptions,
) -> Result<RouteUpdate>
where
    R: RoutingProvider + ?Sized,
    P: PoiProvider + ?Sized,
{
    if let Some(bad) = waypoints.iter().find(|p| !p.coordinate().is_valid()) {
        // Pass-through by policy: coordinates are never rejected here.
        warn!(
            "Waypoint ({}, {}) outside WGS84 bounds, passing through",
            bad.latitude, bad.longitude
        );
    }

    if waypoints.len() < 2 {
        debug!("Recompute with {} waypoint(s): nothing to route", waypoints.len());
        return Ok(RouteUpdate {
            fit_bounds: fit_bounds(waypoints, options),
            points: waypoints.to_vec(),
            ..RouteUpdate::default()
        });
    }

    let coordinates: Vec<Coordinate> = waypoints.iter().map(HikePoint::coordinate).collect();
    let response = routing.get_route(&coordinates).await?;

    let points = response.geometry.into_points(options.include_elevation)?;
    let summary = match response.summary {
        Some(raw) => summary::from_provider(&raw),
        None => summary::compute_from_points(&points),
    };

    let matches = match geo_utils::bounding_box(&points) {
        Ok(bounds) => {
            let candidates = pois.pois_in_bbox(bounds.min(), bounds.max()).await?;
            match_pois(&points, &candidates, options.poi_threshold_m)
        }
        Err(RoutePlanError::UndefinedBoundingBox) => {
            debug!("Empty routed path, skipping POI lookup");
            Default::default()
        }
        Err(other) => return Err(other),
    };

    Ok(RouteUpdate {
        fit_bounds: fit_bounds(&points, options),
        points,
        summary,
        refuges: matches.refuges,
        water_points: matches.water_points,
    })
}

/// Decide where a user-placed coordinate belongs in the hike.
pub fn plan_add_point(hike: &Hike, coordinate: Coordinate, at_end: bool) -> Result<usize> {
    planner::plan_insertion(&hike.waypoints(), coordinate, at_end)
}

/// Plan removal of the waypoint at `index`.
pub fn plan_delete_point(hike: &Hike, index: usize) -> Result<Vec<HikePoint>> {
    planner::plan_deletion(&hike.waypoints(), index)
}

fn fit_bounds(points: &[HikePoint], options: &RecomputeOptions) -> Option<Bounds> {
    if options.zoom_to_fit {
        Bounds::from_points(points)
    } else {
        None
    }
}
