//! # Hike Planner
//!
//! Route-geometry engine for interactive hiking route planning.
//!
//! This library provides:
//! - Decoding of the routing provider's delta-encoded polylines (with elevation)
//! - Waypoint insertion planning (nearest-segment projection)
//! - Point-of-interest matching along a route (refuges, water points)
//! - Distance / ascent / descent summaries
//! - A single-concurrency edit coordinator that serializes recomputes
//!
//! ## Features
//!
//! - **`http`** - reqwest-based clients for the routing and POI providers
//! - **`parallel`** - parallel POI matching with rayon
//! - **`full`** - enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use hike_planner::{planner, Coordinate, Hike, HikePoint};
//!
//! let mut hike = Hike::from_points(
//!     1,
//!     "Tour du lac",
//!     vec![
//!         HikePoint::new(45.621093, 6.052332, 320.0),
//!         HikePoint::new(45.694522, 6.252326, 410.0),
//!         HikePoint::new(45.755622, 6.252326, 380.0),
//!     ],
//! );
//!
//! // Decide where a user-placed point belongs, then apply the plan.
//! let coord = Coordinate::new(45.73, 6.25);
//! let index = planner::plan_insertion(&hike.waypoints(), coord, false).unwrap();
//! hike.insert_at(index, HikePoint::new(coord.latitude, coord.longitude, 0.0))
//!     .unwrap();
//! assert_eq!(hike.len(), 4);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, RoutePlanError};

// Encoded polyline decoding/encoding
pub mod polyline;

// Geographic primitives (distance, projection, bounding boxes)
pub mod geo_utils;

// Waypoint insertion/deletion planning
pub mod planner;

// Point-of-interest matching along a route
pub mod poi;
pub use poi::{PoiMatches, DEFAULT_POI_THRESHOLD_M, WATER_POINT_TYPE_ID};

// Route summary adaptation
pub mod summary;

// Provider and store seams (routing, POIs, hike CRUD)
pub mod providers;
pub use providers::{HikeStore, PoiProvider, RawPoi, RawRouteSummary, RouteGeometry, RouteResponse, RoutingProvider};

// In-memory hike store (test/reference implementation of the CRUD seam)
pub mod store;
pub use store::MemoryHikeStore;

// One-shot recompute pipeline
pub mod pipeline;
pub use pipeline::{plan_add_point, plan_delete_point, recompute_route, RecomputeOptions, RouteUpdate};

// Serialized edit coordinator
pub mod engine;
pub use engine::{EditIntent, EngineSnapshot, HikeEngine};

// HTTP provider implementations
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::{HttpRoutingProvider, RefugesInfoProvider};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude (WGS84 degrees).
///
/// # Example
/// ```
/// use hike_planner::Coordinate;
/// let col = Coordinate::new(45.9, 6.85); // Chamonix valley
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a new coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the coordinate is finite and within WGS84 bounds.
    ///
    /// Advisory only: the engine never rejects out-of-range coordinates, it
    /// passes them through and logs a warning at the pipeline boundary.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// A route point: coordinate, elevation, and its position within the route.
///
/// `index == -1` marks a point that has not been saved yet. Indices are only
/// finalized by [`Hike::renumber`] (0..n-1 in route order) at save time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HikePoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Elevation in meters
    pub elevation: f64,
    /// Saved position within the route, or -1 if unassigned
    #[serde(default = "unassigned_index")]
    pub index: i32,
}

fn unassigned_index() -> i32 {
    -1
}

impl HikePoint {
    /// Create a new, not-yet-saved point (`index` = -1).
    pub fn new(latitude: f64, longitude: f64, elevation: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation,
            index: -1,
        }
    }

    /// The point's coordinate, without elevation.
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

impl From<Coordinate> for HikePoint {
    fn from(c: Coordinate) -> Self {
        HikePoint::new(c.latitude, c.longitude, 0.0)
    }
}

/// Bounding box enclosing a point set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from route points. Returns `None` for an empty slice;
    /// [`geo_utils::bounding_box`] maps that to `UndefinedBoundingBox`.
    pub fn from_points(points: &[HikePoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// South-west corner.
    pub fn min(&self) -> Coordinate {
        Coordinate::new(self.min_lat, self.min_lng)
    }

    /// North-east corner.
    pub fn max(&self) -> Coordinate {
        Coordinate::new(self.max_lat, self.max_lng)
    }

    /// Center point of the bounds (for map centering).
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Distance and elevation summary of a routed path.
///
/// Derived data only: recomputed whenever the route changes, never edited.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Total distance in meters
    pub distance: f64,
    /// Cumulative positive elevation gain in meters
    pub ascent: f64,
    /// Cumulative negative elevation change, as a positive magnitude in meters
    pub descent: f64,
}

/// Kind of point of interest found near a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoiKind {
    Refuge,
    WaterPoint,
}

/// A point of interest matched against the route.
///
/// Ephemeral: rebuilt from provider candidates on every recompute, never
/// merged across rebuilds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub name: String,
    pub link: String,
    pub kind: PoiKind,
    pub coordinate: Coordinate,
}

// ============================================================================
// Hike Aggregate
// ============================================================================

/// Stable identifier of a point within a [`Hike`] arena.
///
/// Ids survive insertions and deletions of other points, so external
/// references (markers, selections) stay valid while the route is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PointId(pub u64);

/// A hike: identity, name, ordered waypoints, and the derived summary.
///
/// Points live in an arena keyed by [`PointId`]; a separate ordered id list
/// defines route topology. The order list is the sole source of truth for
/// topology, and only the insertion planner decides new positions.
#[derive(Debug, Clone)]
pub struct Hike {
    pub id: u64,
    pub name: String,
    points: HashMap<PointId, HikePoint>,
    order: Vec<PointId>,
    next_id: u64,
    pub summary: RouteSummary,
}

impl Hike {
    /// Create an empty hike.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            points: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
            summary: RouteSummary::default(),
        }
    }

    /// Create a hike from an ordered point sequence.
    pub fn from_points(id: u64, name: impl Into<String>, points: Vec<HikePoint>) -> Self {
        let mut hike = Self::new(id, name);
        for point in points {
            hike.push(point);
        }
        hike
    }

    /// Number of waypoints.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// True if the hike has no waypoints.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Waypoints in route order.
    pub fn waypoints(&self) -> Vec<HikePoint> {
        self.order.iter().map(|id| self.points[id]).collect()
    }

    /// Point ids in route order.
    pub fn point_ids(&self) -> &[PointId] {
        &self.order
    }

    /// Look up a point by its stable id.
    pub fn point(&self, id: PointId) -> Option<&HikePoint> {
        self.points.get(&id)
    }

    /// Append a point at the end of the route.
    pub fn push(&mut self, point: HikePoint) -> PointId {
        let id = self.alloc_id();
        self.points.insert(id, point);
        self.order.push(id);
        id
    }

    /// Insert a point at `position` in the route order.
    ///
    /// `position` comes from [`planner::plan_insertion`]; inserting past the
    /// end is an internal error.
    pub fn insert_at(&mut self, position: usize, point: HikePoint) -> Result<PointId> {
        if position > self.order.len() {
            return Err(RoutePlanError::internal(format!(
                "insert position {} out of bounds ({} points)",
                position,
                self.order.len()
            )));
        }
        let id = self.alloc_id();
        self.points.insert(id, point);
        self.order.insert(position, id);
        Ok(id)
    }

    /// Remove the point at `position` in the route order.
    ///
    /// No re-indexing happens here; indices are finalized at save time.
    pub fn remove_at(&mut self, position: usize) -> Result<HikePoint> {
        if position >= self.order.len() {
            return Err(RoutePlanError::internal(format!(
                "delete position {} out of bounds ({} points)",
                position,
                self.order.len()
            )));
        }
        let id = self.order.remove(position);
        self.points
            .remove(&id)
            .ok_or_else(|| RoutePlanError::internal("arena out of sync with order list"))
    }

    /// Move the point at `position` to a new coordinate, keeping elevation
    /// until the next recompute refreshes it.
    pub fn move_point(&mut self, position: usize, coordinate: Coordinate) -> Result<()> {
        let id = *self.order.get(position).ok_or_else(|| {
            RoutePlanError::internal(format!(
                "move position {} out of bounds ({} points)",
                position,
                self.order.len()
            ))
        })?;
        if let Some(point) = self.points.get_mut(&id) {
            point.latitude = coordinate.latitude;
            point.longitude = coordinate.longitude;
        }
        Ok(())
    }

    /// Assign final indices 0..n-1 in route order. Called by stores on save.
    pub fn renumber(&mut self) {
        for (position, id) in self.order.iter().enumerate() {
            if let Some(point) = self.points.get_mut(id) {
                point.index = position as i32;
            }
        }
    }

    fn alloc_id(&mut self) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        id
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<HikePoint> {
        vec![
            HikePoint::new(45.621093, 6.052332, 320.0),
            HikePoint::new(45.694522, 6.252326, 410.0),
            HikePoint::new(45.755622, 6.252326, 380.0),
        ]
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(45.9, 6.85).is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, 181.0).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_new_point_is_unassigned() {
        assert_eq!(HikePoint::new(45.0, 6.0, 0.0).index, -1);
    }

    #[test]
    fn test_bounds_from_points() {
        let points = vec![
            HikePoint::new(1.0, 1.0, 0.0),
            HikePoint::new(3.0, 2.0, 0.0),
            HikePoint::new(2.0, 5.0, 0.0),
        ];
        let bounds = Bounds::from_points(&points).unwrap();
        assert_eq!(bounds.min(), Coordinate::new(1.0, 1.0));
        assert_eq!(bounds.max(), Coordinate::new(3.0, 5.0));
    }

    #[test]
    fn test_bounds_empty_input() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_arena_insert_keeps_ids_stable() {
        let mut hike = Hike::from_points(1, "test", sample_points());
        let first_id = hike.point_ids()[0];
        let first = *hike.point(first_id).unwrap();

        hike.insert_at(1, HikePoint::new(45.65, 6.1, 0.0)).unwrap();
        hike.remove_at(2).unwrap();

        // The untouched point is still reachable through its old id.
        assert_eq!(*hike.point(first_id).unwrap(), first);
        assert_eq!(hike.len(), 3);
    }

    #[test]
    fn test_arena_remove_out_of_bounds() {
        let mut hike = Hike::from_points(1, "test", sample_points());
        assert!(hike.remove_at(3).is_err());
    }

    #[test]
    fn test_renumber_assigns_sequential_indices() {
        let mut hike = Hike::from_points(1, "test", sample_points());
        hike.insert_at(1, HikePoint::new(45.65, 6.1, 0.0)).unwrap();

        // Unsaved points stay at -1 until renumbering.
        assert_eq!(hike.waypoints()[1].index, -1);

        hike.renumber();
        let indices: Vec<i32> = hike.waypoints().iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_move_point() {
        let mut hike = Hike::from_points(1, "test", sample_points());
        hike.move_point(0, Coordinate::new(45.63, 6.06)).unwrap();
        assert_eq!(hike.waypoints()[0].latitude, 45.63);
        assert!(hike.move_point(9, Coordinate::new(0.0, 0.0)).is_err());
    }
}
