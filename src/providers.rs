//! External collaborator seams: routing, POI lookup, and hike storage.
//!
//! The engine owns no wire protocol. It consumes whatever the routing
//! provider returns - an encoded polyline or an already-decoded point list -
//! and a flat candidate shape for POIs. Transport and authentication live
//! behind these traits (see [`crate::http`] for reqwest implementations).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutePlanError};
use crate::{polyline, Coordinate, Hike, HikePoint};

/// Route geometry as returned by a routing provider.
///
/// Providers differ: some return the compact polyline encoding, others a
/// decoded `[lat, lng, elevation?]` row list. Both are handled.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RouteGeometry {
    Encoded(String),
    Points(Vec<Vec<f64>>),
}

impl RouteGeometry {
    /// Materialize the geometry as route points.
    ///
    /// Encoded geometry goes through [`polyline::decode`]; decoded rows are
    /// validated for shape (at least `[lat, lng]`, optional elevation).
    pub fn into_points(self, include_elevation: bool) -> Result<Vec<HikePoint>> {
        match self {
            RouteGeometry::Encoded(encoded) => polyline::decode(&encoded, include_elevation),
            RouteGeometry::Points(rows) => rows
                .into_iter()
                .enumerate()
                .map(|(row, values)| {
                    if values.len() < 2 {
                        return Err(RoutePlanError::DecodeError {
                            offset: row,
                            message: format!(
                                "geometry row {} has {} values, expected at least 2",
                                row,
                                values.len()
                            ),
                        });
                    }
                    let elevation = if include_elevation {
                        values.get(2).copied().unwrap_or(0.0)
                    } else {
                        0.0
                    };
                    Ok(HikePoint::new(values[0], values[1], elevation))
                })
                .collect(),
        }
    }
}

/// Distance/elevation summary as shipped by the routing provider.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawRouteSummary {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub ascent: f64,
    #[serde(default)]
    pub descent: f64,
}

/// Routing provider response: geometry plus an optional summary.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteResponse {
    pub geometry: RouteGeometry,
    #[serde(default)]
    pub summary: Option<RawRouteSummary>,
}

/// A candidate point of interest, before threshold matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPoi {
    pub name: String,
    #[serde(default)]
    pub link: String,
    pub type_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

impl RawPoi {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// External routing provider: ordered waypoints in, routed path out.
///
/// Implementations should surface transport failures as
/// [`RoutePlanError::ProviderUnavailable`]; those are the only errors the
/// pipeline treats as transient.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn get_route(&self, waypoints: &[Coordinate]) -> Result<RouteResponse>;
}

/// External POI provider, queried by bounding box.
#[async_trait]
pub trait PoiProvider: Send + Sync {
    async fn pois_in_bbox(&self, min: Coordinate, max: Coordinate) -> Result<Vec<RawPoi>>;
}

/// External hike storage. The engine only needs load and save; everything
/// else about persistence is the collaborator's business. Saving finalizes
/// point indices (0..n-1 in route order).
#[async_trait]
pub trait HikeStore: Send + Sync {
    async fn load(&self, id: u64) -> Result<Hike>;
    async fn save(&self, id: u64, hike: &Hike) -> Result<Hike>;
}
