//! HTTP implementations of the provider seams.
//!
//! Two clients, matching the collaborators of the original application:
//! - [`HttpRoutingProvider`] posts ordered waypoints to a routing backend
//!   and parses the geometry/summary response.
//! - [`RefugesInfoProvider`] queries the refuges.info bounding-box API and
//!   flattens its GeoJSON feature collection into [`RawPoi`] candidates.
//!
//! Transport and status failures map to
//! [`RoutePlanError::ProviderUnavailable`]; nothing here retries - a newer
//! edit supersedes the call instead (see [`crate::engine`]).

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoutePlanError};
use crate::providers::{PoiProvider, RawPoi, RouteResponse, RoutingProvider};
use crate::Coordinate;

/// Public refuges.info API root.
pub const REFUGES_INFO_API: &str = "https://www.refuges.info/api/";

/// Point types requested from the bbox endpoint.
const BBOX_POINT_TYPES: &str = "cabane,refuge,gite,pt_eau";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

fn build_client(provider: &str) -> Result<Client> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| RoutePlanError::provider(provider, format!("failed to create HTTP client: {}", e)))
}

// ============================================================================
// Routing
// ============================================================================

/// Routing backend client: `POST {route_url} { "points": [...] }`.
pub struct HttpRoutingProvider {
    client: Client,
    route_url: String,
}

#[derive(Serialize)]
struct RoutePayloadPoint {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize)]
struct RoutePayload {
    points: Vec<RoutePayloadPoint>,
}

impl HttpRoutingProvider {
    pub fn new(route_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client("routing")?,
            route_url: route_url.into(),
        })
    }
}

#[async_trait]
impl RoutingProvider for HttpRoutingProvider {
    async fn get_route(&self, waypoints: &[Coordinate]) -> Result<RouteResponse> {
        let payload = RoutePayload {
            points: waypoints
                .iter()
                .map(|c| RoutePayloadPoint {
                    latitude: c.latitude,
                    longitude: c.longitude,
                })
                .collect(),
        };

        debug!("POST {} ({} waypoints)", self.route_url, waypoints.len());

        let body = self
            .client
            .post(&self.route_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| RoutePlanError::provider("routing", e.to_string()))?
            .error_for_status()
            .map_err(|e| RoutePlanError::provider("routing", e.to_string()))?
            .text()
            .await
            .map_err(|e| RoutePlanError::provider("routing", e.to_string()))?;

        serde_json::from_str(&body)
            .map_err(|e| RoutePlanError::provider("routing", format!("unparseable response: {}", e)))
    }
}

// ============================================================================
// Refuges.info POIs
// ============================================================================

/// refuges.info bbox client.
pub struct RefugesInfoProvider {
    client: Client,
    base_url: String,
}

impl RefugesInfoProvider {
    /// Client against the public refuges.info API.
    pub fn new() -> Result<Self> {
        Self::with_base_url(REFUGES_INFO_API)
    }

    /// Client against a custom API root (mirrors, tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client("poi")?,
            base_url: base_url.into(),
        })
    }

    fn bbox_url(&self, min: Coordinate, max: Coordinate) -> String {
        // The API wants west,south,east,north
        format!(
            "{}bbox?bbox={},{},{},{}&type_points={}",
            self.base_url, min.longitude, min.latitude, max.longitude, max.latitude, BBOX_POINT_TYPES
        )
    }
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    properties: FeatureProperties,
    geometry: FeatureGeometry,
}

#[derive(Deserialize)]
struct FeatureProperties {
    #[serde(default, alias = "nom")]
    name: String,
    #[serde(default, alias = "lien")]
    link: String,
    #[serde(rename = "type", default)]
    kind: FeatureType,
}

#[derive(Deserialize, Default)]
struct FeatureType {
    #[serde(default)]
    id: i64,
}

#[derive(Deserialize)]
struct FeatureGeometry {
    /// GeoJSON order: [longitude, latitude, ...]
    coordinates: Vec<f64>,
}

fn flatten_features(body: &str) -> Result<Vec<RawPoi>> {
    let collection: FeatureCollection = serde_json::from_str(body)
        .map_err(|e| RoutePlanError::provider("poi", format!("unparseable response: {}", e)))?;

    let mut pois = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        if feature.geometry.coordinates.len() < 2 {
            warn!(
                "Skipping POI '{}' with incomplete coordinates",
                feature.properties.name
            );
            continue;
        }
        pois.push(RawPoi {
            name: feature.properties.name,
            link: feature.properties.link,
            type_id: feature.properties.kind.id,
            longitude: feature.geometry.coordinates[0],
            latitude: feature.geometry.coordinates[1],
        });
    }
    Ok(pois)
}

#[async_trait]
impl PoiProvider for RefugesInfoProvider {
    async fn pois_in_bbox(&self, min: Coordinate, max: Coordinate) -> Result<Vec<RawPoi>> {
        let url = self.bbox_url(min, max);
        debug!("GET {}", url);

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RoutePlanError::provider("poi", e.to_string()))?
            .error_for_status()
            .map_err(|e| RoutePlanError::provider("poi", e.to_string()))?
            .text()
            .await
            .map_err(|e| RoutePlanError::provider("poi", e.to_string()))?;

        flatten_features(&body)
    }
}
