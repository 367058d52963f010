//! HTTP routes of the boundary service

use std::sync::Arc;

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use geojson::FeatureCollection;
use osmbound_core::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::HttpConfig;
use crate::overpass::ElementSource;
use crate::service::BoundaryService;

pub const REQUIRED_BOUNDS: [&str; 4] = ["minLat", "maxLat", "minLng", "maxLng"];

type SharedService<S> = Arc<BoundaryService<S>>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Missing required parameters")]
    MissingBounds,
    #[error("{0}")]
    InvalidBounds(String),
    #[error("Failed to fetch {} boundaries", upstream_label(.0))]
    Upstream(BoundaryKind),
}

fn upstream_label(kind: &BoundaryKind) -> &'static str {
    match kind {
        BoundaryKind::Neighborhood => "neighborhood",
        BoundaryKind::Zipcode => "ZIP code",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            Self::MissingBounds => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message, "required": REQUIRED_BOUNDS })),
            )
                .into_response(),
            Self::InvalidBounds(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

/// Map viewport bounds as sent by the front end
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundsQuery {
    pub min_lat: Option<String>,
    pub max_lat: Option<String>,
    pub min_lng: Option<String>,
    pub max_lng: Option<String>,
}

impl BoundsQuery {
    pub fn bounding_box(&self) -> Result<BoundingBox, ApiError> {
        let [min_lat, max_lat, min_lng, max_lng] = [
            &self.min_lat,
            &self.max_lat,
            &self.min_lng,
            &self.max_lng,
        ]
        .map(|value| value.as_deref().map(str::trim).filter(|v| !v.is_empty()));

        let (Some(min_lat), Some(max_lat), Some(min_lng), Some(max_lng)) =
            (min_lat, max_lat, min_lng, max_lng)
        else {
            return Err(ApiError::MissingBounds);
        };

        BoundingBox::new(
            parse_coordinate("minLat", min_lat)?,
            parse_coordinate("minLng", min_lng)?,
            parse_coordinate("maxLat", max_lat)?,
            parse_coordinate("maxLng", max_lng)?,
        )
        .map_err(|e| ApiError::InvalidBounds(e.to_string()))
    }
}

fn parse_coordinate(name: &str, value: &str) -> Result<f64, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::InvalidBounds(format!("Parameter {name} is not a number: {value}")))
}

/// Builds the application router around `service`
pub fn router<S: ElementSource>(service: SharedService<S>, http: &HttpConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/boundaries/neighborhoods", get(neighborhoods::<S>))
        .route("/api/boundaries/zipcodes", get(zipcodes::<S>))
        .with_state(service)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&http.cors_origins))
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(http.request_timeout()))
                .layer(ConcurrencyLimitLayer::new(http.max_concurrent_requests.max(1))),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .inspect_err(|_| warn!(%origin, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn handle_middleware_error(err: BoxError) -> (StatusCode, Json<Value>) {
    if err.is::<Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
    } else {
        error!(error = %err, "Unhandled middleware error");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Internal server error" })),
        )
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn neighborhoods<S: ElementSource>(
    State(service): State<SharedService<S>>,
    Query(bounds): Query<BoundsQuery>,
) -> Result<Json<FeatureCollection>, ApiError> {
    fetch_boundaries(&service, BoundaryKind::Neighborhood, &bounds).await
}

async fn zipcodes<S: ElementSource>(
    State(service): State<SharedService<S>>,
    Query(bounds): Query<BoundsQuery>,
) -> Result<Json<FeatureCollection>, ApiError> {
    fetch_boundaries(&service, BoundaryKind::Zipcode, &bounds).await
}

async fn fetch_boundaries<S: ElementSource>(
    service: &BoundaryService<S>,
    kind: BoundaryKind,
    bounds: &BoundsQuery,
) -> Result<Json<FeatureCollection>, ApiError> {
    let bbox = bounds.bounding_box()?;
    info!(%kind, %bbox, "Fetching boundaries");

    service
        .boundaries(kind, &bbox)
        .await
        .map(Json)
        .map_err(|err| {
            error!(%kind, %bbox, error = %err, "Failed to fetch boundaries");
            ApiError::Upstream(kind)
        })
}
