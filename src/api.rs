//! HTTP API handlers for Dangerlog.
//!
//! - **GET /regions**: every region with incident counts, in name order.
//! - **GET /regions/:name**: counts for one region.
//! - **GET /incidents/nearby**: incidents in a region near a point, nearest
//!   first, with aggregate counts.
//! - **GET /incidents/nearby/report**: the same query rendered as a
//!   plain-text danger log.
//!
//! The region directory is loaded once at startup and shared read-only;
//! every query works on its own copy of the region's incidents.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{info, instrument, warn};

use crate::aggregation::{QueryError, RegionDirectory, query};
use crate::geo::Coordinate;
use crate::geocoding::GeocodingClient;
use crate::model::{NearbyQuery, ProximityReport, RegionSummary};
use crate::report::render_report;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<RegionDirectory>,
    pub geocoder: Option<GeocodingClient>,
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /regions - List every region with aggregate counts.
///
/// # Response
///
/// ```json
/// [
///     { "name": "California", "incident_count": 2, "total_killed": 3, "total_injured": 5 }
/// ]
/// ```
#[instrument(skip(state))]
pub async fn list_regions(State(state): State<AppState>) -> Json<Vec<RegionSummary>> {
    let summaries = state.directory.summaries();
    info!(region_count = summaries.len(), "Regions listed");
    Json(summaries)
}

/// GET /regions/:name - Aggregate counts for a single region.
#[instrument(skip(state))]
pub async fn get_region(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RegionSummary>, StatusCode> {
    match state.directory.get(&name) {
        Some(region) => Ok(Json(region.summary())),
        None => {
            info!(region = %name, "Region not found");
            Err(StatusCode::NOT_FOUND)
        }
    }
}

/// GET /incidents/nearby - Incidents in a region within a radius of a point.
///
/// # Query Parameters
///
/// - `region` (required): Region name, matched exactly
/// - `lat`, `lon` (optional): Query point in degrees
/// - `address` (optional): Free-text address, used when `lat`/`lon` are absent
/// - `radius_km` (optional): Inclusive search radius (default: 10)
///
/// # Response
///
/// ```json
/// {
///     "region": "California",
///     "origin": { "latitude": 34.0, "longitude": -118.0 },
///     "radius_km": 600.0,
///     "incidents": [ { "id": "1", "...": "...", "distance_km": 0.0 } ],
///     "total_incidents": 1,
///     "total_killed": 1,
///     "total_injured": 2,
///     "danger_level": "low"
/// }
/// ```
///
/// Errors: 400 for invalid input, 404 for an unknown region or address,
/// 502 when the geocoder fails, 503 when an address is given but no
/// geocoder is configured.
#[instrument(skip(state))]
pub async fn get_nearby(
    State(state): State<AppState>,
    Query(params): Query<NearbyQuery>,
) -> Result<Json<ProximityReport>, StatusCode> {
    let origin = resolve_origin(&state, &params).await?;
    let report = run_query(&state, &params, origin)?;
    Ok(Json(report))
}

/// GET /incidents/nearby/report - Same as `/incidents/nearby`, rendered as
/// plain text.
#[instrument(skip(state))]
pub async fn get_nearby_report(
    State(state): State<AppState>,
    Query(params): Query<NearbyQuery>,
) -> Result<String, StatusCode> {
    let origin = resolve_origin(&state, &params).await?;
    let report = run_query(&state, &params, origin)?;

    let label = match (&params.lat, &params.lon, &params.address) {
        (Some(_), Some(_), _) | (_, _, None) => origin.to_string(),
        (_, _, Some(address)) => address.clone(),
    };

    Ok(render_report(&label, &report))
}

/// Work out the query point: explicit coordinates first, then the geocoder.
async fn resolve_origin(state: &AppState, params: &NearbyQuery) -> Result<Coordinate, StatusCode> {
    match (params.lat, params.lon, params.address.as_deref()) {
        (Some(lat), Some(lon), _) => Ok(Coordinate::new(lat, lon)),
        (None, None, Some(address)) => {
            let geocoder = state.geocoder.as_ref().ok_or_else(|| {
                warn!("Geocoder not configured");
                StatusCode::SERVICE_UNAVAILABLE
            })?;

            match geocoder.geocode(address).await {
                Ok(Some(origin)) => Ok(origin),
                Ok(None) => {
                    info!(address = %address, "Address not found");
                    Err(StatusCode::NOT_FOUND)
                }
                Err(e) => {
                    warn!(address = %address, error = %e, "Failed to geocode address");
                    Err(StatusCode::BAD_GATEWAY)
                }
            }
        }
        _ => {
            warn!(region = %params.region, "Query point missing or incomplete");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

fn run_query(
    state: &AppState,
    params: &NearbyQuery,
    origin: Coordinate,
) -> Result<ProximityReport, StatusCode> {
    match query(&state.directory, &params.region, origin, params.radius_km) {
        Ok(report) => {
            info!(
                region = %report.region,
                radius_km = report.radius_km,
                incidents = report.total_incidents,
                killed = report.total_killed,
                injured = report.total_injured,
                danger = ?report.danger_level,
                "Nearby incidents queried"
            );
            Ok(report)
        }
        Err(e @ QueryError::RegionNotFound(_)) => {
            info!(error = %e, "No incidents recorded for region");
            Err(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            warn!(region = %params.region, error = %e, "Rejected nearby query");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}
