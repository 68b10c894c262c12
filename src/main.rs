//! Dangerlog - proximity queries over geotagged incident records.
//!
//! # API Endpoints
//!
//! - `GET /regions` - List regions with incident counts
//! - `GET /regions/:name` - Counts for one region
//! - `GET /incidents/nearby` - Incidents near a point, nearest first
//! - `GET /incidents/nearby/report` - The same, as a plain-text danger log
//! - `GET /health` - Health check

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use dangerlog::aggregation::build_index;
use dangerlog::api::{
    AppState, get_nearby, get_nearby_report, get_region, health_check, list_regions,
};
use dangerlog::geocoding::GeocodingClient;
use dangerlog::loader::load_incidents;

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

/// Default dataset path if not specified via environment variable.
const DEFAULT_DATA_PATH: &str = "data/incidents.csv";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("dangerlog=info".parse()?))
        .init();

    // Load configuration from environment
    let port: u16 = env::var("DANGERLOG_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let data_path =
        env::var("DANGERLOG_DATA_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());

    let geocoder_url = env::var("DANGERLOG_GEOCODER_URL").ok();

    info!(port, data_path = %data_path, "Starting Dangerlog server");

    // Parse the dataset off the async workers; it is plain blocking IO.
    let path = data_path.clone();
    let outcome = tokio::task::spawn_blocking(move || load_incidents(path)).await??;
    if outcome.skipped_rows > 0 || outcome.duplicate_ids > 0 {
        warn!(
            skipped = outcome.skipped_rows,
            duplicates = outcome.duplicate_ids,
            "Some dataset rows were not loaded"
        );
    }

    let directory = build_index(outcome.incidents);
    info!(
        regions = directory.region_count(),
        incidents = directory.incident_count(),
        "Region directory ready"
    );

    let geocoder = match geocoder_url.as_deref() {
        Some(url) => GeocodingClient::with_base_url(url)?,
        None => GeocodingClient::new()?,
    };
    info!(geocoder = %geocoder.base_url(), "Geocoding enabled");

    let state = AppState {
        directory: Arc::new(directory),
        geocoder: Some(geocoder),
    };

    let app = Router::new()
        .route("/regions", get(list_regions))
        .route("/regions/:name", get(get_region))
        .route("/incidents/nearby", get(get_nearby))
        .route("/incidents/nearby/report", get(get_nearby_report))
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "Dangerlog is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
