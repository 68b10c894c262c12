//! Integration tests for Dangerlog API endpoints.
//!
//! These tests verify the full request/response cycle through the HTTP API.

use std::sync::Arc;

use axum::{Router, routing::get};
use axum_test::TestServer;
use tokio::net::TcpListener;

use dangerlog::aggregation::build_index;
use dangerlog::api::{
    AppState, get_nearby, get_nearby_report, get_region, health_check, list_regions,
};
use dangerlog::geocoding::GeocodingClient;
use dangerlog::model::Incident;

fn incident(id: &str, region: &str, lat: f64, lon: f64, killed: u32, injured: u32) -> Incident {
    Incident {
        id: id.to_string(),
        address: format!("{id} Main St"),
        region: region.to_string(),
        city: "Somewhere".to_string(),
        longitude: lon,
        latitude: lat,
        killed,
        injured,
        date: None,
    }
}

fn app(geocoder: Option<GeocodingClient>) -> Router {
    let directory = build_index(vec![
        incident("ca-la", "CA", 34.0, -118.0, 1, 2),
        incident("ca-sf", "CA", 37.0, -122.0, 2, 3),
        incident("ny-nyc", "NY", 40.7, -74.0, 0, 1),
    ]);

    let state = AppState {
        directory: Arc::new(directory),
        geocoder,
    };

    Router::new()
        .route("/regions", get(list_regions))
        .route("/regions/:name", get(get_region))
        .route("/incidents/nearby", get(get_nearby))
        .route("/incidents/nearby/report", get(get_nearby_report))
        .route("/health", get(health_check))
        .with_state(state)
}

fn create_test_server() -> TestServer {
    TestServer::new(app(None)).unwrap()
}

/// Serve a fixed Nominatim-style search endpoint on an ephemeral port.
async fn spawn_fake_geocoder() -> String {
    let fake = Router::new().route(
        "/search",
        get(|query: axum::extract::RawQuery| async move {
            let query = query.0.unwrap_or_default();
            if query.contains("Hollywood") {
                axum::Json(serde_json::json!([{ "lat": "34.0", "lon": "-118.0" }]))
            } else {
                axum::Json(serde_json::json!([]))
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, fake).await.unwrap();
    });

    format!("http://{addr}/search")
}

#[tokio::test]
async fn test_health_endpoint() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_list_regions_in_name_order() {
    let server = create_test_server();

    let response = server.get("/regions").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let regions = body.as_array().unwrap();
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0]["name"], "CA");
    assert_eq!(regions[0]["incident_count"], 2);
    assert_eq!(regions[0]["total_killed"], 3);
    assert_eq!(regions[1]["name"], "NY");
}

#[tokio::test]
async fn test_get_region() {
    let server = create_test_server();

    let response = server.get("/regions/NY").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["incident_count"], 1);
    assert_eq!(body["total_injured"], 1);

    server
        .get("/regions/TX")
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nearby_wide_radius() {
    let server = create_test_server();

    let response = server
        .get("/incidents/nearby?region=CA&lat=34.0&lon=-118.0&radius_km=600")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let incidents = body["incidents"].as_array().unwrap();
    assert_eq!(incidents.len(), 2);
    assert_eq!(incidents[0]["id"], "ca-la");
    assert_eq!(incidents[0]["distance_km"], 0.0);
    assert_eq!(incidents[1]["id"], "ca-sf");
    assert_eq!(body["total_incidents"], 2);
    assert_eq!(body["total_killed"], 3);
    assert_eq!(body["total_injured"], 5);
    assert_eq!(body["danger_level"], "low");
}

#[tokio::test]
async fn test_nearby_small_radius() {
    let server = create_test_server();

    let response = server
        .get("/incidents/nearby?region=CA&lat=34.0&lon=-118.0&radius_km=1")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let incidents = body["incidents"].as_array().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0]["id"], "ca-la");
    assert_eq!(body["total_killed"], 1);
}

#[tokio::test]
async fn test_nearby_default_radius() {
    let server = create_test_server();

    let response = server
        .get("/incidents/nearby?region=NY&lat=40.7&lon=-74.0")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["radius_km"], 10.0);
    assert_eq!(body["total_incidents"], 1);
}

#[tokio::test]
async fn test_nearby_unknown_region() {
    let server = create_test_server();

    let response = server
        .get("/incidents/nearby?region=TX&lat=31.0&lon=-97.0&radius_km=100")
        .await;

    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nearby_bad_input() {
    let server = create_test_server();

    // Negative radius
    server
        .get("/incidents/nearby?region=CA&lat=34.0&lon=-118.0&radius_km=-5")
        .await
        .assert_status(axum::http::StatusCode::BAD_REQUEST);

    // Latitude out of range
    server
        .get("/incidents/nearby?region=CA&lat=134.0&lon=-118.0")
        .await
        .assert_status(axum::http::StatusCode::BAD_REQUEST);

    // Only half a coordinate
    server
        .get("/incidents/nearby?region=CA&lat=34.0")
        .await
        .assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_address_without_geocoder_is_unavailable() {
    let server = create_test_server();

    let response = server
        .get("/incidents/nearby?region=CA&address=Hollywood%20Blvd")
        .await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_address_is_geocoded() {
    let geocoder = GeocodingClient::with_base_url(&spawn_fake_geocoder().await).unwrap();
    let server = TestServer::new(app(Some(geocoder))).unwrap();

    let response = server
        .get("/incidents/nearby?region=CA&address=Hollywood%20Blvd&radius_km=5")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["origin"]["latitude"], 34.0);
    assert_eq!(body["incidents"][0]["id"], "ca-la");

    server
        .get("/incidents/nearby?region=CA&address=Nowhere")
        .await
        .assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_endpoint_renders_text() {
    let server = create_test_server();

    let response = server
        .get("/incidents/nearby/report?region=CA&lat=34.0&lon=-118.0&radius_km=600")
        .await;

    response.assert_status_ok();
    let text = response.text();
    assert!(text.contains("|DANGER LOG|"));
    assert!(text.contains("id : ca-la,"));
    assert!(text.contains("Total Incidents: 2"));
    assert!(text.contains("LOW DANGER"));
}

#[tokio::test]
async fn test_oneshot_request_through_router() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let response = app(None)
        .oneshot(
            Request::builder()
                .uri("/incidents/nearby?region=NY&lat=40.7&lon=-74.0&radius_km=1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), axum::http::StatusCode::OK);
}
