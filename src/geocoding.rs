//! Address geocoding client.
//!
//! Resolves a free-text address into a [`Coordinate`] through a
//! Nominatim-compatible search API.
//!
//! # API Reference
//!
//! See: <https://nominatim.org/release-docs/latest/api/Search/>
//!
//! The public OpenStreetMap instance requires an identifying User-Agent and
//! allows at most one request per second. Point the client at a self-hosted
//! instance with [`GeocodingClient::with_base_url`] for heavier use.

use serde::Deserialize;

use crate::geo::Coordinate;

/// Base URL for the public Nominatim search endpoint.
const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("dangerlog/", env!("CARGO_PKG_VERSION"));

/// Client for resolving addresses to coordinates.
#[derive(Clone)]
pub struct GeocodingClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeocodingClient {
    /// Create a client against the public Nominatim instance.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_base_url(NOMINATIM_SEARCH_URL)
    }

    /// Create a client with a custom search URL (for testing or
    /// self-hosted instances).
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `address` to a coordinate.
    ///
    /// Returns `Ok(None)` when the service knows no place matching the
    /// address.
    pub async fn geocode(&self, address: &str) -> anyhow::Result<Option<Coordinate>> {
        let url = format!(
            "{}?format=json&limit=1&q={}",
            self.base_url,
            urlencoding::encode(address)
        );

        let response = self.client.get(&url).send().await?.error_for_status()?;
        let places = response.json::<Vec<Place>>().await?;

        first_coordinate(&places)
    }
}

/// A single search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Place {
    pub lat: String,
    pub lon: String,

    #[serde(default)]
    pub display_name: Option<String>,
}

impl Place {
    /// Parse the string coordinates of this hit.
    pub fn coordinate(&self) -> anyhow::Result<Coordinate> {
        let latitude: f64 = self.lat.trim().parse()?;
        let longitude: f64 = self.lon.trim().parse()?;
        let coordinate = Coordinate::new(latitude, longitude);
        anyhow::ensure!(
            coordinate.is_valid(),
            "geocoder returned out-of-range coordinate {coordinate}"
        );
        Ok(coordinate)
    }
}

fn first_coordinate(places: &[Place]) -> anyhow::Result<Option<Coordinate>> {
    places.first().map(Place::coordinate).transpose()
}
