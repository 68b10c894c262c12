//! Data models for Dangerlog.
//!
//! An [`Incident`] is immutable once parsed. Distances to a query point are
//! never stored on it; each query produces fresh [`NearbyIncident`] values
//! pairing a record with its distance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// A single geotagged incident record.
///
/// Equality covers only the parsed fields. Query-scoped state such as the
/// distance to a user's location lives in [`NearbyIncident`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique, non-empty identifier within a loaded dataset.
    pub id: String,

    /// Street address where the incident took place.
    pub address: String,

    /// Region (e.g. US state) the incident is bucketed under.
    pub region: String,

    /// City or county within the region.
    pub city: String,

    pub longitude: f64,
    pub latitude: f64,

    /// Number of people killed.
    pub killed: u32,

    /// Number of people injured.
    pub injured: u32,

    /// Date of the incident, when the dataset provides a parseable one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl Incident {
    /// Location of the incident.
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Distance in kilometers from this incident to `origin`.
    pub fn distance_to(&self, origin: Coordinate) -> f64 {
        self.location().distance_to(origin)
    }
}

/// A named bucket of incidents. Created lazily the first time an incident
/// names it; never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    incidents: Vec<Incident>,
}

impl Region {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            incidents: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push(&mut self, incident: Incident) {
        self.incidents.push(incident);
    }

    pub fn incidents(&self) -> &[Incident] {
        &self.incidents
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Aggregate counts over every incident in the region.
    pub fn summary(&self) -> RegionSummary {
        RegionSummary {
            name: self.name.clone(),
            incident_count: self.incidents.len(),
            total_killed: self.incidents.iter().map(|i| u64::from(i.killed)).sum(),
            total_injured: self.incidents.iter().map(|i| u64::from(i.injured)).sum(),
        }
    }
}

/// An incident paired with its distance to one query point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyIncident {
    #[serde(flatten)]
    pub incident: Incident,

    /// Great-circle distance in kilometers to the query origin.
    pub distance_km: f64,
}

/// Coarse danger rating based on how many incidents fall within range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DangerLevel {
    /// Fewer than 15 incidents in range.
    Low,

    /// 15 to 29 incidents in range.
    Moderate,

    /// 30 or more incidents in range.
    High,
}

impl DangerLevel {
    /// Determine the danger level from the number of incidents in range.
    ///
    /// # Thresholds
    ///
    /// - `low`: count < 15
    /// - `moderate`: 15 <= count < 30
    /// - `high`: count >= 30
    pub fn from_count(count: usize) -> Self {
        if count < 15 {
            DangerLevel::Low
        } else if count < 30 {
            DangerLevel::Moderate
        } else {
            DangerLevel::High
        }
    }

    /// Human-readable label used in text reports.
    pub fn label(&self) -> &'static str {
        match self {
            DangerLevel::Low => "LOW DANGER",
            DangerLevel::Moderate => "MODERATE DANGER",
            DangerLevel::High => "HIGH DANGER. Stay Cautious",
        }
    }
}

/// Result of a proximity query against one region.
#[derive(Debug, Clone, Serialize)]
pub struct ProximityReport {
    /// The region that was searched.
    pub region: String,

    /// The query point.
    pub origin: Coordinate,

    /// Inclusive search radius in kilometers.
    pub radius_km: f64,

    /// Incidents within the radius, nearest first.
    pub incidents: Vec<NearbyIncident>,

    pub total_incidents: usize,

    /// Sum of `killed` over the incidents in range.
    pub total_killed: u64,

    /// Sum of `injured` over the incidents in range.
    pub total_injured: u64,

    pub danger_level: DangerLevel,
}

impl ProximityReport {
    /// Build a report from an already filtered, nearest-first list.
    pub fn new(
        region: impl Into<String>,
        origin: Coordinate,
        radius_km: f64,
        incidents: Vec<NearbyIncident>,
    ) -> Self {
        let total_killed = incidents
            .iter()
            .map(|n| u64::from(n.incident.killed))
            .sum();
        let total_injured = incidents
            .iter()
            .map(|n| u64::from(n.incident.injured))
            .sum();

        Self {
            region: region.into(),
            origin,
            radius_km,
            total_incidents: incidents.len(),
            danger_level: DangerLevel::from_count(incidents.len()),
            incidents,
            total_killed,
            total_injured,
        }
    }
}

/// Per-region aggregate returned by GET /regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionSummary {
    pub name: String,
    pub incident_count: usize,
    pub total_killed: u64,
    pub total_injured: u64,
}

/// Query parameters for GET /incidents/nearby.
///
/// The origin is either an explicit `lat`/`lon` pair or a free-text
/// `address` resolved through the geocoder. An explicit pair wins when both
/// are given.
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    /// Region to search, e.g. "California".
    pub region: String,

    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub address: Option<String>,

    /// Search radius in kilometers (default: 10).
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
}

fn default_radius_km() -> f64 {
    10.0
}
