//! Region directory and proximity queries.
//!
//! A query resolves a region in the [`RegionDirectory`], ranks a private
//! copy of that region's incidents by distance to the query point, trims the
//! ranking to the requested radius and sums the severity counts over what
//! remains. The directory itself is never reordered, so it can be shared
//! read-only between concurrent queries.

use tracing::debug;

use crate::geo::Coordinate;
use crate::index::OrderedIndex;
use crate::model::{Incident, NearbyIncident, ProximityReport, Region, RegionSummary};
use crate::sort::rank_by_distance;

/// Errors returned by [`query`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    /// No incident was ever recorded under this region name.
    #[error("region not found: {0}")]
    RegionNotFound(String),

    #[error("radius must be a finite, non-negative number of kilometers, got {0}")]
    InvalidRadius(f64),

    #[error("invalid query coordinate: {0}")]
    InvalidCoordinate(Coordinate),
}

/// Incidents bucketed by region name, ordered by name.
#[derive(Debug, Default)]
pub struct RegionDirectory {
    regions: OrderedIndex<String, Region>,
}

impl RegionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket every incident under its region, creating regions on first
    /// sight.
    pub fn build<I>(incidents: I) -> Self
    where
        I: IntoIterator<Item = Incident>,
    {
        let mut directory = Self::new();
        for incident in incidents {
            directory.add(incident);
        }
        debug!(
            regions = directory.region_count(),
            incidents = directory.incident_count(),
            "Region directory built"
        );
        directory
    }

    /// Append one incident to its region.
    pub fn add(&mut self, incident: Incident) {
        match self.regions.get_mut(incident.region.as_str()) {
            Some(region) => region.push(incident),
            None => {
                let name = incident.region.clone();
                let mut region = Region::new(name.clone());
                region.push(incident);
                self.regions.insert(name, region);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Region> {
        self.regions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.regions.contains(name)
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn incident_count(&self) -> usize {
        self.regions.values().map(Region::len).sum()
    }

    /// Every region in ascending name order.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Per-region aggregates in ascending name order.
    pub fn summaries(&self) -> Vec<RegionSummary> {
        self.regions().map(Region::summary).collect()
    }
}

/// Build the region directory from parsed incidents.
pub fn build_index<I>(incidents: I) -> RegionDirectory
where
    I: IntoIterator<Item = Incident>,
{
    RegionDirectory::build(incidents)
}

/// Keep the nearest-first prefix of `ranked` whose distance is at most
/// `radius_km` (inclusive).
///
/// `ranked` must be ascending by distance, as produced by
/// [`rank_by_distance`].
pub fn filter_within_radius(mut ranked: Vec<NearbyIncident>, radius_km: f64) -> Vec<NearbyIncident> {
    let end = ranked.partition_point(|nearby| nearby.distance_km <= radius_km);
    ranked.truncate(end);
    ranked
}

/// Find every incident in `region` within `radius_km` of `origin`,
/// nearest first, with killed/injured totals over that set.
pub fn query(
    directory: &RegionDirectory,
    region: &str,
    origin: Coordinate,
    radius_km: f64,
) -> Result<ProximityReport, QueryError> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(QueryError::InvalidRadius(radius_km));
    }
    if !origin.is_valid() {
        return Err(QueryError::InvalidCoordinate(origin));
    }

    let found = directory
        .get(region)
        .ok_or_else(|| QueryError::RegionNotFound(region.to_string()))?;

    let ranked = rank_by_distance(found.incidents().iter().cloned(), origin);
    let in_range = filter_within_radius(ranked, radius_km);

    debug!(
        region = %found.name(),
        radius_km,
        searched = found.len(),
        in_range = in_range.len(),
        "Proximity query evaluated"
    );

    Ok(ProximityReport::new(
        found.name(),
        origin,
        radius_km,
        in_range,
    ))
}
