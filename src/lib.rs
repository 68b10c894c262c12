//! Dangerlog - proximity queries over geotagged incident records.
//!
//! # Overview
//!
//! Incidents are loaded once from a CSV dataset and bucketed by region in an
//! ordered index (a left-leaning red-black tree keyed by region name). A
//! query names a region and a point; the region's incidents are ranked by
//! great-circle distance to that point, trimmed to a radius, and returned
//! nearest first with killed/injured totals.
//!
//! # Modules
//!
//! - [`model`]: Incident, region and report types
//! - [`index`]: Ordered index backing the region directory
//! - [`geo`]: Coordinates and great-circle distance
//! - [`sort`]: Randomized quicksort by distance
//! - [`aggregation`]: Region directory, radius filter and queries
//! - [`loader`]: CSV dataset parsing
//! - [`geocoding`]: Address to coordinate lookup
//! - [`report`]: Plain-text danger log rendering
//! - [`api`]: HTTP API handlers

pub mod aggregation;
pub mod api;
pub mod geo;
pub mod geocoding;
pub mod index;
pub mod loader;
pub mod model;
pub mod report;
pub mod sort;
