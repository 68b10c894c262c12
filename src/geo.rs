//! Great-circle distance between two coordinates.
//!
//! Distances use the spherical law of cosines with the
//! nautical-mile-per-degree approximation:
//!
//! ```text
//! degrees of arc * 60 nmi * 1.1515 mi/nmi * 1.609344 km/mi
//! ```
//!
//! This is an approximation, not a geodesic-exact formula. Errors of a few
//! tenths of a percent against an ellipsoidal model are expected.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Statute miles per nautical mile, as used by the degree-to-mile conversion.
const MILES_PER_NAUTICAL_MILE: f64 = 1.1515;

/// Kilometers per statute mile.
const KM_PER_MILE: f64 = 1.609344;

/// Nautical miles per degree of arc.
const NAUTICAL_MILES_PER_DEGREE: f64 = 60.0;

/// A point on the globe, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and inside the valid
    /// latitude [-90, 90] and longitude [-180, 180] ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Distance in kilometers to `other`.
    pub fn distance_to(&self, other: Coordinate) -> f64 {
        distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Great-circle distance in kilometers between `(lat1, lon1)` and `(lat2, lon2)`.
///
/// Identical points return exactly `0.0`. The cosine argument is clamped to
/// `[-1, 1]` so that rounding drift on nearly coincident points cannot push
/// `acos` out of its domain and produce `NaN`.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let theta = lon1 - lon2;
    let cos_arg = lat1.to_radians().sin() * lat2.to_radians().sin()
        + lat1.to_radians().cos() * lat2.to_radians().cos() * theta.to_radians().cos();

    let angle_deg = cos_arg.clamp(-1.0, 1.0).acos().to_degrees();

    angle_deg * NAUTICAL_MILES_PER_DEGREE * MILES_PER_NAUTICAL_MILE * KM_PER_MILE
}
