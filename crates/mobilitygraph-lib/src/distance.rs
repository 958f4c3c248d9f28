//! Geographic coordinates and distance helpers.
//!
//! Great-circle distances use the Haversine formula from the `geo` crate. The
//! planar approximation is only used by the proximity grid, where speed
//! matters more than accuracy.

use std::fmt;
use std::str::FromStr;

use geo::{HaversineDistance, Point};
use serde::Serialize;

use crate::error::{Error, Result};

/// Kilometres per degree used by the planar approximation.
pub const KM_PER_DEGREE: f64 = 111.0;

/// WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        self.point().haversine_distance(&other.point()) / 1000.0
    }

    /// Degree delta scaled by [`KM_PER_DEGREE`]; cheap but distorted away from the equator.
    pub fn approx_planar_km(&self, other: &Coordinates) -> f64 {
        let dlat = self.lat - other.lat;
        let dlon = self.lon - other.lon;
        (dlat * dlat + dlon * dlon).sqrt() * KM_PER_DEGREE
    }

    /// `[lat, lon]` pair as used by route geometry.
    pub fn lat_lon(&self) -> [f64; 2] {
        [self.lat, self.lon]
    }

    fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lon)
    }
}

impl FromStr for Coordinates {
    type Err = Error;

    /// Parse a `"lat,lon"` pair.
    fn from_str(value: &str) -> Result<Self> {
        let invalid = || {
            Error::invalid_request(format!(
                "invalid coordinates '{value}'; expected 'lat,lon'"
            ))
        };
        let (lat, lon) = value.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(invalid());
        }
        Ok(Self { lat, lon })
    }
}

/// Minutes needed to cover `distance_km` at `speed_kmh`.
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        return 0.0;
    }
    distance_km / speed_kmh * 60.0
}
