//! Geographic position — the value the location collaborator hands to the
//! dispatcher.
//!
//! A position is two f64 degrees. Validation lives in [`Position::new`];
//! code that receives coordinates from outside (API ingest, config files)
//! goes through it, code that already holds a trusted pair may build the
//! struct directly.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mean Earth radius in meters, for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
  pub lat: f64,
  pub lon: f64,
}

impl Position {
  /// Build a position, rejecting out-of-range or non-finite coordinates.
  pub fn new(lat: f64, lon: f64) -> Result<Self> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
      return Err(Error::LatitudeOutOfRange(lat));
    }
    if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
      return Err(Error::LongitudeOutOfRange(lon));
    }
    Ok(Self { lat, lon })
  }

  /// Great-circle distance to `other` in meters (haversine).
  pub fn distance_meters(&self, other: Position) -> f64 {
    let d_lat = (other.lat - self.lat).to_radians();
    let d_lon = (other.lon - self.lon).to_radians();
    let lat1  = self.lat.to_radians();
    let lat2  = other.lat.to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
      + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
  }

  /// Google Maps search URL for this position, as shown by the dashboard.
  pub fn maps_url(&self) -> String {
    format!(
      "https://www.google.com/maps/search/?api=1&query={},{}",
      self.lat, self.lon
    )
  }
}
