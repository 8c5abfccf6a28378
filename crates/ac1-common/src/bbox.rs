//! Geographic coverage of a dataset.

use serde::{Deserialize, Serialize};

/// Allowed latitude range in degrees north.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Allowed longitude range in degrees east. Both -180..180 and 0..360
/// conventions are accepted.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 360.0);

/// Latitude/longitude extent, as written to the `geospatial_*` attributes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBounds {
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    pub fn latitude_in_range(value: f64) -> bool {
        value >= LATITUDE_RANGE.0 && value <= LATITUDE_RANGE.1
    }

    pub fn longitude_in_range(value: f64) -> bool {
        value >= LONGITUDE_RANGE.0 && value <= LONGITUDE_RANGE.1
    }

    /// All four bounds inside the allowed ranges and ordered min <= max.
    pub fn is_valid(&self) -> bool {
        Self::latitude_in_range(self.lat_min)
            && Self::latitude_in_range(self.lat_max)
            && Self::longitude_in_range(self.lon_min)
            && Self::longitude_in_range(self.lon_max)
            && self.lat_min <= self.lat_max
            && self.lon_min <= self.lon_max
    }
}
