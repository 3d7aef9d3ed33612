//! Core data models for citymap
//!
//! This module contains the types shared between the place input, the
//! geocoding client and the location cache.

pub mod arcgis;
pub mod places;

pub use arcgis::{ArcGisClient, GeocodeError, Geocoder, ARCGIS_FIND_URL};
pub use places::{parse_places, read_places, PlaceRow};

use serde::{Deserialize, Serialize};

/// Raw coordinates as returned by the geocoding service
///
/// `x` is the longitude and `y` the latitude, both in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn latitude(&self) -> f64 {
        self.y
    }

    pub fn longitude(&self) -> f64 {
        self.x
    }
}

/// The first match returned by the geocoder for a query
///
/// No confidence filtering is applied: whatever the service ranks first is
/// accepted, and its score is kept alongside the coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Coordinates of the match
    pub location: Point,
    /// Address string the service matched, if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Match score (0-100 for ArcGIS), if reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Candidate {
    /// Creates a candidate carrying only coordinates
    pub fn at(location: Point) -> Self {
        Self {
            location,
            address: None,
            score: None,
        }
    }
}
