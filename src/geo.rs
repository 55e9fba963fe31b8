//! GeoJSON points and the bounding-box used by `GET /species/area`.
//!
//! Coordinates are always `[longitude, latitude]`, the GeoJSON order, which is
//! the reverse of the "lat, lng" most map UIs display.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PointKind {
    #[default]
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "type")]
    pub kind: PointKind,
    pub coordinates: [f64; 2],
}

impl Point {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: PointKind::Point,
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn in_range(&self) -> bool {
        (-180.0..=180.0).contains(&self.longitude()) && (-90.0..=90.0).contains(&self.latitude())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("expected 'longitude,latitude', got '{0}'")]
    Malformed(String),

    #[error("bottom-left corner must not lie above or right of the top-right corner")]
    Inverted,
}

/// Parse a `lon,lat` query value.
pub fn parse_corner(raw: &str) -> Result<(f64, f64), GeoError> {
    let malformed = || GeoError::Malformed(raw.to_string());

    let (lon, lat) = raw.split_once(',').ok_or_else(malformed)?;
    let lon: f64 = lon.trim().parse().map_err(|_| malformed())?;
    let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;

    if !lon.is_finite() || !lat.is_finite() {
        return Err(malformed());
    }
    Ok((lon, lat))
}

/// Axis-aligned rectangle in lon/lat space. Containment includes the edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub bottom_left: (f64, f64),
    pub top_right: (f64, f64),
}

impl BoundingBox {
    pub fn new(bottom_left: (f64, f64), top_right: (f64, f64)) -> Result<Self, GeoError> {
        if bottom_left.0 > top_right.0 || bottom_left.1 > top_right.1 {
            return Err(GeoError::Inverted);
        }
        Ok(Self { bottom_left, top_right })
    }

    pub fn parse(bottom_left: &str, top_right: &str) -> Result<Self, GeoError> {
        Self::new(parse_corner(bottom_left)?, parse_corner(top_right)?)
    }

    pub fn contains(&self, point: &Point) -> bool {
        let (lon, lat) = (point.longitude(), point.latitude());
        lon >= self.bottom_left.0
            && lon <= self.top_right.0
            && lat >= self.bottom_left.1
            && lat <= self.top_right.1
    }
}
