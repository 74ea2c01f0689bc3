//! Points of interest and the geographic primitives they are drawn with.

use crate::error::{Result, TourMapError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a point within one tour
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PointId {
    Num(i64),
    Text(String),
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointId::Num(n) => write!(f, "{n}"),
            PointId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for PointId {
    fn from(n: i64) -> Self {
        PointId::Num(n)
    }
}

impl From<&str> for PointId {
    fn from(s: &str) -> Self {
        PointId::Text(s.to_string())
    }
}

/// Which half of a coordinate pair failed to parse
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Latitude => "latitude",
            Axis::Longitude => "longitude",
        })
    }
}

/// A geographic coordinate in degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Smallest lat/lng rectangle covering a set of coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl LatLngBounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south: p.lat,
            west: p.lng,
            north: p.lat,
            east: p.lng,
        }
    }

    /// Bounds of all coordinates, `None` when the iterator is empty
    pub fn from_coords(coords: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut iter = coords.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::from_point(first);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south = self.south.min(p.lat);
        self.north = self.north.max(p.lat);
        self.west = self.west.min(p.lng);
        self.east = self.east.max(p.lng);
    }

    pub fn center(&self) -> LatLng {
        LatLng::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn south_west(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    pub fn north_east(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }
}

/// A point of interest as supplied by the point store.
///
/// Coordinates arrive as text and are only trusted after [`Point::coordinates`]
/// has parsed them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub id: PointId,
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Point {
    pub fn new(
        id: impl Into<PointId>,
        name: impl Into<String>,
        latitude: impl Into<String>,
        longitude: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            latitude: latitude.into(),
            longitude: longitude.into(),
            order: None,
            description: None,
        }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    /// Parse both axes; each must be a finite number
    pub fn coordinates(&self) -> Result<LatLng> {
        let lat = self.parse_axis(&self.latitude, Axis::Latitude)?;
        let lng = self.parse_axis(&self.longitude, Axis::Longitude)?;
        Ok(LatLng::new(lat, lng))
    }

    fn parse_axis(&self, raw: &str, axis: Axis) -> Result<f64> {
        match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(TourMapError::InvalidCoordinate {
                id: self.id.clone(),
                axis,
                raw: raw.to_string(),
            }),
        }
    }

    /// Position in the tour; unordered points sort as 0
    pub fn sort_key(&self) -> i64 {
        self.order.unwrap_or(0)
    }

    /// Marker label: the order number, empty when unordered
    pub fn label(&self) -> String {
        self.order.map(|o| o.to_string()).unwrap_or_default()
    }
}
