#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Seismic event types shared across the quakewatch workspace.
//!
//! A [`SeismicEvent`] is the unit every query operates on. Events are
//! decoded from the upstream catalog's `GeoJSON` point features and are
//! never mutated after decoding.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Errors raised while decoding a single upstream feature.
#[derive(Debug, thiserror::Error)]
pub enum FeatureDecodeError {
    /// The feature carries no point geometry.
    #[error("feature has no point geometry")]
    MissingGeometry,

    /// The point geometry has fewer than two positions.
    #[error("point geometry has {0} positions, expected at least 2")]
    ShortPosition(usize),

    /// The feature has no integer `eventId` property.
    #[error("feature has no integer eventId")]
    MissingEventId,
}

/// A geographic bounding box in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// Southern latitude boundary.
    pub min_latitude: f64,
    /// Northern latitude boundary.
    pub max_latitude: f64,
    /// Western longitude boundary.
    pub min_longitude: f64,
    /// Eastern longitude boundary.
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given bounds.
    #[must_use]
    pub const fn new(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Self {
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    /// Returns `true` if the point lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

/// Event hypocenter as `[longitude, latitude, depth_km]`.
///
/// Always serialized as a three-element array. A missing depth is `null`,
/// which is not the same as a depth of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Depth below the surface in kilometers.
    pub depth: Option<f64>,
}

impl Serialize for Coordinates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.longitude, self.latitude, self.depth).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Coordinates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (longitude, latitude, depth) = <(f64, f64, Option<f64>)>::deserialize(deserializer)?;
        Ok(Self {
            longitude,
            latitude,
            depth,
        })
    }
}

/// A single seismic event as served by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeismicEvent {
    /// Upstream event identifier.
    pub event_id: i64,
    /// Upstream origin-solution identifier.
    pub origin_id: Option<i64>,
    /// Origin time.
    pub time: Option<DateTime<Utc>>,
    /// Agency that authored the solution.
    pub author: Option<String>,
    /// Magnitude scale (`ML`, `Mw`, ...).
    pub magnitude_type: Option<String>,
    /// Event magnitude.
    pub magnitude: Option<f64>,
    /// Human-readable location description.
    pub place: Option<String>,
    /// Hypocenter.
    pub coordinates: Coordinates,
    /// Every property the upstream feature carried, untouched.
    #[serde(skip)]
    pub properties: Map<String, Value>,
}

impl SeismicEvent {
    /// Depth in kilometers, if the upstream source reported one.
    #[must_use]
    pub const fn depth(&self) -> Option<f64> {
        self.coordinates.depth
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates.longitude
    }
}

impl TryFrom<&geojson::Feature> for SeismicEvent {
    type Error = FeatureDecodeError;

    fn try_from(feature: &geojson::Feature) -> Result<Self, Self::Error> {
        let position = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(geojson::Value::Point(position)) => position,
            _ => return Err(FeatureDecodeError::MissingGeometry),
        };
        if position.len() < 2 {
            return Err(FeatureDecodeError::ShortPosition(position.len()));
        }

        let properties = feature.properties.clone().unwrap_or_default();
        let event_id =
            int_property(&properties, "eventId").ok_or(FeatureDecodeError::MissingEventId)?;

        Ok(Self {
            event_id,
            origin_id: int_property(&properties, "originId"),
            time: properties
                .get("time")
                .and_then(Value::as_str)
                .and_then(parse_event_time),
            author: string_property(&properties, "author"),
            magnitude_type: string_property(&properties, "magType"),
            magnitude: properties.get("mag").and_then(Value::as_f64),
            place: string_property(&properties, "place"),
            coordinates: Coordinates {
                longitude: position[0],
                latitude: position[1],
                depth: position.get(2).copied(),
            },
            properties,
        })
    }
}

/// Parses an upstream origin time.
///
/// FDSN services emit ISO-8601 timestamps without a zone designator
/// (`2024-01-15T08:23:11.120000`), which are UTC. Zoned RFC 3339 values
/// are accepted too.
#[must_use]
pub fn parse_event_time(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Integer property that may arrive as a JSON number or numeric string.
fn int_property(properties: &Map<String, Value>, key: &str) -> Option<i64> {
    match properties.get(key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_property(properties: &Map<String, Value>, key: &str) -> Option<String> {
    properties
        .get(key)
        .and_then(Value::as_str)
        .map(String::from)
}
