#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Proximity filtering for seismic events.
//!
//! The upstream catalog only understands rectangular bounding boxes, so a
//! point-radius query runs in two stages: [`radius_bounding_box`] builds a
//! coarse box sent upstream, then [`within_radius`] trims the result to
//! the exact great-circle circle.

use geo::{Distance, Haversine, Point};
use quakewatch_event_models::{BoundingBox, SeismicEvent};

/// Approximate length of one degree of latitude, in kilometers.
pub const KM_PER_DEGREE: f64 = 111.0;

/// A latitude/longitude pair in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn to_geo(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

/// Great-circle distance between two points, in kilometers.
#[must_use]
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    Haversine.distance(from.to_geo(), to.to_geo()) / 1000.0
}

/// Coarse box of `radius_km / 111` degrees around `origin`.
///
/// Longitude uses the same degree span as latitude, so away from the
/// equator the box is narrower than the circle east and west of the
/// origin. It only trims the upstream response; [`within_radius`] applies
/// the exact radius afterwards. Bounds are clamped to valid coordinates.
#[must_use]
pub fn radius_bounding_box(origin: GeoPoint, radius_km: f64) -> BoundingBox {
    let delta = radius_km / KM_PER_DEGREE;
    BoundingBox::new(
        (origin.latitude - delta).max(-90.0),
        (origin.latitude + delta).min(90.0),
        (origin.longitude - delta).max(-180.0),
        (origin.longitude + delta).min(180.0),
    )
}

/// Keeps the events whose epicenter lies within `radius_km` of `origin`.
#[must_use]
pub fn within_radius(
    origin: GeoPoint,
    radius_km: f64,
    candidates: Vec<SeismicEvent>,
) -> Vec<SeismicEvent> {
    let before = candidates.len();
    let kept: Vec<SeismicEvent> = candidates
        .into_iter()
        .filter(|event| {
            let epicenter = GeoPoint::new(event.latitude(), event.longitude());
            haversine_km(origin, epicenter) <= radius_km
        })
        .collect();

    log::debug!(
        "Radius filter {radius_km} km kept {} of {before} events",
        kept.len()
    );
    kept
}
