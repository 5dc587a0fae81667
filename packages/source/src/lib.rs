#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Upstream seismic catalog adapter.
//!
//! The catalog is an FDSN event web service that answers `GeoJSON`
//! feature collections. It supports time windows and rectangular
//! bounding boxes but no radius search and no pagination, so every query
//! pulls its whole window in a single request.
//!
//! Each data provider implements the [`EventSource`] trait. The production
//! implementation is [`http::HttpEventSource`].

pub mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quakewatch_event_models::{BoundingBox, SeismicEvent};

/// Default FDSN event endpoint (INGV, Italy).
pub const DEFAULT_UPSTREAM_URL: &str = "https://webservices.ingv.it/fdsnws/event/1/query";

/// Timestamp layout the FDSN `starttime`/`endtime` parameters expect.
const FDSN_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Errors that can occur while fetching from the upstream catalog.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream catalog answered with a non-success status.
    #[error("Upstream request failed: {status} {reason}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        reason: String,
    },

    /// The response body is not a `GeoJSON` feature collection.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configured base URL could not be combined with the query.
    #[error("Invalid upstream URL '{url}': {message}")]
    InvalidUrl {
        /// The offending base URL.
        url: String,
        /// Parser message.
        message: String,
    },
}

/// A single upstream fetch: a time window plus an optional bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamQuery {
    /// Inclusive window start.
    pub start: DateTime<Utc>,
    /// Inclusive window end.
    pub end: DateTime<Utc>,
    /// Rectangular pre-filter applied by the catalog.
    pub bbox: Option<BoundingBox>,
}

impl UpstreamQuery {
    /// Creates a query for the given window without a bounding box.
    #[must_use]
    pub const fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            bbox: None,
        }
    }

    /// Restricts the query to a bounding box.
    #[must_use]
    pub const fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// FDSN query parameters, in a stable order.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("starttime", self.start.format(FDSN_TIME_FORMAT).to_string()),
            ("endtime", self.end.format(FDSN_TIME_FORMAT).to_string()),
        ];
        if let Some(bbox) = &self.bbox {
            params.push(("minlatitude", bbox.min_latitude.to_string()));
            params.push(("maxlatitude", bbox.max_latitude.to_string()));
            params.push(("minlongitude", bbox.min_longitude.to_string()));
            params.push(("maxlongitude", bbox.max_longitude.to_string()));
        }
        params.push(("format", "geojson".to_string()));
        params
    }

    /// Assembles the full request URL against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if `base_url` is not a valid URL.
    pub fn to_url(&self, base_url: &str) -> Result<String, SourceError> {
        reqwest::Url::parse_with_params(base_url, self.params())
            .map(String::from)
            .map_err(|e| SourceError::InvalidUrl {
                url: base_url.to_string(),
                message: e.to_string(),
            })
    }
}

/// Trait that all upstream event sources must implement.
///
/// An implementation performs exactly one round trip per call: no
/// retries, no caching, no filtering beyond what the query carries.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetches every event in the query window.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails, the catalog answers
    /// with a non-success status, or the body cannot be parsed.
    async fn fetch(&self, query: &UpstreamQuery) -> Result<Vec<SeismicEvent>, SourceError>;
}

/// Parses a `GeoJSON` feature collection body into events.
///
/// An empty body is an empty collection. Features that cannot be decoded
/// (no point geometry, no event id) are skipped with a warning.
///
/// # Errors
///
/// Returns [`SourceError::Json`] if the body is not a feature collection.
pub fn parse_feature_collection(body: &str) -> Result<Vec<SeismicEvent>, SourceError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }

    let collection: geojson::FeatureCollection = serde_json::from_str(body)?;
    let mut skipped = 0usize;
    let events: Vec<SeismicEvent> = collection
        .features
        .iter()
        .filter_map(|feature| match SeismicEvent::try_from(feature) {
            Ok(event) => Some(event),
            Err(e) => {
                skipped += 1;
                log::debug!("Skipping upstream feature {:?}: {e}", feature.id);
                None
            }
        })
        .collect();

    if skipped > 0 {
        log::warn!(
            "Skipped {skipped} of {} upstream features that could not be decoded",
            collection.features.len()
        );
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;

    fn query() -> UpstreamQuery {
        UpstreamQuery::window(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap(),
        )
    }

    #[test]
    fn params_without_bbox() {
        let params = query().params();
        assert_eq!(
            params,
            vec![
                ("starttime", "2024-01-01T00:00:00".to_string()),
                ("endtime", "2024-01-31T23:59:59".to_string()),
                ("format", "geojson".to_string()),
            ]
        );
    }

    #[test]
    fn params_with_bbox() {
        let params = query()
            .with_bbox(BoundingBox::new(37.91, 40.14, 15.63, 17.21))
            .params();
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            [
                "starttime",
                "endtime",
                "minlatitude",
                "maxlatitude",
                "minlongitude",
                "maxlongitude",
                "format"
            ]
        );
        assert_eq!(params[2].1, "37.91");
        assert_eq!(params[5].1, "17.21");
    }

    #[test]
    fn url_is_assembled_and_encoded() {
        let url = query().to_url(DEFAULT_UPSTREAM_URL).unwrap();
        assert!(url.starts_with("https://webservices.ingv.it/fdsnws/event/1/query?"));
        assert!(url.contains("starttime=2024-01-01T00%3A00%3A00"));
        assert!(url.ends_with("format=geojson"));
    }

    #[test]
    fn invalid_base_url() {
        assert!(matches!(
            query().to_url("not a url"),
            Err(SourceError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn parses_collection_and_skips_bad_features() {
        let body = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "eventId": 10, "mag": 1.5, "time": "2024-01-02T03:04:05" },
                    "geometry": { "type": "Point", "coordinates": [13.0, 42.0, 8.0] }
                },
                {
                    "type": "Feature",
                    "properties": { "mag": 2.0 },
                    "geometry": { "type": "Point", "coordinates": [13.0, 42.0, 8.0] }
                }
            ]
        })
        .to_string();

        let events = parse_feature_collection(&body).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, 10);
    }

    #[test]
    fn empty_collection_and_empty_body() {
        let body = r#"{"type":"FeatureCollection","features":[]}"#;
        assert!(parse_feature_collection(body).unwrap().is_empty());
        assert!(parse_feature_collection("  ").unwrap().is_empty());
    }

    #[test]
    fn garbage_body_is_an_error() {
        assert!(matches!(
            parse_feature_collection("<html>oops</html>"),
            Err(SourceError::Json(_))
        ));
    }
}
