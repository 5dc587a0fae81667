#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the quakewatch server.
//!
//! Query-string types keep every value as the caller sent it (`Option<String>`)
//! so that malformed input reaches the query engine's validation instead of
//! failing inside the extractor with a less specific message.

use quakewatch_query::{
    DateRangeParams, EventPage, EventRecord, ListParams, LocationParams, MonthParams,
};
use serde::{Deserialize, Serialize};

/// Pagination, sort and projection parameters shared by every list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQueryParams {
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size.
    pub limit: Option<String>,
    /// Comma-separated sort keys, `-` prefix for descending.
    pub sort: Option<String>,
    /// Comma-separated projection fields.
    pub fields: Option<String>,
}

impl From<ListQueryParams> for ListParams {
    fn from(params: ListQueryParams) -> Self {
        Self {
            page: params.page,
            limit: params.limit,
            sort: params.sort,
            fields: params.fields,
        }
    }
}

/// Query parameters for `/earthquakes/month`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthQueryParams {
    /// Four-digit year.
    pub year: Option<String>,
    /// Month number, 1-12.
    pub month: Option<String>,
}

impl From<MonthQueryParams> for MonthParams {
    fn from(params: MonthQueryParams) -> Self {
        Self {
            year: params.year,
            month: params.month,
        }
    }
}

/// Query parameters for `/earthquakes/range-time`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateRangeQueryParams {
    /// First day, `YYYY-MM-DD`.
    #[serde(rename = "startdate")]
    pub start_date: Option<String>,
    /// Last day (inclusive), `YYYY-MM-DD`.
    #[serde(rename = "enddate")]
    pub end_date: Option<String>,
    /// Minimum magnitude.
    #[serde(rename = "minmag")]
    pub min_magnitude: Option<String>,
    /// Maximum depth in km.
    #[serde(rename = "maxdepth")]
    pub max_depth: Option<String>,
}

impl From<DateRangeQueryParams> for DateRangeParams {
    fn from(params: DateRangeQueryParams) -> Self {
        Self {
            start_date: params.start_date,
            end_date: params.end_date,
            min_magnitude: params.min_magnitude,
            max_depth: params.max_depth,
        }
    }
}

/// Query parameters for `/earthquakes/region`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionQueryParams {
    /// Italian region name, case insensitive.
    pub region: Option<String>,
}

/// Query parameters for `/earthquakes/depth`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepthQueryParams {
    /// Minimum depth in km.
    pub depth: Option<String>,
}

/// Query parameters for `/earthquakes/magnitude`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MagnitudeQueryParams {
    /// Exclusive lower magnitude bound.
    pub mag: Option<String>,
}

/// Query parameters for `/earthquakes/eventId`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventIdQueryParams {
    /// Upstream event id.
    #[serde(rename = "eventId")]
    pub event_id: Option<String>,
}

/// Query parameters for `/earthquakes/location`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQueryParams {
    /// Reference latitude in degrees.
    pub latitude: Option<String>,
    /// Reference longitude in degrees.
    pub longitude: Option<String>,
    /// Radius in km.
    pub radius: Option<String>,
}

impl From<LocationQueryParams> for LocationParams {
    fn from(params: LocationQueryParams) -> Self {
        Self {
            latitude: params.latitude,
            longitude: params.longitude,
            radius: params.radius,
        }
    }
}

/// Pagination metadata attached to every list response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPagination {
    /// Effective page number.
    pub page: usize,
    /// Number of pages.
    pub total_pages: usize,
    /// Effective page size.
    pub limit: usize,
    /// Whether a later page exists.
    pub has_more: bool,
}

/// Successful response envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable summary of the query.
    pub message: String,
    /// Events on this page, full or projected.
    pub payload: Vec<EventRecord>,
    /// Events matching the query across all pages.
    pub total_earthquakes: usize,
    /// Where this page sits in the full result.
    pub pagination: ApiPagination,
}

impl ApiResponse {
    /// Wraps a processed page.
    #[must_use]
    pub fn from_page(message: impl Into<String>, page: EventPage) -> Self {
        Self {
            success: true,
            message: message.into(),
            total_earthquakes: page.total_fetched,
            pagination: ApiPagination {
                page: page.page,
                total_pages: page.total_pages,
                limit: page.limit,
                has_more: page.has_more,
            },
            payload: page.items,
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Always `false`.
    pub success: bool,
    /// HTTP status code.
    pub code: u16,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    /// Creates an error envelope for the given status code.
    #[must_use]
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use quakewatch_query::Page;
    use serde_json::json;

    #[test]
    fn envelope_uses_camel_case_and_page_metadata() {
        let page: EventPage = Page {
            items: Vec::new(),
            page: 2,
            limit: 10,
            total_pages: 3,
            total_fetched: 25,
            has_more: true,
        };
        let value = serde_json::to_value(ApiResponse::from_page("ok", page)).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "message": "ok",
                "payload": [],
                "totalEarthquakes": 25,
                "pagination": { "page": 2, "totalPages": 3, "limit": 10, "hasMore": true },
            })
        );
    }

    #[test]
    fn error_envelope() {
        let value = serde_json::to_value(ApiError::new(404, "gone")).unwrap();
        assert_eq!(value, json!({ "success": false, "code": 404, "message": "gone" }));
    }

    #[test]
    fn date_range_params_use_wire_names() {
        let params: DateRangeQueryParams = serde_json::from_value(json!({
            "startdate": "2024-01-01",
            "enddate": "2024-01-31",
            "minmag": "2.5",
        }))
        .unwrap();
        let params = DateRangeParams::from(params);
        assert_eq!(params.start_date.as_deref(), Some("2024-01-01"));
        assert_eq!(params.end_date.as_deref(), Some("2024-01-31"));
        assert_eq!(params.min_magnitude.as_deref(), Some("2.5"));
        assert_eq!(params.max_depth, None);
    }

    #[test]
    fn event_id_param_is_camel_case() {
        let params: EventIdQueryParams =
            serde_json::from_value(json!({ "eventId": "38457211" })).unwrap();
        assert_eq!(params.event_id.as_deref(), Some("38457211"));
    }
}
