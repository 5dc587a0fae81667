#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Seismic event query and aggregation engine.
//!
//! Every query intent (recent, today, month, region, proximity, ...) runs
//! the same linear flow in [`engine::QueryEngine`]:
//!
//! 1. validate the caller's raw parameters ([`params`]),
//! 2. build one [`UpstreamQuery`](quakewatch_source::UpstreamQuery) and
//!    fetch it,
//! 3. apply the filters the upstream catalog cannot express (depth and
//!    magnitude thresholds, exact radius, event id),
//! 4. run the result [`pipeline`]: [`sort`], [`project`], [`paginate`].
//!
//! The upstream catalog has no native pagination, so each intent holds its
//! whole filtered window in memory before slicing a page out of it. That
//! is the one place a cache or streaming layer would attach.

pub mod engine;
pub mod paginate;
pub mod params;
pub mod pipeline;
pub mod profile;
pub mod project;
pub mod sort;
pub mod window;

pub use engine::{Clock, QueryEngine, SystemClock};
pub use paginate::{MAX_LIMIT, Page};
pub use profile::Intent;
pub use project::EventRecord;

use quakewatch_source::SourceError;

/// A page of processed events, as returned by every intent.
pub type EventPage = Page<EventRecord>;

/// Errors that can occur while answering a query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// A caller-supplied parameter is missing or malformed.
    #[error("{message}")]
    Validation {
        /// Name of the offending query parameter.
        field: &'static str,
        /// Human-readable description.
        message: String,
    },

    /// The requested region is not in the registry.
    #[error("Unsupported region '{region}'. Supported regions: {}", .supported.join(", "))]
    UnsupportedRegion {
        /// The normalized region name as requested.
        region: String,
        /// Every supported region name.
        supported: Vec<String>,
    },

    /// A single-event lookup matched nothing.
    #[error("{message}")]
    NotFound {
        /// Human-readable description.
        message: String,
    },

    /// The upstream catalog fetch failed.
    #[error(transparent)]
    Upstream(#[from] SourceError),
}

impl QueryError {
    /// Creates a [`QueryError::Validation`].
    #[must_use]
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Returns `true` if the caller is at fault.
    #[must_use]
    pub const fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::UnsupportedRegion { .. } | Self::NotFound { .. }
        )
    }
}

/// Raw list parameters shared by every paginated intent.
///
/// Values are kept as the caller sent them; each intent validates them
/// before any upstream call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size, capped at [`MAX_LIMIT`].
    pub limit: Option<String>,
    /// Comma-separated sort keys, `-` prefix for descending.
    pub sort: Option<String>,
    /// Comma-separated projection fields.
    pub fields: Option<String>,
}

/// Raw parameters for the calendar month intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthParams {
    /// Four-digit year.
    pub year: Option<String>,
    /// Month number, 1-12.
    pub month: Option<String>,
}

/// Raw parameters for the explicit date range intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRangeParams {
    /// First day, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Last day (inclusive), `YYYY-MM-DD`.
    pub end_date: Option<String>,
    /// Minimum magnitude (inclusive).
    pub min_magnitude: Option<String>,
    /// Maximum depth in km (inclusive).
    pub max_depth: Option<String>,
}

/// Raw parameters for the proximity intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationParams {
    /// Reference latitude.
    pub latitude: Option<String>,
    /// Reference longitude.
    pub longitude: Option<String>,
    /// Radius in km, defaults to [`engine::DEFAULT_RADIUS_KM`].
    pub radius: Option<String>,
}
