//! Per-intent query orchestration.
//!
//! Each public method is one linear flow: validate → build the upstream
//! query → fetch → local filter → [`pipeline::process`]. Validation always
//! completes before the fetch, so a bad parameter never costs an upstream
//! round trip.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use quakewatch_event_models::SeismicEvent;
use quakewatch_source::{EventSource, UpstreamQuery};
use quakewatch_spatial::{GeoPoint, radius_bounding_box, within_radius};

use crate::params::{self, ListOptions};
use crate::profile::Intent;
use crate::window::{self, Window};
use crate::{
    DateRangeParams, EventPage, ListParams, LocationParams, MonthParams, QueryError, pipeline,
};

/// Radius used by the proximity intent when the caller sends none.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Answers seismic event queries against an upstream [`EventSource`].
///
/// Holds no per-request state; one instance is shared across all
/// requests.
#[derive(Clone)]
pub struct QueryEngine {
    source: Arc<dyn EventSource>,
    clock: Arc<dyn Clock>,
}

impl QueryEngine {
    /// Creates an engine using the system clock.
    #[must_use]
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self::with_clock(source, Arc::new(SystemClock))
    }

    /// Creates an engine with an explicit clock.
    #[must_use]
    pub fn with_clock(source: Arc<dyn EventSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }

    fn year_to_date(&self) -> Window {
        window::year_to_date(self.clock.now())
    }

    /// Fetches `query`, applies `filter`, then runs the result pipeline.
    async fn run<F>(
        &self,
        intent: Intent,
        query: UpstreamQuery,
        options: &ListOptions,
        filter: F,
    ) -> Result<EventPage, QueryError>
    where
        F: FnOnce(Vec<SeismicEvent>) -> Vec<SeismicEvent> + Send,
    {
        log::debug!(
            "{intent}: fetching {} .. {} (bbox={:?})",
            query.start,
            query.end,
            query.bbox
        );
        let fetched = self.source.fetch(&query).await?;
        let fetched_count = fetched.len();

        let filtered = filter(fetched);
        log::debug!(
            "{intent}: {} of {fetched_count} events kept after local filtering",
            filtered.len()
        );

        Ok(pipeline::process(filtered, intent.profile(), options))
    }

    /// Events from the start of the current year until now.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if validation or the upstream fetch fails.
    pub async fn recent(&self, list: &ListParams) -> Result<EventPage, QueryError> {
        let options = ListOptions::parse(list)?;
        let (start, end) = self.year_to_date();
        self.run(
            Intent::Recent,
            UpstreamQuery::window(start, end),
            &options,
            |events| events,
        )
        .await
    }

    /// Events from 00:00:00 to 23:59:59 today (UTC).
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if validation or the upstream fetch fails.
    pub async fn today(&self, list: &ListParams) -> Result<EventPage, QueryError> {
        let options = ListOptions::parse(list)?;
        let (start, end) = window::today(self.clock.now());
        self.run(
            Intent::Today,
            UpstreamQuery::window(start, end),
            &options,
            |events| events,
        )
        .await
    }

    /// Events from the last seven days.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if validation or the upstream fetch fails.
    pub async fn last_week(&self, list: &ListParams) -> Result<EventPage, QueryError> {
        let options = ListOptions::parse(list)?;
        let (start, end) = window::last_week(self.clock.now());
        self.run(
            Intent::LastWeek,
            UpstreamQuery::window(start, end),
            &options,
            |events| events,
        )
        .await
    }

    /// Events within one calendar month.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if `year` or `month` is missing or
    /// malformed, or an upstream error if the fetch fails.
    pub async fn month(
        &self,
        params: &MonthParams,
        list: &ListParams,
    ) -> Result<EventPage, QueryError> {
        let year = params::required_year("year", params.year.as_deref())?;
        let month = params::required_month("month", params.month.as_deref())?;
        let options = ListOptions::parse(list)?;
        let (start, end) = window::month(year, month)?;
        self.run(
            Intent::Month,
            UpstreamQuery::window(start, end),
            &options,
            |events| events,
        )
        .await
    }

    /// Events between two calendar days (inclusive), optionally bounded by
    /// a minimum magnitude and a maximum depth.
    ///
    /// Events without a magnitude (or depth) are excluded when the
    /// corresponding bound is given.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if a date is malformed, `startdate`
    /// is after `enddate`, or a bound is not a non-negative number.
    pub async fn date_range(
        &self,
        params: &DateRangeParams,
        list: &ListParams,
    ) -> Result<EventPage, QueryError> {
        let start = params::required_iso_date("startdate", params.start_date.as_deref())?;
        let end = params::required_iso_date("enddate", params.end_date.as_deref())?;
        let min_magnitude =
            params::optional_non_negative_number("minmag", params.min_magnitude.as_deref())?;
        let max_depth =
            params::optional_non_negative_number("maxdepth", params.max_depth.as_deref())?;
        let options = ListOptions::parse(list)?;
        let (start, end) = window::date_range(start, end)?;

        self.run(
            Intent::DateRange,
            UpstreamQuery::window(start, end),
            &options,
            move |events| {
                events
                    .into_iter()
                    .filter(|e| {
                        min_magnitude.is_none_or(|min| e.magnitude.is_some_and(|m| m >= min))
                    })
                    .filter(|e| max_depth.is_none_or(|max| e.depth().is_some_and(|d| d <= max)))
                    .collect()
            },
        )
        .await
    }

    /// Year-to-date events inside a named region's bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if `region` is missing,
    /// [`QueryError::UnsupportedRegion`] if it is not registered, or an
    /// upstream error if the fetch fails.
    pub async fn region(
        &self,
        region: Option<&str>,
        list: &ListParams,
    ) -> Result<EventPage, QueryError> {
        let name = params::required("region", region)?;
        let bbox = quakewatch_region::lookup(name).map_err(|e| match e {
            quakewatch_region::RegionError::NotFound(region) => QueryError::UnsupportedRegion {
                region,
                supported: quakewatch_region::names().to_vec(),
            },
        })?;
        let options = ListOptions::parse(list)?;
        let (start, end) = self.year_to_date();
        self.run(
            Intent::Region,
            UpstreamQuery::window(start, end).with_bbox(bbox),
            &options,
            |events| events,
        )
        .await
    }

    /// Year-to-date events at or deeper than `depth` km.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if `depth` is missing, not numeric
    /// or not positive, or an upstream error if the fetch fails.
    pub async fn depth(
        &self,
        depth: Option<&str>,
        list: &ListParams,
    ) -> Result<EventPage, QueryError> {
        let threshold = params::required_positive_number("depth", depth)?;
        let options = ListOptions::parse(list)?;
        let (start, end) = self.year_to_date();
        self.run(
            Intent::Depth,
            UpstreamQuery::window(start, end),
            &options,
            move |events| {
                events
                    .into_iter()
                    .filter(|e| e.depth().is_some_and(|d| d >= threshold))
                    .collect()
            },
        )
        .await
    }

    /// Year-to-date events with magnitude strictly greater than `mag`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if `mag` is missing, not numeric
    /// or not positive, or an upstream error if the fetch fails.
    pub async fn magnitude(
        &self,
        magnitude: Option<&str>,
        list: &ListParams,
    ) -> Result<EventPage, QueryError> {
        let threshold = params::required_positive_number("mag", magnitude)?;
        let options = ListOptions::parse(list)?;
        let (start, end) = self.year_to_date();
        self.run(
            Intent::Magnitude,
            UpstreamQuery::window(start, end),
            &options,
            move |events| {
                events
                    .into_iter()
                    .filter(|e| e.magnitude.is_some_and(|m| m > threshold))
                    .collect()
            },
        )
        .await
    }

    /// Year-to-date events within `radius` km of a point.
    ///
    /// The upstream query carries a degree-approximated box around the
    /// point; the exact great-circle radius is applied locally.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if a coordinate is missing or out
    /// of range or `radius` is not positive, or an upstream error if the
    /// fetch fails.
    pub async fn location(
        &self,
        params: &LocationParams,
        list: &ListParams,
    ) -> Result<EventPage, QueryError> {
        let latitude =
            params::required_number_in_range("latitude", params.latitude.as_deref(), -90.0, 90.0)?;
        let longitude = params::required_number_in_range(
            "longitude",
            params.longitude.as_deref(),
            -180.0,
            180.0,
        )?;
        let radius_km = params::optional_positive_number("radius", params.radius.as_deref())?
            .unwrap_or(DEFAULT_RADIUS_KM);
        let options = ListOptions::parse(list)?;

        let origin = GeoPoint::new(latitude, longitude);
        let (start, end) = self.year_to_date();
        self.run(
            Intent::Location,
            UpstreamQuery::window(start, end).with_bbox(radius_bounding_box(origin, radius_km)),
            &options,
            move |events| within_radius(origin, radius_km, events),
        )
        .await
    }

    /// A single year-to-date event by its upstream id.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Validation`] if `eventId` is not a positive
    /// integer, [`QueryError::NotFound`] if no event matches, or an
    /// upstream error if the fetch fails.
    pub async fn by_event_id(&self, event_id: Option<&str>) -> Result<EventPage, QueryError> {
        let event_id = params::required_positive_int("eventId", event_id)?;
        let (start, end) = self.year_to_date();
        let page = self
            .run(
                Intent::EventId,
                UpstreamQuery::window(start, end),
                &ListOptions::default(),
                move |events| {
                    events
                        .into_iter()
                        .filter(|e| e.event_id == event_id)
                        .collect()
                },
            )
            .await?;

        if page.total_fetched == 0 {
            return Err(QueryError::NotFound {
                message: format!("No earthquake found with eventId {event_id}"),
            });
        }
        Ok(page)
    }
}
