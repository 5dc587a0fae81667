//! HTTP handler functions for the quakewatch API.
//!
//! Each `/earthquakes` handler forwards its raw query string to one
//! [`QueryEngine`](quakewatch_query::QueryEngine) intent and wraps the
//! result. Errors are translated to status codes in [`error_response`]
//! only.

use actix_web::error::{InternalError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use quakewatch_query::{EventPage, Intent, QueryError};
use quakewatch_server_models::{
    ApiError, ApiHealth, ApiResponse, DateRangeQueryParams, DepthQueryParams,
    EventIdQueryParams, ListQueryParams, LocationQueryParams, MagnitudeQueryParams,
    MonthQueryParams, RegionQueryParams,
};
use quakewatch_source::SourceError;

use crate::AppState;

/// Sent instead of the real message for failures that are not the
/// caller's to see.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /earthquakes/recent`
pub async fn recent(state: web::Data<AppState>, list: web::Query<ListQueryParams>) -> HttpResponse {
    let result = state.engine.recent(&list.into_inner().into()).await;
    respond(
        Intent::Recent,
        "Earthquakes from the start of the year until now",
        result,
    )
}

/// `GET /earthquakes/today`
pub async fn today(state: web::Data<AppState>, list: web::Query<ListQueryParams>) -> HttpResponse {
    let result = state.engine.today(&list.into_inner().into()).await;
    respond(Intent::Today, "Earthquakes from today", result)
}

/// `GET /earthquakes/last-week`
pub async fn last_week(
    state: web::Data<AppState>,
    list: web::Query<ListQueryParams>,
) -> HttpResponse {
    let result = state.engine.last_week(&list.into_inner().into()).await;
    respond(Intent::LastWeek, "Earthquakes from the last seven days", result)
}

/// `GET /earthquakes/month`
pub async fn month(
    state: web::Data<AppState>,
    params: web::Query<MonthQueryParams>,
    list: web::Query<ListQueryParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let message = format!(
        "Earthquakes from month {} of {}",
        params.month.as_deref().unwrap_or_default().trim(),
        params.year.as_deref().unwrap_or_default().trim(),
    );
    let result = state
        .engine
        .month(&params.into(), &list.into_inner().into())
        .await;
    respond(Intent::Month, message, result)
}

/// `GET /earthquakes/range-time`
pub async fn range_time(
    state: web::Data<AppState>,
    params: web::Query<DateRangeQueryParams>,
    list: web::Query<ListQueryParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let message = format!(
        "Earthquakes from {} to {}",
        params.start_date.as_deref().unwrap_or_default().trim(),
        params.end_date.as_deref().unwrap_or_default().trim(),
    );
    let result = state
        .engine
        .date_range(&params.into(), &list.into_inner().into())
        .await;
    respond(Intent::DateRange, message, result)
}

/// `GET /earthquakes/region`
pub async fn region(
    state: web::Data<AppState>,
    params: web::Query<RegionQueryParams>,
    list: web::Query<ListQueryParams>,
) -> HttpResponse {
    let region = params.region.as_deref();
    let result = state
        .engine
        .region(region, &list.into_inner().into())
        .await;
    let message = format!(
        "Earthquakes in {} from the start of the year until now",
        region.unwrap_or_default().trim(),
    );
    respond(Intent::Region, message, result)
}

/// `GET /earthquakes/depth`
pub async fn depth(
    state: web::Data<AppState>,
    params: web::Query<DepthQueryParams>,
    list: web::Query<ListQueryParams>,
) -> HttpResponse {
    let depth = params.depth.as_deref();
    let result = state.engine.depth(depth, &list.into_inner().into()).await;
    let message = format!(
        "Earthquakes at a depth of {} km or more",
        depth.unwrap_or_default().trim(),
    );
    respond(Intent::Depth, message, result)
}

/// `GET /earthquakes/magnitude`
pub async fn magnitude(
    state: web::Data<AppState>,
    params: web::Query<MagnitudeQueryParams>,
    list: web::Query<ListQueryParams>,
) -> HttpResponse {
    let magnitude = params.mag.as_deref();
    let result = state
        .engine
        .magnitude(magnitude, &list.into_inner().into())
        .await;
    let message = format!(
        "Earthquakes with magnitude greater than {}",
        magnitude.unwrap_or_default().trim(),
    );
    respond(Intent::Magnitude, message, result)
}

/// `GET /earthquakes/location`
pub async fn location(
    state: web::Data<AppState>,
    params: web::Query<LocationQueryParams>,
    list: web::Query<ListQueryParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let message = format!(
        "Earthquakes near {}, {}",
        params.latitude.as_deref().unwrap_or_default().trim(),
        params.longitude.as_deref().unwrap_or_default().trim(),
    );
    let result = state
        .engine
        .location(&params.into(), &list.into_inner().into())
        .await;
    respond(Intent::Location, message, result)
}

/// `GET /earthquakes/eventId`
pub async fn event_id(
    state: web::Data<AppState>,
    params: web::Query<EventIdQueryParams>,
) -> HttpResponse {
    let event_id = params.event_id.as_deref();
    let result = state.engine.by_event_id(event_id).await;
    let message = format!(
        "Earthquake with eventId {}",
        event_id.unwrap_or_default().trim()
    );
    respond(Intent::EventId, message, result)
}

/// Rejects a query string that cannot be deserialized at all (e.g. a
/// repeated key) with the same JSON error envelope the handlers use.
pub fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let message = err.to_string();
    log::warn!("Rejected query string: {message}");
    let response = HttpResponse::BadRequest().json(ApiError::new(
        StatusCode::BAD_REQUEST.as_u16(),
        message,
    ));
    InternalError::from_response(err, response).into()
}

fn respond(
    intent: Intent,
    message: impl Into<String>,
    result: Result<EventPage, QueryError>,
) -> HttpResponse {
    match result {
        Ok(page) => {
            log::debug!(
                "{intent}: page {}/{} of {} events",
                page.page,
                page.total_pages,
                page.total_fetched
            );
            HttpResponse::Ok().json(ApiResponse::from_page(message, page))
        }
        Err(e) => error_response(intent, &e),
    }
}

/// Maps a [`QueryError`] to its status code and error envelope.
///
/// Upstream status failures echo the upstream status line. Any other
/// upstream failure gets [`INTERNAL_ERROR_MESSAGE`] so transport and decode
/// details stay in the log.
fn error_response(intent: Intent, err: &QueryError) -> HttpResponse {
    let (status, message) = match err {
        QueryError::Validation { .. } | QueryError::UnsupportedRegion { .. } => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        QueryError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        QueryError::Upstream(SourceError::Status { .. }) => {
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        QueryError::Upstream(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_MESSAGE.to_string(),
        ),
    };

    if err.is_caller_error() {
        log::warn!("{intent}: {err}");
    } else {
        log::error!("{intent}: {err}");
    }

    HttpResponse::build(status).json(ApiError::new(status.as_u16(), message))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use actix_web::{App, test};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone as _, Utc};
    use quakewatch_event_models::{Coordinates, SeismicEvent};
    use quakewatch_query::{Clock, QueryEngine};
    use quakewatch_source::{EventSource, UpstreamQuery};
    use serde_json::{Value, json};

    use super::*;
    use crate::configure;

    struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
        }
    }

    enum Upstream {
        Events(Vec<SeismicEvent>),
        Status(u16, &'static str),
        Garbled,
    }

    struct FakeSource {
        upstream: Upstream,
        calls: AtomicUsize,
        last_query: Mutex<Option<UpstreamQuery>>,
    }

    impl FakeSource {
        fn new(upstream: Upstream) -> Arc<Self> {
            Arc::new(Self {
                upstream,
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn last_query(&self) -> UpstreamQuery {
            self.last_query
                .lock()
                .unwrap()
                .clone()
                .expect("source was never called")
        }
    }

    #[async_trait]
    impl EventSource for FakeSource {
        async fn fetch(&self, query: &UpstreamQuery) -> Result<Vec<SeismicEvent>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = Some(query.clone());
            match &self.upstream {
                Upstream::Events(events) => Ok(events.clone()),
                Upstream::Status(status, reason) => Err(SourceError::Status {
                    status: *status,
                    reason: (*reason).to_string(),
                }),
                Upstream::Garbled => {
                    Err(serde_json::from_str::<Value>("{").unwrap_err().into())
                }
            }
        }
    }

    fn event(event_id: i64, day: u32, magnitude: f64) -> SeismicEvent {
        SeismicEvent {
            event_id,
            origin_id: Some(event_id * 10),
            time: Some(Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap()),
            author: Some("SURVEY-INGV".to_string()),
            magnitude_type: Some("ML".to_string()),
            magnitude: Some(magnitude),
            place: Some(format!("Place {event_id}")),
            coordinates: Coordinates {
                longitude: 13.4,
                latitude: 42.35,
                depth: Some(8.0),
            },
            properties: Default::default(),
        }
    }

    fn snapshot() -> Upstream {
        Upstream::Events(vec![event(1, 1, 2.0), event(2, 2, 3.0), event(3, 3, 4.5)])
    }

    async fn get(source: Arc<FakeSource>, uri: &str) -> (StatusCode, Value) {
        let engine = QueryEngine::with_clock(source, Arc::new(FixedClock));
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState { engine }))
                .configure(configure),
        )
        .await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn recent_wraps_page_in_envelope() {
        let (status, body) = get(FakeSource::new(snapshot()), "/earthquakes/recent?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["totalEarthquakes"], json!(3));
        assert_eq!(
            body["pagination"],
            json!({ "page": 1, "totalPages": 2, "limit": 2, "hasMore": true })
        );
        let payload = body["payload"].as_array().unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload[0]["eventId"], json!(3));
        assert_eq!(payload[0]["coordinates"], json!([13.4, 42.35, 8.0]));
    }

    #[actix_web::test]
    async fn fields_project_the_payload() {
        let (status, body) = get(
            FakeSource::new(snapshot()),
            "/earthquakes/today?fields=eventId,mag&sort=magnitude",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let first = body["payload"][0].as_object().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first["eventId"], json!(1));
        assert_eq!(first["magnitude"], json!(2.0));
    }

    #[actix_web::test]
    async fn magnitude_threshold_is_strict_over_http() {
        let (status, body) = get(FakeSource::new(snapshot()), "/earthquakes/magnitude?mag=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalEarthquakes"], json!(1));
        assert_eq!(body["payload"][0]["eventId"], json!(3));
    }

    #[actix_web::test]
    async fn reversed_date_range_is_rejected_before_fetching() {
        let source = FakeSource::new(snapshot());
        let (status, body) = get(
            source.clone(),
            "/earthquakes/range-time?startdate=2024-02-01&enddate=2024-01-01",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!(400));
        assert_eq!(source.calls(), 0);
    }

    #[actix_web::test]
    async fn malformed_page_is_rejected_before_fetching() {
        let source = FakeSource::new(snapshot());
        let (status, body) = get(source.clone(), "/earthquakes/last-week?page=two").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("page"));
        assert_eq!(source.calls(), 0);
    }

    #[actix_web::test]
    async fn unknown_region_lists_supported_regions() {
        let source = FakeSource::new(snapshot());
        let (status, body) = get(source.clone(), "/earthquakes/region?region=atlantis").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("atlantis"));
        assert!(message.contains("calabria"));
        assert_eq!(source.calls(), 0);
    }

    #[actix_web::test]
    async fn missing_coordinates_are_rejected() {
        let (status, body) = get(
            FakeSource::new(snapshot()),
            "/earthquakes/location?latitude=42.35",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("longitude"));
    }

    #[actix_web::test]
    async fn event_id_found_and_not_found() {
        let (status, body) =
            get(FakeSource::new(snapshot()), "/earthquakes/eventId?eventId=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalEarthquakes"], json!(1));
        assert_eq!(body["payload"][0]["eventId"], json!(2));

        let (status, body) =
            get(FakeSource::new(snapshot()), "/earthquakes/eventId?eventId=999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], json!(404));
        assert_eq!(body["message"], json!("No earthquake found with eventId 999"));
    }

    #[actix_web::test]
    async fn upstream_status_is_echoed() {
        let source = FakeSource::new(Upstream::Status(503, "Service Unavailable"));
        let (status, body) = get(source, "/earthquakes/recent").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body["message"],
            json!("Upstream request failed: 503 Service Unavailable")
        );
    }

    #[actix_web::test]
    async fn other_upstream_failures_are_generic() {
        let (status, body) = get(FakeSource::new(Upstream::Garbled), "/earthquakes/recent").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], json!(INTERNAL_ERROR_MESSAGE));
        assert_eq!(body["code"], json!(500));
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let (status, body) = get(FakeSource::new(snapshot()), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["healthy"], json!(true));
        assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
    }

    fn at(month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, month, day, hour, minute, second)
            .unwrap()
    }

    #[actix_web::test]
    async fn month_route_fetches_the_calendar_month() {
        let source = FakeSource::new(snapshot());
        let (status, body) = get(source.clone(), "/earthquakes/month?year=2024&month=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], json!("Earthquakes from month 3 of 2024"));
        assert_eq!(body["totalEarthquakes"], json!(3));
        assert_eq!(
            body["pagination"],
            json!({ "page": 1, "totalPages": 1, "limit": 20, "hasMore": false })
        );

        let query = source.last_query();
        assert_eq!((query.start, query.end), (at(3, 1, 0, 0, 0), at(4, 1, 0, 0, 0)));
        assert_eq!(query.bbox, None);
    }

    #[actix_web::test]
    async fn range_time_route_reads_every_wire_name() {
        let source = FakeSource::new(snapshot());
        let (status, body) = get(
            source.clone(),
            "/earthquakes/range-time?startdate=2024-03-01&enddate=2024-03-31&minmag=3&maxdepth=10",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalEarthquakes"], json!(2));
        assert_eq!(body["payload"][0]["eventId"], json!(3));
        assert_eq!(body["payload"][1]["eventId"], json!(2));

        let query = source.last_query();
        assert_eq!(
            (query.start, query.end),
            (at(3, 1, 0, 0, 0), at(3, 31, 23, 59, 59))
        );

        let (status, body) = get(
            FakeSource::new(snapshot()),
            "/earthquakes/range-time?startdate=2024-03-01&enddate=2024-03-31&maxdepth=5",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalEarthquakes"], json!(0));
    }

    #[actix_web::test]
    async fn depth_route_keeps_events_at_or_deeper_than_threshold() {
        let (status, body) = get(FakeSource::new(snapshot()), "/earthquakes/depth?depth=8").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalEarthquakes"], json!(3));
        assert_eq!(
            body["message"],
            json!("Earthquakes at a depth of 8 km or more")
        );

        let (status, body) = get(FakeSource::new(snapshot()), "/earthquakes/depth?depth=8.5").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payload"], json!([]));
        assert_eq!(
            body["pagination"],
            json!({ "page": 1, "totalPages": 0, "limit": 20, "hasMore": false })
        );
    }

    #[actix_web::test]
    async fn location_route_sends_a_box_and_filters_the_circle() {
        let source = FakeSource::new(snapshot());
        let (status, body) = get(
            source.clone(),
            "/earthquakes/location?latitude=42.35&longitude=13.4&radius=10",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["totalEarthquakes"], json!(3));

        let bbox = source.last_query().bbox.expect("location sends a bounding box");
        assert!(bbox.contains(42.35, 13.4));
        assert!(bbox.min_latitude > 42.0 && bbox.max_latitude < 42.7);
    }

    #[actix_web::test]
    async fn region_route_sends_the_region_box() {
        let source = FakeSource::new(snapshot());
        let (status, body) = get(source.clone(), "/earthquakes/region?region=Abruzzo").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalEarthquakes"], json!(3));
        let bbox = source.last_query().bbox.expect("region sends a bounding box");
        assert!(bbox.contains(42.35, 13.4));
    }

    #[actix_web::test]
    async fn oversized_page_and_limit_are_clamped() {
        let (status, body) = get(
            FakeSource::new(snapshot()),
            "/earthquakes/recent?page=99999999999999999999999&limit=99999999999999999999999",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["pagination"],
            json!({ "page": 1, "totalPages": 1, "limit": 100, "hasMore": false })
        );
    }

    #[actix_web::test]
    async fn repeated_query_key_gets_json_error() {
        let source = FakeSource::new(snapshot());
        let (status, body) = get(source.clone(), "/earthquakes/recent?page=1&page=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["code"], json!(400));
        assert_eq!(source.calls(), 0);
    }
}
