#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the quakewatch seismic event service.
//!
//! Serves the `/earthquakes` REST surface on top of
//! [`quakewatch_query::QueryEngine`], which reads from an FDSN event web
//! service over HTTP. The server holds no data of its own; every request
//! is answered from one fresh upstream fetch.

mod handlers;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use quakewatch_query::QueryEngine;
use quakewatch_source::DEFAULT_UPSTREAM_URL;
use quakewatch_source::http::HttpEventSource;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;

/// Shared application state.
pub struct AppState {
    /// Query engine shared by every worker.
    pub engine: QueryEngine,
}

/// Startup configuration, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// FDSN event query endpoint (`QUAKEWATCH_UPSTREAM_URL`).
    pub upstream_url: String,
}

impl ServerConfig {
    /// Reads the configuration from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT '{raw}', using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            port,
            upstream_url: lookup("QUAKEWATCH_UPSTREAM_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string()),
        }
    }
}

/// Registers every route along with the JSON query-string error handler.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(handlers::query_error))
        .route("/api/health", web::get().to(handlers::health))
        .service(
            web::scope("/earthquakes")
                .route("/recent", web::get().to(handlers::recent))
                .route("/today", web::get().to(handlers::today))
                .route("/last-week", web::get().to(handlers::last_week))
                .route("/month", web::get().to(handlers::month))
                .route("/range-time", web::get().to(handlers::range_time))
                .route("/region", web::get().to(handlers::region))
                .route("/depth", web::get().to(handlers::depth))
                .route("/magnitude", web::get().to(handlers::magnitude))
                .route("/location", web::get().to(handlers::location))
                .route("/eventId", web::get().to(handlers::event_id)),
        );
}

/// Starts the quakewatch API server.
///
/// Builds one shared HTTP client and query engine, then starts the
/// Actix-Web HTTP server. The caller provides the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP client cannot be built,
/// or if the HTTP server fails to bind or encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();

    let client = reqwest::Client::builder()
        .user_agent(concat!("quakewatch/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(std::io::Error::other)?;

    log::info!("Using upstream catalog {}", config.upstream_url);
    let source = HttpEventSource::new(client, config.upstream_url);

    let state = web::Data::new(AppState {
        engine: QueryEngine::new(Arc::new(source)),
    });

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
