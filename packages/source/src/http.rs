//! HTTP implementation of [`EventSource`] backed by `reqwest`.
//!
//! One GET per call. FDSN services answer `204 No Content` when a window
//! holds no events, which is treated as an empty collection.

use async_trait::async_trait;
use quakewatch_event_models::SeismicEvent;

use crate::{EventSource, SourceError, UpstreamQuery, parse_feature_collection};

/// Fetches events from an FDSN event endpoint.
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpEventSource {
    /// Creates a source for `base_url` using the given client.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// The configured endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs one GET against a fully assembled URL.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Status`] on a non-success response, or
    /// [`SourceError::Http`]/[`SourceError::Json`] if the transport or
    /// body parsing fails.
    pub async fn fetch_url(&self, url: &str) -> Result<Vec<SeismicEvent>, SourceError> {
        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NO_CONTENT {
            log::debug!("Upstream returned 204, no events in window");
            return Ok(Vec::new());
        }

        if !status.is_success() {
            log::warn!("Upstream returned HTTP {status} for {url}");
            return Err(SourceError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        let events = parse_feature_collection(&body)?;
        log::debug!("Upstream returned {} events", events.len());
        Ok(events)
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch(&self, query: &UpstreamQuery) -> Result<Vec<SeismicEvent>, SourceError> {
        let url = query.to_url(&self.base_url)?;
        self.fetch_url(&url).await
    }
}
