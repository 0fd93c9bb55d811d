//! HTTP client for the event backend.
//!
//! Two endpoints: `GET /event` (a list, of which only the first entry is
//! displayed) and `POST /entries`. No retries and no authentication.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::types::{EntryPayload, EventResponse};
use crate::error::ApiError;

pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

pub struct EventClient {
    http: Client,
    base_url: Url,
}

impl EventClient {
    /// Build a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                message: "URL cannot be used as a base".into(),
            });
        }
        // Keep any path prefix when joining endpoint names.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> Result<Url, ApiError> {
        self.base_url.join(name).map_err(|e| ApiError::InvalidBaseUrl {
            url: self.base_url.to_string(),
            message: e.to_string(),
        })
    }

    /// Fetch the event to display.
    pub async fn fetch_event(&self) -> Result<EventResponse, ApiError> {
        let url = self.endpoint("event")?;
        tracing::debug!(%url, "fetching event");
        let resp = self.http.get(url).send().await?;
        let resp = check_status(resp).await?;
        let events: Vec<EventResponse> = resp.json().await?;
        events.into_iter().next().ok_or(ApiError::NoEvent)
    }

    /// Submit a form entry; returns the backend's JSON reply verbatim.
    pub async fn submit_entry(&self, payload: &EntryPayload) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint("entries")?;
        tracing::debug!(%url, event_id = payload.event_id, "submitting entry");
        let resp = self.http.post(url).json(payload).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}
