// Copyright 2025 Tracefeed Contributors (https://github.com/tracefeed/tracefeed)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Typed HTTP client for the list search endpoints.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use tracefeed_core::{
    FeedError, ListRecord, PageFetcher, PageRequest, RecordPage, Result, TraceSpan, WorkflowRun,
};

use crate::wire::PageEnvelope;

/// Search endpoint for the trace list.
pub const TRACES_SEARCH_PATH: &str = "/api/v1/traces/search";

/// Search endpoint for the workflow-run list.
pub const RUNS_SEARCH_PATH: &str = "/api/v1/runs/search";

/// Connection settings for [`HttpListClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Settings for the given base URL with a 30 second timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// HTTP page fetcher for one list endpoint, typed by its record.
///
/// Requests are `POST`s carrying the page index, page size, and filter
/// criteria as JSON; responses decode through [`PageEnvelope`].
pub struct HttpListClient<R> {
    http: reqwest::Client,
    base_url: String,
    path: &'static str,
    _record: PhantomData<fn() -> R>,
}

impl<R> HttpListClient<R> {
    fn with_path(config: &ClientConfig, path: &'static str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            path,
            _record: PhantomData,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

impl HttpListClient<TraceSpan> {
    /// Client for the trace list endpoint.
    pub fn traces(config: &ClientConfig) -> Result<Self> {
        Self::with_path(config, TRACES_SEARCH_PATH)
    }
}

impl HttpListClient<WorkflowRun> {
    /// Client for the workflow-run list endpoint.
    pub fn runs(config: &ClientConfig) -> Result<Self> {
        Self::with_path(config, RUNS_SEARCH_PATH)
    }
}

#[async_trait]
impl<R> PageFetcher for HttpListClient<R>
where
    R: ListRecord + DeserializeOwned,
{
    type Record = R;

    async fn fetch_page(&self, request: &PageRequest) -> Result<RecordPage<R>> {
        let url = self.url();
        tracing::debug!(%url, page = request.page, per_page = request.per_page, "fetching page");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), body));
        }

        let envelope: PageEnvelope<R> = response
            .json()
            .await
            .map_err(|e| FeedError::Decode(e.to_string()))?;
        Ok(envelope.into_page(request.page))
    }
}

/// Builds an API error, preferring the server's structured message.
fn api_error(status: u16, body: String) -> FeedError {
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or(body);
    FeedError::Api { status, message }
}
