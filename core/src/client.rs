//! Stateless client for the Pollster API.
//!
//! # Design
//! `PollsterClient` holds only its base URL and a transport, and carries no
//! state between calls. Each endpoint is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`; the public operations compose the two around a single
//! `Transport::execute`. Every call issues exactly one request.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{PollsterError, Result};
use crate::http::{HttpRequest, HttpResponse, QueryParams};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Chart, Poll};

pub const DEFAULT_HOST: &str = "elections.huffingtonpost.com";
pub const DEFAULT_BASE_PATH: &str = "/pollster/api";

/// Where the API lives. Requests go to `http://{host}{base_path}/{endpoint}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub base_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

/// Synchronous client for the Pollster API.
#[derive(Debug, Clone)]
pub struct PollsterClient<T = UreqTransport> {
    base_url: String,
    transport: T,
}

impl PollsterClient {
    /// Client for the public Pollster API over `ureq`.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl Default for PollsterClient {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> PollsterClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: format!(
                "http://{}{}",
                config.host,
                config.base_path.trim_end_matches('/')
            ),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Charts matching `params` (e.g. `topic`, `state`).
    ///
    /// # Errors
    /// Any `PollsterError`; see `parse_list_charts`.
    pub fn list_charts(&self, params: &QueryParams) -> Result<Vec<Chart>> {
        let response = self.transport.execute(&self.build_list_charts(params))?;
        self.parse_list_charts(&response)
    }

    /// The chart identified by `slug`, including its estimate-by-date series.
    ///
    /// The slug is sent as-is; an unknown slug is reported by the server.
    ///
    /// # Errors
    /// Any `PollsterError`; see `parse_get_chart`.
    pub fn get_chart(&self, slug: &str, params: &QueryParams) -> Result<Chart> {
        let response = self.transport.execute(&self.build_get_chart(slug, params))?;
        self.parse_get_chart(&response)
    }

    /// Polls matching `params` (commonly `chart=<slug>`).
    ///
    /// # Errors
    /// Any `PollsterError`; see `parse_list_polls`.
    pub fn list_polls(&self, params: &QueryParams) -> Result<Vec<Poll>> {
        let response = self.transport.execute(&self.build_list_polls(params))?;
        self.parse_list_polls(&response)
    }

    pub fn build_list_charts(&self, params: &QueryParams) -> HttpRequest {
        self.get("charts", params)
    }

    pub fn build_get_chart(&self, slug: &str, params: &QueryParams) -> HttpRequest {
        self.get(&format!("charts/{slug}"), params)
    }

    pub fn build_list_polls(&self, params: &QueryParams) -> HttpRequest {
        self.get("polls", params)
    }

    /// # Errors
    /// `Http` or `InvalidResponse` on a bad status, `Decode` on a body that
    /// is not a JSON array of objects.
    pub fn parse_list_charts(&self, response: &HttpResponse) -> Result<Vec<Chart>> {
        let charts: Vec<Chart> = decode(response)?;
        debug!(count = charts.len(), "parsed charts");
        Ok(charts)
    }

    /// # Errors
    /// `Http` or `InvalidResponse` on a bad status, `Decode` on a body that
    /// is not a JSON object.
    pub fn parse_get_chart(&self, response: &HttpResponse) -> Result<Chart> {
        decode(response)
    }

    /// # Errors
    /// `Http` or `InvalidResponse` on a bad status, `Decode` on a body that
    /// is not a JSON array of objects.
    pub fn parse_list_polls(&self, response: &HttpResponse) -> Result<Vec<Poll>> {
        let polls: Vec<Poll> = decode(response)?;
        debug!(count = polls.len(), "parsed polls");
        Ok(polls)
    }

    fn get(&self, endpoint: &str, params: &QueryParams) -> HttpRequest {
        let mut url = format!("{}/{endpoint}", self.base_url);
        if !params.is_empty() {
            url.push('?');
            url.push_str(&params.to_query_string());
        }
        debug!(%url, "building request");
        HttpRequest {
            url,
            headers: vec![("accept".to_string(), "application/json".to_string())],
        }
    }
}

/// Check the status, then deserialize the body.
fn decode<D: DeserializeOwned>(response: &HttpResponse) -> Result<D> {
    check_status(response)?;
    serde_json::from_str(&response.body).map_err(|e| PollsterError::Decode {
        url: response.url.clone(),
        message: e.to_string(),
    })
}

/// Map non-2xx responses, and 2xx responses not reading `OK`, to errors.
fn check_status(response: &HttpResponse) -> Result<()> {
    if !response.is_success() {
        let detail = error_detail(&response.body);
        warn!(url = %response.url, status = response.status, detail = ?detail, "request failed");
        return Err(PollsterError::Http {
            url: response.url.clone(),
            status: response.status,
            reason: response.reason.clone(),
            detail,
        });
    }
    if response.reason != "OK" {
        warn!(url = %response.url, status = response.status, reason = %response.reason, "unexpected status");
        return Err(PollsterError::InvalidResponse {
            reason: response.reason.clone(),
        });
    }
    Ok(())
}

/// First entry of an `{"errors": [...]}` body, if the body has one.
fn error_detail(body: &str) -> Option<String> {
    let body: Value = serde_json::from_str(body).ok()?;
    match body.get("errors")?.get(0)? {
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
