//! Executes `HttpRequest` values against the network.

use std::fmt;

use tracing::debug;

use crate::error::{PollsterError, Result};
use crate::http::{HttpRequest, HttpResponse};

/// Performs one blocking HTTP round-trip.
pub trait Transport {
    /// # Errors
    /// Returns `PollsterError::Transport` when no response could be read.
    /// Non-2xx responses are returned as data, not as errors.
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking transport backed by `ureq`.
///
/// ureq reports 4xx/5xx as `Error::Status` but still hands over the
/// response, so those bodies reach the client's error translation like any
/// other. The reason phrase is taken verbatim from the status line.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let transport_error = |message: String| PollsterError::Transport {
            url: request.url.clone(),
            message,
        };

        let mut call = self.agent.get(&request.url);
        for (name, value) in &request.headers {
            call = call.set(name, value);
        }

        let response = match call.call() {
            Ok(response) | Err(ureq::Error::Status(_, response)) => response,
            Err(e) => return Err(transport_error(e.to_string())),
        };
        let status = response.status();
        let reason = response.status_text().to_string();
        let body = response
            .into_string()
            .map_err(|e| transport_error(e.to_string()))?;
        debug!(url = %request.url, status, %reason, bytes = body.len(), "response received");

        Ok(HttpResponse {
            url: request.url.clone(),
            status,
            reason,
            body,
        })
    }
}
