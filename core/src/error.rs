//! Error type for the Pollster API client.
//!
//! # Design
//! Every failure surfaces as a `PollsterError`. The variants keep the pieces
//! a caller may want to match on (status code, slug) while the `Display`
//! output stays a single descriptive line.

use thiserror::Error;

/// Errors returned by `PollsterClient` and the `Chart` helpers.
#[derive(Debug, Error)]
pub enum PollsterError {
    /// The server answered with a non-2xx status.
    #[error("An error occurred. URL: {url} Reason: {status} {reason}{}", detail_suffix(.detail))]
    Http {
        url: String,
        status: u16,
        reason: String,
        /// First entry of the `errors` array in the response body, if any.
        detail: Option<String>,
    },

    /// A 2xx response whose reason phrase was not `OK`.
    #[error("Invalid response returned: {reason}")]
    InvalidResponse { reason: String },

    /// The request never produced a response (DNS, connect, read failure).
    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// A success response whose body was not the expected JSON.
    #[error("Malformed response from {url}: {message}")]
    Decode { url: String, message: String },

    /// The chart could not be resolved when fetching its estimates.
    #[error("Can't find chart with slug: {slug}")]
    ChartNotFound { slug: String },

    /// The chart carries no slug, so nothing can be looked up for it.
    #[error("Chart has no slug")]
    MissingSlug,
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail
        .as_ref()
        .map(|d| format!(" [{d}]"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, PollsterError>;
