//! Synchronous client for the HuffPost Pollster API.
//!
//! # Overview
//! Lists charts and polls, fetches single charts, and wraps the JSON the API
//! returns in `Chart` and `Poll` records. A chart can fetch its own polls and
//! lazily load its estimate-by-date series.
//!
//! # Design
//! - `PollsterClient` is stateless: a base URL plus a `Transport`.
//! - Each endpoint is split into `build_*` (produces a request) and
//!   `parse_*` (consumes a response) around one `Transport::execute` call.
//! - `UreqTransport` does blocking I/O; tests swap in scripted transports or
//!   run against the `mock-server` crate.
//! - All failures are a `PollsterError`. Nothing is retried.
//!
//! ```no_run
//! use pollster_core::{PollsterClient, QueryParams};
//!
//! let client = PollsterClient::new();
//! let charts = client.list_charts(&QueryParams::new().with("topic", "obama-job-approval"))?;
//! for chart in &charts {
//!     let polls = chart.polls(&client, &QueryParams::new())?;
//!     println!("{chart}: {} polls", polls.len());
//! }
//! # Ok::<(), pollster_core::PollsterError>(())
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::{ClientConfig, PollsterClient, DEFAULT_BASE_PATH, DEFAULT_HOST};
pub use error::{PollsterError, Result};
pub use http::{HttpRequest, HttpResponse, QueryParams};
pub use transport::{Transport, UreqTransport};
pub use types::{Chart, Poll};
