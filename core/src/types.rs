//! Domain records returned by the Pollster API.
//!
//! # Design
//! Each record is an explicit struct with one optional field per key the API
//! is known to return. Deserialization keeps exactly those keys: anything
//! else in the payload is dropped by serde, and a missing or `null` key stays
//! `None`. Values are kept as raw JSON so one item with an unexpected type
//! cannot fail a whole listing; typed accessors cover the common reads.

use std::fmt;

use once_cell::unsync::OnceCell;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

use crate::client::PollsterClient;
use crate::error::{PollsterError, Result};
use crate::http::QueryParams;
use crate::transport::Transport;

/// Estimates for one topic over time, e.g. `obama-job-approval`.
///
/// Obtained from `PollsterClient::list_charts` or `PollsterClient::get_chart`.
/// The estimate-by-date series is filled in lazily: `get_chart` responses
/// carry it, `list_charts` responses do not, and `estimates_by_date` fetches
/// it the first time it is needed.
///
/// The series cache is a single-threaded cell, so `Chart` is `Send` but not
/// `Sync`: two threads can never race on the first fetch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Chart {
    pub last_updated: Option<Value>,
    pub title: Option<Value>,
    pub url: Option<Value>,
    pub estimates: Option<Value>,
    pub poll_count: Option<Value>,
    pub topic: Option<Value>,
    pub state: Option<Value>,
    pub slug: Option<Value>,
    #[serde(default, deserialize_with = "seed_cache")]
    estimates_by_date: OnceCell<Vec<Value>>,
}

fn seed_cache<'de, D>(deserializer: D) -> std::result::Result<OnceCell<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    // a series that is not an array is treated as absent
    let series = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(series)) => OnceCell::with_value(series),
        _ => OnceCell::new(),
    };
    Ok(series)
}

/// Render a field for display: strings bare, other values as JSON.
fn text(value: &Option<Value>) -> String {
    match value {
        None => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl Chart {
    /// The slug, if it is a string.
    pub fn slug(&self) -> Option<&str> {
        self.slug.as_ref().and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_ref().and_then(Value::as_str)
    }

    pub fn poll_count(&self) -> Option<u64> {
        self.poll_count.as_ref().and_then(Value::as_u64)
    }

    /// Whether the estimate-by-date series is already held locally.
    pub fn has_estimates_by_date(&self) -> bool {
        self.estimates_by_date.get().is_some()
    }

    /// Polls feeding this chart, filtered further by `params`.
    ///
    /// The `chart` parameter is always set to this chart's slug, replacing
    /// any value the caller supplied.
    ///
    /// # Errors
    /// `PollsterError::MissingSlug` if the chart has no slug, otherwise any
    /// error from `PollsterClient::list_polls`.
    pub fn polls<T: Transport>(
        &self,
        client: &PollsterClient<T>,
        params: &QueryParams,
    ) -> Result<Vec<Poll>> {
        let slug = self.slug().ok_or(PollsterError::MissingSlug)?;
        let params = params.clone().with("chart", slug);
        client.list_polls(&params)
    }

    /// The estimate-by-date series, fetched with `get_chart` on first use.
    ///
    /// A successful fetch is stored, so later calls issue no request.
    ///
    /// # Errors
    /// `PollsterError::ChartNotFound` when the server does not know the slug
    /// or its chart carries no series; `PollsterError::MissingSlug` when there
    /// is nothing to look up. Other client errors pass through unchanged.
    pub fn estimates_by_date<T: Transport>(&self, client: &PollsterClient<T>) -> Result<&[Value]> {
        if let Some(series) = self.estimates_by_date.get() {
            debug!(slug = ?self.slug(), "estimates_by_date cache hit");
            return Ok(series);
        }

        let slug = self.slug().ok_or(PollsterError::MissingSlug)?;
        debug!(slug, "estimates_by_date cache miss, fetching chart");
        let not_found = || PollsterError::ChartNotFound {
            slug: slug.to_string(),
        };

        let chart = match client.get_chart(slug, &QueryParams::new()) {
            Ok(chart) => chart,
            Err(PollsterError::Http { status: 404, .. }) => return Err(not_found()),
            Err(e) => return Err(e),
        };
        let series = chart.estimates_by_date.into_inner().ok_or_else(not_found)?;

        Ok(self.estimates_by_date.get_or_init(|| series))
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Chart: {}>", text(&self.title))
    }
}

/// Metadata for a single poll.
///
/// Obtained from `PollsterClient::list_polls` or `Chart::polls`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Poll {
    pub id: Option<Value>,
    pub pollster: Option<Value>,
    pub start_date: Option<Value>,
    pub end_date: Option<Value>,
    pub method: Option<Value>,
    pub source: Option<Value>,
    pub questions: Option<Value>,
    pub survey_houses: Option<Value>,
    pub sponsors: Option<Value>,
    pub partisan: Option<Value>,
    pub affiliation: Option<Value>,
}

impl Poll {
    pub fn id(&self) -> Option<u64> {
        self.id.as_ref().and_then(Value::as_u64)
    }

    pub fn pollster(&self) -> Option<&str> {
        self.pollster.as_ref().and_then(Value::as_str)
    }
}

impl fmt::Display for Poll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Poll: {} ({} - {})>",
            text(&self.pollster),
            text(&self.start_date),
            text(&self.end_date)
        )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::ClientConfig;
    use crate::transport::scripted::ScriptedTransport;

    fn client(transport: ScriptedTransport) -> PollsterClient<ScriptedTransport> {
        PollsterClient::with_transport(ClientConfig::default(), transport)
    }

    fn listed_chart() -> Chart {
        serde_json::from_value(json!({
            "slug": "obama-job-approval",
            "title": "Obama Job Approval",
            "poll_count": 1045
        }))
        .unwrap()
    }

    #[test]
    fn chart_keeps_only_known_keys() {
        let chart: Chart = serde_json::from_value(json!({
            "title": "2016 General Election: Trump vs. Clinton",
            "slug": "2016-general-election-trump-vs-clinton",
            "topic": "2016-president",
            "state": "US",
            "poll_count": 212,
            "last_updated": "2016-06-01T14:00:00.000Z",
            "url": "http://elections.huffingtonpost.com/pollster/2016-general-election-trump-vs-clinton",
            "estimates": [{"choice": "Clinton", "value": 45.1}],
            "short_title": "Trump vs. Clinton",
            "election_date": "2016-11-08"
        }))
        .unwrap();

        assert_eq!(chart.topic, Some(json!("2016-president")));
        assert_eq!(chart.poll_count(), Some(212));
        assert_eq!(
            chart.estimates,
            Some(json!([{"choice": "Clinton", "value": 45.1}]))
        );
        assert!(!chart.has_estimates_by_date());
    }

    #[test]
    fn missing_keys_stay_absent() {
        let chart: Chart = serde_json::from_value(json!({"slug": "a"})).unwrap();
        assert_eq!(chart.slug(), Some("a"));
        assert!(chart.title.is_none());
        assert!(chart.estimates.is_none());
        assert!(chart.poll_count.is_none());
    }

    #[test]
    fn explicit_null_reads_as_absent() {
        let chart: Chart =
            serde_json::from_value(json!({"slug": "a", "title": null, "estimates_by_date": null}))
                .unwrap();
        assert!(chart.title.is_none());
        assert!(!chart.has_estimates_by_date());
    }

    #[test]
    fn estimates_by_date_in_payload_seeds_cache() {
        let chart: Chart = serde_json::from_value(json!({
            "slug": "a",
            "estimates_by_date": [{"date": "2013-01-01", "estimates": []}]
        }))
        .unwrap();
        assert!(chart.has_estimates_by_date());

        let client = client(ScriptedTransport::default());
        let series = chart.estimates_by_date(&client).unwrap();
        assert_eq!(series, [json!({"date": "2013-01-01", "estimates": []})]);
        assert!(client.transport().requests.borrow().is_empty());
    }

    #[test]
    fn estimates_by_date_fetches_once() {
        let transport = ScriptedTransport::default().reply(
            200,
            "OK",
            r#"{"slug":"obama-job-approval","estimates_by_date":[{"date":"2013-06-01","estimates":[{"choice":"Approve","value":46.2}]}]}"#,
        );
        let client = client(transport);
        let chart = listed_chart();

        let first = chart.estimates_by_date(&client).unwrap().to_vec();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0]["date"], "2013-06-01");
        assert_eq!(
            client.transport().urls(),
            vec!["http://elections.huffingtonpost.com/pollster/api/charts/obama-job-approval"]
        );

        let second = chart.estimates_by_date(&client).unwrap();
        assert_eq!(second, first.as_slice());
        assert_eq!(client.transport().requests.borrow().len(), 1);
    }

    #[test]
    fn estimates_by_date_unknown_slug_is_chart_not_found() {
        let transport = ScriptedTransport::default().reply(
            404,
            "Not Found",
            r#"{"errors":["Chart not found"]}"#,
        );
        let client = client(transport);

        let err = listed_chart().estimates_by_date(&client).unwrap_err();
        assert!(matches!(&err, PollsterError::ChartNotFound { slug } if slug == "obama-job-approval"));
        assert_eq!(err.to_string(), "Can't find chart with slug: obama-job-approval");
    }

    #[test]
    fn estimates_by_date_without_series_is_chart_not_found() {
        let transport =
            ScriptedTransport::default().reply(200, "OK", r#"{"slug":"obama-job-approval"}"#);
        let client = client(transport);
        let chart = listed_chart();

        let err = chart.estimates_by_date(&client).unwrap_err();
        assert!(matches!(err, PollsterError::ChartNotFound { .. }));
        assert!(!chart.has_estimates_by_date());
    }

    #[test]
    fn estimates_by_date_passes_other_errors_through() {
        let transport = ScriptedTransport::default().reply(500, "Internal Server Error", "");
        let client = client(transport);

        let err = listed_chart().estimates_by_date(&client).unwrap_err();
        assert!(matches!(err, PollsterError::Http { status: 500, .. }));
    }

    #[test]
    fn chart_without_slug_cannot_fetch() {
        let client = client(ScriptedTransport::default());
        let chart = Chart::default();

        assert!(matches!(
            chart.estimates_by_date(&client),
            Err(PollsterError::MissingSlug)
        ));
        assert!(matches!(
            chart.polls(&client, &QueryParams::new()),
            Err(PollsterError::MissingSlug)
        ));
        assert!(client.transport().requests.borrow().is_empty());
    }

    #[test]
    fn chart_polls_injects_and_overrides_chart_param() {
        let transport = ScriptedTransport::default().reply(
            200,
            "OK",
            r#"[{"id":1,"pollster":"Gallup"}]"#,
        );
        let client = client(transport);
        let params = QueryParams::new()
            .with("method", "live")
            .with("chart", "something-else");

        let polls = listed_chart().polls(&client, &params).unwrap();
        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].pollster(), Some("Gallup"));
        assert_eq!(
            client.transport().urls(),
            vec!["http://elections.huffingtonpost.com/pollster/api/polls?method=live&chart=obama-job-approval"]
        );
        assert_eq!(params.get("chart"), Some("something-else"));
    }

    #[test]
    fn chart_display_uses_title() {
        assert_eq!(listed_chart().to_string(), "<Chart: Obama Job Approval>");
    }

    #[test]
    fn poll_keeps_only_known_keys() {
        let poll: Poll = serde_json::from_value(json!({
            "id": 15372,
            "pollster": "Gallup",
            "start_date": "2013-02-01",
            "end_date": "2013-02-03",
            "method": "Live Phone",
            "source": "http://www.gallup.com/poll/113980/Gallup-Daily-Obama-Job-Approval.aspx",
            "questions": [{"name": "Obama Job Approval", "chart": "obama-job-approval"}],
            "survey_houses": [{"name": "Gallup", "party": "N/A"}],
            "sponsors": [],
            "partisan": "Nonpartisan",
            "affiliation": "None",
            "last_updated": "2013-02-04T17:10:31Z"
        }))
        .unwrap();

        assert_eq!(poll.id(), Some(15372));
        assert_eq!(poll.method, Some(json!("Live Phone")));
        assert_eq!(poll.sponsors, Some(json!([])));
        assert_eq!(poll.partisan, Some(json!("Nonpartisan")));
        assert_eq!(
            poll.survey_houses.as_ref().and_then(Value::as_array).map(Vec::len),
            Some(1)
        );
        assert_eq!(poll.to_string(), "<Poll: Gallup (2013-02-01 - 2013-02-03)>");
    }

    #[test]
    fn mixed_type_items_keep_their_values() {
        let polls: Vec<Poll> = serde_json::from_str(
            r#"[{"id":1,"pollster":"Gallup"},{"id":"2","pollster":"YouGov","partisan":false}]"#,
        )
        .unwrap();

        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0].id(), Some(1));
        assert_eq!(polls[1].id, Some(json!("2")));
        assert_eq!(polls[1].id(), None);
        assert_eq!(polls[1].partisan, Some(json!(false)));
        assert_eq!(polls[1].pollster(), Some("YouGov"));
    }

    #[test]
    fn display_renders_non_string_values_as_json() {
        let poll: Poll = serde_json::from_value(json!({
            "pollster": 7,
            "start_date": "2013-02-01"
        }))
        .unwrap();
        assert_eq!(poll.to_string(), "<Poll: 7 (2013-02-01 - )>");
    }

    #[test]
    fn chart_with_numeric_slug_and_odd_series() {
        let chart: Chart = serde_json::from_value(json!({
            "slug": 42,
            "poll_count": "many",
            "estimates_by_date": "soon"
        }))
        .unwrap();
        assert_eq!(chart.slug, Some(json!(42)));
        assert_eq!(chart.slug(), None);
        assert_eq!(chart.poll_count, Some(json!("many")));
        assert_eq!(chart.poll_count(), None);
        assert!(!chart.has_estimates_by_date());
    }
}
