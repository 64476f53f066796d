use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::debug;

pub mod fixtures;

pub const BASE_PATH: &str = "/pollster/api";
const PAGE_SIZE: usize = 10;

const CHART_FILTERS: &[&str] = &["topic", "state"];
const POLL_FILTERS: &[&str] = &["chart", "state", "topic", "method", "pollster", "page"];

type Params = HashMap<String, String>;
type ApiError = (StatusCode, Json<Value>);

/// Fixture data plus a log of every request URI the server has seen.
#[derive(Clone)]
pub struct AppState {
    charts: Arc<Vec<Value>>,
    polls: Arc<Vec<Value>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl AppState {
    pub fn seeded() -> Self {
        Self::with_data(fixtures::charts(), fixtures::polls())
    }

    pub fn with_data(charts: Vec<Value>, polls: Vec<Value>) -> Self {
        Self {
            charts: Arc::new(charts),
            polls: Arc::new(polls),
            requests: Arc::default(),
        }
    }

    /// Path and query of every request handled so far, oldest first.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(&self, uri: &OriginalUri) {
        debug!(uri = %uri.0, "request");
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(uri.0.to_string());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::seeded()
    }
}

pub fn app() -> Router {
    app_with_state(AppState::seeded())
}

pub fn app_with_state(state: AppState) -> Router {
    let api = Router::new()
        .route("/charts", get(list_charts))
        .route("/charts/{slug}", get(get_chart))
        .route("/polls", get(list_polls));
    Router::new().nest(BASE_PATH, api).with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::seeded()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

fn error(status: StatusCode, message: String) -> ApiError {
    (status, Json(json!({ "errors": [message] })))
}

fn reject_unknown(params: &Params, allowed: &[&str]) -> Result<(), ApiError> {
    match params.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(error(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Invalid parameter: {key}"),
        )),
        None => Ok(()),
    }
}

fn str_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

async fn list_charts(
    State(state): State<AppState>,
    uri: OriginalUri,
    Query(params): Query<Params>,
) -> Result<Json<Vec<Value>>, ApiError> {
    state.record(&uri);
    reject_unknown(&params, CHART_FILTERS)?;

    let charts = state
        .charts
        .iter()
        .filter(|chart| {
            CHART_FILTERS.iter().all(|key| match params.get(*key) {
                Some(wanted) => str_field(chart, key) == Some(wanted.as_str()),
                None => true,
            })
        })
        .map(|chart| {
            // list responses omit the series; clients fetch it per chart
            let mut chart = chart.clone();
            if let Some(object) = chart.as_object_mut() {
                object.remove("estimates_by_date");
            }
            chart
        })
        .collect();
    Ok(Json(charts))
}

async fn get_chart(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(slug): Path<String>,
) -> Result<Json<Value>, ApiError> {
    state.record(&uri);
    state
        .charts
        .iter()
        .find(|chart| str_field(chart, "slug") == Some(slug.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, format!("Chart not found: {slug}")))
}

async fn list_polls(
    State(state): State<AppState>,
    uri: OriginalUri,
    Query(params): Query<Params>,
) -> Result<Json<Vec<Value>>, ApiError> {
    state.record(&uri);
    reject_unknown(&params, POLL_FILTERS)?;

    let page = match params.get("page") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(page) if page >= 1 => page,
            _ => {
                return Err(error(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    format!("Invalid parameter: page={raw}"),
                ))
            }
        },
        None => 1,
    };

    let polls = state
        .polls
        .iter()
        .filter(|poll| poll_matches(poll, &params))
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .cloned()
        .collect();
    Ok(Json(polls))
}

fn poll_matches(poll: &Value, params: &Params) -> bool {
    let questions = move || {
        poll.get("questions")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
    };

    if let Some(chart) = params.get("chart") {
        let in_charts = poll
            .get("charts")
            .and_then(Value::as_array)
            .is_some_and(|charts| charts.iter().any(|c| c.as_str() == Some(chart.as_str())));
        if !in_charts {
            return false;
        }
    }
    for key in ["state", "topic"] {
        if let Some(wanted) = params.get(key) {
            if !questions().any(|q| str_field(q, key) == Some(wanted.as_str())) {
                return false;
            }
        }
    }
    if let Some(method) = params.get("method") {
        let method = method.to_lowercase();
        let matches = str_field(poll, "method").is_some_and(|m| m.to_lowercase().contains(&method));
        if !matches {
            return false;
        }
    }
    if let Some(pollster) = params.get("pollster") {
        if !str_field(poll, "pollster").is_some_and(|p| p.eq_ignore_ascii_case(pollster)) {
            return false;
        }
    }
    true
}
