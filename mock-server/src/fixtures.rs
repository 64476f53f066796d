//! Canned charts and polls served by the stub API.
//!
//! Payloads include keys the client does not keep (`short_title`,
//! `election_date`, `partisan_affiliation`, `charts`), so tests can check that
//! they are dropped.

use serde_json::{json, Value};

pub fn charts() -> Vec<Value> {
    vec![
        json!({
            "title": "Obama Job Approval",
            "slug": "obama-job-approval",
            "topic": "obama-job-approval",
            "state": "US",
            "short_title": "Obama Job Approval",
            "election_date": null,
            "poll_count": 1045,
            "last_updated": "2013-06-10T14:08:17Z",
            "url": "http://elections.huffingtonpost.com/pollster/obama-job-approval",
            "estimates": [
                {"choice": "Approve", "value": 47.6, "lead_confidence": null, "first_name": null, "last_name": null, "party": null, "incumbent": false},
                {"choice": "Disapprove", "value": 48.1, "lead_confidence": null, "first_name": null, "last_name": null, "party": null, "incumbent": false}
            ],
            "estimates_by_date": [
                {"date": "2013-06-09", "estimates": [{"choice": "Approve", "value": 47.6}, {"choice": "Disapprove", "value": 48.1}]},
                {"date": "2013-06-08", "estimates": [{"choice": "Approve", "value": 47.8}, {"choice": "Disapprove", "value": 47.9}]}
            ]
        }),
        json!({
            "title": "2014 Ohio Governor: Kasich vs. FitzGerald",
            "slug": "2014-ohio-governor-kasich-vs-fitzgerald",
            "topic": "2014-governor",
            "state": "OH",
            "short_title": "OH Governor",
            "election_date": "2014-11-04",
            "poll_count": 12,
            "last_updated": "2014-06-02T19:55:03Z",
            "url": "http://elections.huffingtonpost.com/pollster/2014-ohio-governor-kasich-vs-fitzgerald",
            "estimates": [
                {"choice": "Kasich", "value": 46.3, "lead_confidence": 91.2, "first_name": "John", "last_name": "Kasich", "party": "Rep", "incumbent": true},
                {"choice": "FitzGerald", "value": 39.5, "lead_confidence": 8.8, "first_name": "Ed", "last_name": "FitzGerald", "party": "Dem", "incumbent": false}
            ],
            "estimates_by_date": [
                {"date": "2014-06-01", "estimates": [{"choice": "Kasich", "value": 46.3}, {"choice": "FitzGerald", "value": 39.5}]}
            ]
        }),
    ]
}

pub fn polls() -> Vec<Value> {
    vec![
        json!({
            "id": 17381,
            "pollster": "Gallup",
            "start_date": "2013-06-07",
            "end_date": "2013-06-09",
            "method": "Live Phone",
            "source": "http://www.gallup.com/poll/113980/Gallup-Daily-Obama-Job-Approval.aspx",
            "last_updated": "2013-06-10T13:01:11Z",
            "partisan": "Nonpartisan",
            "affiliation": "None",
            "survey_houses": [{"name": "Gallup", "party": "N/A"}],
            "sponsors": [],
            "questions": [{
                "name": "Obama Job Approval",
                "chart": "obama-job-approval",
                "topic": "obama-job-approval",
                "state": "US",
                "subpopulations": [{"name": "Adults", "observations": 1500, "margin_of_error": 3.0,
                    "responses": [{"choice": "Approve", "value": 47}, {"choice": "Disapprove", "value": 46}]}]
            }],
            "charts": ["obama-job-approval"]
        }),
        json!({
            "id": 17377,
            "pollster": "Rasmussen",
            "start_date": "2013-06-06",
            "end_date": "2013-06-08",
            "method": "Automated Phone",
            "source": "http://www.rasmussenreports.com/public_content/politics/obama_administration/daily_presidential_tracking_poll",
            "last_updated": "2013-06-09T10:30:00Z",
            "partisan": "Nonpartisan",
            "affiliation": "None",
            "survey_houses": [{"name": "Rasmussen", "party": "N/A"}],
            "sponsors": [],
            "questions": [{"name": "Obama Job Approval", "chart": "obama-job-approval", "topic": "obama-job-approval", "state": "US"}],
            "charts": ["obama-job-approval"]
        }),
        json!({
            "id": 19466,
            "pollster": "Quinnipiac",
            "start_date": "2014-05-07",
            "end_date": "2014-05-12",
            "method": "Live Phone",
            "source": "http://www.quinnipiac.edu/news-and-events/quinnipiac-university-poll/ohio/",
            "last_updated": "2014-05-14T12:00:00Z",
            "partisan": "Nonpartisan",
            "affiliation": "None",
            "partisan_affiliation": "None",
            "survey_houses": [{"name": "Quinnipiac", "party": "N/A"}],
            "sponsors": [],
            "questions": [{"name": "2014 Ohio Governor", "chart": "2014-ohio-governor-kasich-vs-fitzgerald", "topic": "2014-governor", "state": "OH"}],
            "charts": ["2014-ohio-governor-kasich-vs-fitzgerald"]
        }),
    ]
}
