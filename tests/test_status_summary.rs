//! Status summary end-to-end: grouped aggregates and the global overview
//! over a fetched record set.

mod common;

use common::{envelope, test_engine};
use griddle::analytics::GroupKey;
use griddle::engine::StatusSummaryParams;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn site_items() -> serde_json::Value {
    json!([
        {"IssueId": 1, "Title": "Done thing", "Status": 900, "Owner": 7,
         "WorkValue": 5.0, "ProgressRate": 100.0},
        {"IssueId": 2, "Title": "Open thing", "Status": 100, "Owner": 7,
         "WorkValue": 3.0, "ProgressRate": 20.0},
        {"IssueId": 3, "Title": "Unowned thing", "Status": 100,
         "WorkValue": 2.0}
    ])
}

#[tokio::test]
async fn test_summary_grouped_by_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items/9/get"))
        .and(body_partial_json(json!({ "PageSize": 1000 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(site_items(), 3)))
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let summary = engine
        .status_summary(StatusSummaryParams {
            site_id: 9,
            group_by: None, // defaults to status
        })
        .await
        .unwrap();

    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.group_count, 2);

    let done = &summary.summary["900"];
    assert_eq!(done.count, 1);
    assert_eq!(done.total_work_value, 5.0);
    assert_eq!(done.completed_count, 1);
    assert_eq!(done.completion_rate, 100.0);
    assert_eq!(done.items.len(), 1);
    assert_eq!(done.items[0].title, "Done thing");

    let open = &summary.summary["100"];
    assert_eq!(open.count, 2);
    assert_eq!(open.total_work_value, 5.0);
    assert_eq!(open.completed_count, 0);
    assert_eq!(open.completion_rate, 0.0);
    // One at 20%, one with no progress at all: mean over both is 10
    assert_eq!(open.average_progress, 10.0);

    assert_eq!(summary.overview.total_completed, 1);
    assert_eq!(
        summary.overview.overall_completion_rate,
        Some(1.0 / 3.0 * 100.0)
    );
    assert_eq!(summary.overview.total_work_value, 10.0);
}

#[tokio::test]
async fn test_summary_grouped_by_assignee_uses_sentinel() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items/9/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(site_items(), 3)))
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let summary = engine
        .status_summary(StatusSummaryParams {
            site_id: 9,
            group_by: Some(GroupKey::Assignee),
        })
        .await
        .unwrap();

    assert_eq!(summary.summary["7"].count, 2);
    assert_eq!(summary.summary["unassigned"].count, 1);

    let total: usize = summary.summary.values().map(|g| g.count).sum();
    assert_eq!(total, summary.total_items);
}

#[tokio::test]
async fn test_empty_site_summary_has_undefined_overall_rate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items/9/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]), 0)))
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let summary = engine
        .status_summary(StatusSummaryParams {
            site_id: 9,
            group_by: None,
        })
        .await
        .unwrap();

    assert_eq!(summary.total_items, 0);
    assert_eq!(summary.overview.overall_completion_rate, None);
}
