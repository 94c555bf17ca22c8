//! Plain listing and the thin item mutation passthroughs.

mod common;

use common::{envelope, item, test_engine};
use griddle::engine::ListItemsParams;
use griddle::{GriddleError, Item};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_items_defaults_and_equality_filters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items/4/get"))
        .and(body_partial_json(json!({
            "View": {
                "ColumnFilterHash": { "Status": "100|200", "Owner": "7" }
            },
            "Offset": 0,
            "PageSize": 50
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!([item(1, "Mine", 100)]), 1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let report = engine
        .list_items(ListItemsParams {
            site_id: 4,
            status: Some("100|200".to_string()),
            assignee: Some(7),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(report.items.len(), 1);
    assert_eq!(report.pagination.limit, 50);
    assert!(!report.pagination.has_more);
}

#[tokio::test]
async fn test_create_item_roundtrip_with_usage_passthrough() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items/4/create"))
        .and(body_partial_json(json!({
            "Title": "New defect",
            "Status": 100,
            "ApiKey": "test-key"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!([item(99, "New defect", 100)]), 1)),
        )
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let new_item = Item {
        title: "New defect".to_string(),
        status: Some(100),
        ..Default::default()
    };
    let report = engine.create_item(4, &new_item).await.unwrap();

    assert_eq!(report.item.unwrap().issue_id, Some(99));
    assert_eq!(report.api_usage.remaining_calls, Some(9987));
    assert_eq!(report.api_usage.daily_limit, Some(10000));
}

#[tokio::test]
async fn test_create_item_title_rules_reject_before_network() {
    let engine = test_engine("http://127.0.0.1:1");

    let untitled = Item::default();
    assert!(matches!(
        engine.create_item(4, &untitled).await.unwrap_err(),
        GriddleError::Validation(_)
    ));

    let overlong = Item {
        title: "x".repeat(201),
        ..Default::default()
    };
    assert!(matches!(
        engine.create_item(4, &overlong).await.unwrap_err(),
        GriddleError::Validation(_)
    ));
}

#[tokio::test]
async fn test_update_item_requires_an_id() {
    let engine = test_engine("http://127.0.0.1:1");

    let no_id = Item {
        title: "Renamed".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        engine.update_item(4, &no_id).await.unwrap_err(),
        GriddleError::Validation(_)
    ));
}

#[tokio::test]
async fn test_delete_item_sends_target_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items/4/delete"))
        .and(body_partial_json(json!({ "IssueId": 31 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": 31,
            "StatusCode": 200,
            "LimitPerDate": 10000,
            "LimitRemaining": 9986
        })))
        .expect(1)
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let report = engine.delete_item(4, 31).await.unwrap();
    assert_eq!(report.item_id, 31);
    assert_eq!(report.api_usage.remaining_calls, Some(9986));

    assert!(matches!(
        engine.delete_item(4, 0).await.unwrap_err(),
        GriddleError::Validation(_)
    ));
}
