//! Fan-out search: isolated per-site failures, order-preserving reports.

mod common;

use std::time::Duration;

use common::{envelope, item, test_engine};
use griddle::engine::MultiSiteSearchParams;
use griddle::GriddleError;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_one_failing_site_never_aborts_the_others() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/items/1/get"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!([item(11, "Hit", 100)]), 1)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/items/2/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "StatusCode": 403,
            "Message": "Access denied."
        })))
        .mount(&server)
        .await;

    let engine = test_engine(&server.uri());
    let report = engine
        .multi_site_search(MultiSiteSearchParams {
            site_ids: vec![1, 2],
            search: "hit".to_string(),
            limit: None,
        })
        .await
        .unwrap();

    assert_eq!(report.sites.len(), 2);

    assert_eq!(report.sites[0].site_id, 1);
    assert!(report.sites[0].success);
    assert_eq!(report.sites[0].count, 1);

    assert_eq!(report.sites[1].site_id, 2);
    assert!(!report.sites[1].success);
    assert!(report.sites[1].results.is_empty());
    assert!(report.sites[1]
        .error
        .as_deref()
        .unwrap()
        .contains("Access denied."));

    assert_eq!(report.summary.total_sites, 2);
    assert_eq!(report.summary.successful_sites, 1);
    assert_eq!(report.summary.total_results, 1);
    assert_eq!(report.summary.sites_with_results, 1);
}

#[tokio::test]
async fn test_report_preserves_request_order_not_completion_order() {
    let server = MockServer::start().await;

    // The first-requested site answers last.
    Mock::given(method("POST"))
        .and(path("/api/items/5/get"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!([item(51, "Slow", 100)]), 1))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&server)
        .await;
    for site in [6u64, 7u64] {
        Mock::given(method("POST"))
            .and(path(format!("/api/items/{}/get", site)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(json!([item(site * 10, "Fast", 100)]), 1)),
            )
            .mount(&server)
            .await;
    }

    let engine = test_engine(&server.uri());
    let report = engine
        .multi_site_search(MultiSiteSearchParams {
            site_ids: vec![5, 6, 7],
            search: "anything".to_string(),
            limit: Some(10),
        })
        .await
        .unwrap();

    let order: Vec<u64> = report.sites.iter().map(|s| s.site_id).collect();
    assert_eq!(order, vec![5, 6, 7]);
    assert_eq!(report.summary.successful_sites, 3);
}

#[tokio::test]
async fn test_all_sites_failing_still_yields_full_report() {
    let engine = test_engine("http://127.0.0.1:1");
    let report = engine
        .multi_site_search(MultiSiteSearchParams {
            site_ids: vec![1, 2, 3],
            search: "x".to_string(),
            limit: None,
        })
        .await
        .unwrap();

    assert_eq!(report.sites.len(), 3);
    assert!(report.sites.iter().all(|s| !s.success));
    assert_eq!(report.summary.successful_sites, 0);
    assert_eq!(report.summary.total_results, 0);
}

#[tokio::test]
async fn test_input_validation() {
    let engine = test_engine("http://127.0.0.1:1");

    let empty_search = engine
        .multi_site_search(MultiSiteSearchParams {
            site_ids: vec![1],
            search: "   ".to_string(),
            limit: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(empty_search, GriddleError::Validation(_)));

    let too_many_sites = engine
        .multi_site_search(MultiSiteSearchParams {
            site_ids: (1..=11).collect(),
            search: "x".to_string(),
            limit: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(too_many_sites, GriddleError::Validation(_)));

    let no_sites = engine
        .multi_site_search(MultiSiteSearchParams {
            site_ids: vec![],
            search: "x".to_string(),
            limit: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(no_sites, GriddleError::Validation(_)));
}
