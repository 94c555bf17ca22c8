//! Shared fixtures for the wiremock-backed integration suites.

#![allow(dead_code)]

use griddle::{Engine, ServiceConfig, TrackerClient};
use serde_json::{json, Value};

pub fn test_config(base_url: &str) -> ServiceConfig {
    let mut config = ServiceConfig::new(base_url, "test-key");
    // Keep rate-limit tests fast
    config.retry_backoff_ms = 10;
    config
}

pub fn test_client(base_url: &str) -> TrackerClient {
    TrackerClient::new(test_config(base_url))
}

pub fn test_engine(base_url: &str) -> Engine {
    Engine::from_config(test_config(base_url))
}

/// A successful response envelope wrapping `data`.
pub fn envelope(data: Value, total_count: u64) -> Value {
    json!({
        "Id": 0,
        "StatusCode": 200,
        "LimitPerDate": 10000,
        "LimitRemaining": 9987,
        "Response": {
            "Data": data,
            "TotalCount": total_count
        }
    })
}

pub fn item(id: u64, title: &str, status: i64) -> Value {
    json!({
        "IssueId": id,
        "Title": title,
        "Status": status,
        "ProgressRate": 0.0,
        "UpdatedTime": "2024-03-05 10:00:00",
        "CreatedTime": "2024-01-15 09:00:00"
    })
}
