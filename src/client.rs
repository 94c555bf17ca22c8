//! HTTP transport for the tracker's item-store API.
//!
//! Every endpoint is a JSON POST. The client attaches the API key and
//! protocol version to each payload, applies the configured timeout, and
//! absorbs rate-limit responses by retrying with a fixed backoff until the
//! per-call retry budget runs out. Remote failures keep the service's own
//! message: the API reports errors both as HTTP error statuses and as
//! HTTP 200 envelopes with a body `StatusCode >= 400`.

use std::time::Duration;

use crate::config::ServiceConfig;
use crate::error::{GriddleError, Result};
use crate::types::{
    ApiResponse, GetItemsRequest, Item, ItemId, SiteId, View, API_VERSION, OPEN_STATUSES,
};

/// Client for one tracker instance. Cheap to clone; safe to share across
/// concurrent calls (all methods take `&self`, retry state is per-call).
#[derive(Debug, Clone)]
pub struct TrackerClient {
    http: reqwest::Client,
    config: ServiceConfig,
}

impl TrackerClient {
    pub fn new(config: ServiceConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("griddle/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { http, config }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// POST `payload` to `endpoint` with credentials attached.
    ///
    /// A 429 response consumes one unit of the retry budget (copied from the
    /// config per call) after a fixed backoff; once the budget is spent the
    /// rate-limit failure propagates like any other.
    pub async fn post(&self, endpoint: &str, payload: serde_json::Value) -> Result<ApiResponse> {
        let mut payload = payload;
        let body = payload.as_object_mut().ok_or_else(|| {
            GriddleError::Validation("request payload must be a JSON object".to_string())
        })?;
        body.insert("ApiVersion".to_string(), serde_json::json!(API_VERSION));
        body.insert(
            "ApiKey".to_string(),
            serde_json::Value::String(self.config.api_key.clone()),
        );

        let url = format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );
        let request_id = format!("req_gr_{}", uuid::Uuid::new_v4());
        let mut budget = self.config.retry_budget;

        loop {
            tracing::debug!("[{}] POST {}", request_id, endpoint);
            let response = self
                .http
                .post(&url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| {
                    GriddleError::Transport(format!("request to {} failed: {}", endpoint, e))
                })?;

            let status = response.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS && budget > 0 {
                budget -= 1;
                tracing::warn!(
                    "[{}] rate limited on {}, retrying in {}ms ({} retries left)",
                    request_id,
                    endpoint,
                    self.config.retry_backoff_ms,
                    budget
                );
                tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                continue;
            }

            let text = response.text().await.map_err(|e| {
                GriddleError::Transport(format!("failed to read response from {}: {}", endpoint, e))
            })?;

            if !status.is_success() {
                // Prefer the service's structured message over the bare status
                if let Ok(envelope) = serde_json::from_str::<ApiResponse>(&text) {
                    if let Some(message) = envelope.message {
                        return Err(GriddleError::RemoteApi {
                            status_code: envelope
                                .status_code
                                .unwrap_or_else(|| i64::from(status.as_u16())),
                            message,
                        });
                    }
                }
                return Err(GriddleError::Transport(format!(
                    "HTTP {} from {}",
                    status, endpoint
                )));
            }

            let envelope: ApiResponse = serde_json::from_str(&text).map_err(|e| {
                GriddleError::Json(format!("invalid response from {}: {}", endpoint, e))
            })?;

            if let Some(code) = envelope.status_code {
                if code >= 400 {
                    let message = envelope
                        .message
                        .unwrap_or_else(|| "no message supplied".to_string());
                    tracing::warn!("[{}] {} returned API error {}", request_id, endpoint, code);
                    return Err(GriddleError::RemoteApi {
                        status_code: code,
                        message,
                    });
                }
            }

            return Ok(envelope);
        }
    }

    /// List items of one site according to `request`.
    pub async fn get_items(
        &self,
        site_id: SiteId,
        request: &GetItemsRequest,
    ) -> Result<ApiResponse> {
        let payload = serde_json::to_value(request)?;
        self.post(&format!("/api/items/{}/get", site_id), payload)
            .await
    }

    pub async fn create_item(&self, site_id: SiteId, item: &Item) -> Result<ApiResponse> {
        let payload = serde_json::to_value(item)?;
        self.post(&format!("/api/items/{}/create", site_id), payload)
            .await
    }

    /// Update an item in place. `item.issue_id` selects the target record.
    pub async fn update_item(&self, site_id: SiteId, item: &Item) -> Result<ApiResponse> {
        let payload = serde_json::to_value(item)?;
        self.post(&format!("/api/items/{}/update", site_id), payload)
            .await
    }

    pub async fn delete_item(&self, site_id: SiteId, item_id: ItemId) -> Result<ApiResponse> {
        let payload = serde_json::json!({ "IssueId": item_id });
        self.post(&format!("/api/items/{}/delete", site_id), payload)
            .await
    }

    /// Full-text search over one site, returning at most `limit` items.
    pub async fn search_items(
        &self,
        site_id: SiteId,
        search: &str,
        limit: u64,
    ) -> Result<Vec<Item>> {
        let request = GetItemsRequest {
            view: Some(View {
                search: Some(search.to_string()),
                ..Default::default()
            }),
            page_size: Some(limit),
            ..Default::default()
        };
        Ok(self.get_items(site_id, &request).await?.into_items())
    }

    /// Look one item up by id via an equality filter. `None` when absent.
    pub async fn get_item_by_id(
        &self,
        site_id: SiteId,
        item_id: ItemId,
    ) -> Result<Option<Item>> {
        let mut hash = indexmap::IndexMap::new();
        hash.insert("IssueId".to_string(), item_id.to_string());
        let request = GetItemsRequest {
            view: Some(View {
                column_filter_hash: Some(hash),
                ..Default::default()
            }),
            page_size: Some(1),
            ..Default::default()
        };
        Ok(self
            .get_items(site_id, &request)
            .await?
            .into_items()
            .into_iter()
            .next())
    }

    /// Items still in an open status (`"100|200|300"`).
    pub async fn open_items(&self, site_id: SiteId) -> Result<Vec<Item>> {
        self.items_filtered(site_id, "Status", OPEN_STATUSES).await
    }

    /// Items assigned to one owner.
    pub async fn items_by_owner(&self, site_id: SiteId, user_id: u64) -> Result<Vec<Item>> {
        self.items_filtered(site_id, "Owner", &user_id.to_string())
            .await
    }

    async fn items_filtered(
        &self,
        site_id: SiteId,
        column: &str,
        value: &str,
    ) -> Result<Vec<Item>> {
        let mut hash = indexmap::IndexMap::new();
        hash.insert(column.to_string(), value.to_string());
        let request = GetItemsRequest {
            view: Some(View {
                column_filter_hash: Some(hash),
                ..Default::default()
            }),
            ..Default::default()
        };
        Ok(self.get_items(site_id, &request).await?.into_items())
    }

    /// Cheap connectivity probe against the users endpoint.
    pub async fn health_check(&self) -> bool {
        let payload = serde_json::json!({ "PageSize": 1 });
        match self.post("/api/users/get", payload).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("health check failed: {}", e);
                false
            }
        }
    }
}
