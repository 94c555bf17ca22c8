use serde::Serialize;

use crate::client::TrackerClient;
use crate::error::Result;
use crate::query::ItemQuery;
use crate::types::{ApiUsage, Item, SiteId};

/// One fetched page of items plus pagination state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    pub offset: u64,
    pub limit: u64,
    /// Heuristic: a full page suggests more results. A site with an exact
    /// multiple of `limit` remaining records makes this a false positive, so
    /// treat it as a hint, not a guarantee — `total_count` is authoritative
    /// when the service supplies it.
    pub has_more: bool,
    pub api_usage: ApiUsage,
}

/// Fetch a single page from one site. Exactly one network call; any
/// transport or remote failure propagates untouched (rate-limit retries are
/// the transport client's business).
pub async fn fetch_page(
    client: &TrackerClient,
    site_id: SiteId,
    query: &ItemQuery,
) -> Result<Page> {
    let response = client.get_items(site_id, &query.to_request()).await?;
    let api_usage = ApiUsage::from(&response);
    let (items, total_count) = match response.response {
        Some(body) => (body.data, body.total_count),
        None => (Vec::new(), None),
    };

    tracing::debug!(
        "site {}: fetched {} items (offset {}, limit {})",
        site_id,
        items.len(),
        query.offset,
        query.limit
    );

    Ok(Page {
        has_more: items.len() as u64 == query.limit,
        items,
        total_count,
        offset: query.offset,
        limit: query.limit,
        api_usage,
    })
}
