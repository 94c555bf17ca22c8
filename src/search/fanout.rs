//! Concurrent multi-site search with per-site failure isolation.
//!
//! One fetch task per site, all dispatched at once and all awaited to
//! settlement: a site that errors produces a failure entry instead of
//! aborting the batch, and a slow site delays only the combined report, not
//! its siblings. Results are re-sorted into the caller-supplied site order
//! because task completion order is arbitrary.

use serde::Serialize;

use crate::client::TrackerClient;
use crate::types::{Item, SiteId};

/// Outcome for one site: items on success, the failure message otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSearchResult {
    pub site_id: SiteId,
    pub success: bool,
    pub results: Vec<Item>,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SiteSearchResult {
    fn success(site_id: SiteId, results: Vec<Item>) -> Self {
        SiteSearchResult {
            site_id,
            success: true,
            count: results.len(),
            results,
            error: None,
        }
    }

    fn failure(site_id: SiteId, error: String) -> Self {
        SiteSearchResult {
            site_id,
            success: false,
            results: Vec::new(),
            count: 0,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutSummary {
    pub total_sites: usize,
    pub successful_sites: usize,
    pub total_results: usize,
    pub sites_with_results: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FanOutReport {
    pub search_term: String,
    pub sites: Vec<SiteSearchResult>,
    pub summary: FanOutSummary,
}

/// Run the same free-text search against every site concurrently.
///
/// Never fails as a whole: each site's entry reports its own success or
/// failure, and the report lists exactly one entry per requested site, in
/// request order.
pub async fn search_many(
    client: &TrackerClient,
    site_ids: &[SiteId],
    search: &str,
    per_site_limit: u64,
) -> FanOutReport {
    let mut join_set = tokio::task::JoinSet::new();
    for (index, &site_id) in site_ids.iter().enumerate() {
        let client = client.clone();
        let search = search.to_string();
        join_set.spawn(async move {
            let outcome = client.search_items(site_id, &search, per_site_limit).await;
            (index, site_id, outcome)
        });
    }

    let mut indexed: Vec<(usize, SiteSearchResult)> = Vec::with_capacity(site_ids.len());
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((index, site_id, Ok(items))) => {
                indexed.push((index, SiteSearchResult::success(site_id, items)));
            }
            Ok((index, site_id, Err(e))) => {
                tracing::warn!("site {} search failed: {}", site_id, e);
                indexed.push((index, SiteSearchResult::failure(site_id, e.to_string())));
            }
            Err(e) => {
                // A panicked task loses its index tag; recover it by position.
                tracing::error!("search task panicked: {}", e);
            }
        }
    }

    // Restore caller-supplied site order; completion order is meaningless.
    indexed.sort_by_key(|(index, _)| *index);
    let mut sites: Vec<SiteSearchResult> = indexed.into_iter().map(|(_, site)| site).collect();

    // Tasks lost to a panic still owe the caller an entry per site.
    if sites.len() < site_ids.len() {
        for (position, &site_id) in site_ids.iter().enumerate() {
            if sites.get(position).map(|s| s.site_id) != Some(site_id) {
                sites.insert(
                    position,
                    SiteSearchResult::failure(site_id, "search task aborted".to_string()),
                );
            }
        }
    }

    let summary = FanOutSummary {
        total_sites: site_ids.len(),
        successful_sites: sites.iter().filter(|s| s.success).count(),
        total_results: sites.iter().map(|s| s.count).sum(),
        sites_with_results: sites.iter().filter(|s| s.count > 0).count(),
    };

    FanOutReport {
        search_term: search.to_string(),
        sites,
        summary,
    }
}
