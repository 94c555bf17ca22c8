//! Consumer-facing operations composing the client, query builder, and
//! analytics into complete request/report cycles.
//!
//! Every operation validates its input before touching the network and
//! either returns a structured report or one typed error — partial
//! execution is never observable to the caller.

use chrono::{Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::summary::{summarize, GroupKey, StatusSummary};
use crate::analytics::trend::{analyze, AnalysisType, Period, TrendAnalysis};
use crate::client::TrackerClient;
use crate::config::ServiceConfig;
use crate::error::{GriddleError, Result};
use crate::query::filter::DateRange;
use crate::query::view::{FilterSpec, ItemQuery};
use crate::search::fanout::{search_many, FanOutReport};
use crate::search::fetch::fetch_page;
use crate::types::{ApiUsage, Item, ItemId, SiteId, SortDirection, STATUS_COMPLETED};

/// Default page size for plain item listing.
pub const DEFAULT_LIST_LIMIT: u64 = 50;
/// Default / maximum page size for advanced search.
pub const DEFAULT_SEARCH_LIMIT: u64 = 100;
pub const MAX_SEARCH_LIMIT: u64 = 1000;
/// Per-site defaults and caps for multi-site search.
pub const DEFAULT_FANOUT_LIMIT: u64 = 20;
pub const MAX_FANOUT_LIMIT: u64 = 100;
pub const MAX_FANOUT_SITES: usize = 10;
/// How many records one analytics pass pulls at most.
const ANALYSIS_PAGE_SIZE: u64 = 1000;
const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdvancedSearchParams {
    pub site_id: SiteId,
    #[serde(flatten)]
    pub filter: FilterSpec,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListItemsParams {
    pub site_id: SiteId,
    pub search: Option<String>,
    /// Pipe-delimited status alternation, e.g. `"100|200"`.
    pub status: Option<String>,
    pub assignee: Option<u64>,
    pub manager: Option<u64>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MultiSiteSearchParams {
    pub site_ids: Vec<SiteId>,
    pub search: String,
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysisParams {
    pub site_id: SiteId,
    pub analysis_type: AnalysisType,
    pub period: Period,
    pub group_by: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusSummaryParams {
    pub site_id: SiteId,
    pub group_by: Option<GroupKey>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSearchReport {
    pub results: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    /// Echo of the caller's filter description, for display alongside hits.
    pub search_conditions: FilterSpec,
    pub pagination: Pagination,
    pub api_usage: ApiUsage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItemsReport {
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
    pub pagination: Pagination,
    pub api_usage: ApiUsage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisWindow {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub analysis_type: AnalysisType,
    pub period: Period,
    pub date_range: AnalysisWindow,
    pub total_items: usize,
    pub analysis: TrendAnalysis,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    pub api_usage: ApiUsage,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteReport {
    pub item_id: ItemId,
    pub api_usage: ApiUsage,
}

/// The engine: one [`TrackerClient`] plus the operations built on it.
/// Holds no other state — every call stands alone.
#[derive(Debug, Clone)]
pub struct Engine {
    client: TrackerClient,
}

impl Engine {
    pub fn new(client: TrackerClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: ServiceConfig) -> Self {
        Self::new(TrackerClient::new(config))
    }

    pub fn client(&self) -> &TrackerClient {
        &self.client
    }

    /// Advanced search: typed filters translated to the remote grammar,
    /// one page fetched, conditions echoed back.
    pub async fn advanced_search(
        &self,
        params: AdvancedSearchParams,
    ) -> Result<AdvancedSearchReport> {
        ensure_site_id(params.site_id)?;
        let limit = params.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        ensure_limit(limit, MAX_SEARCH_LIMIT)?;

        let query = ItemQuery::new(
            params.filter.build_view(),
            params.offset.unwrap_or(0),
            limit,
        );
        let page = fetch_page(&self.client, params.site_id, &query).await?;

        tracing::info!(
            "advanced search on site {}: {} hits",
            params.site_id,
            page.items.len()
        );

        Ok(AdvancedSearchReport {
            results: page.items,
            total_count: page.total_count,
            search_conditions: params.filter,
            pagination: Pagination {
                offset: page.offset,
                limit: page.limit,
                has_more: page.has_more,
            },
            api_usage: page.api_usage,
        })
    }

    /// Plain listing with equality filters and sort only.
    pub async fn list_items(&self, params: ListItemsParams) -> Result<ListItemsReport> {
        ensure_site_id(params.site_id)?;
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        ensure_limit(limit, MAX_SEARCH_LIMIT)?;

        let mut spec = FilterSpec {
            search: params.search,
            sort_by: params.sort_by,
            sort_direction: params.sort_direction,
            ..Default::default()
        };
        if let Some(status) = params.status {
            spec.filters.insert("Status".to_string(), status);
        }
        if let Some(assignee) = params.assignee {
            spec.filters
                .insert("Owner".to_string(), assignee.to_string());
        }
        if let Some(manager) = params.manager {
            spec.filters
                .insert("Manager".to_string(), manager.to_string());
        }

        let query = ItemQuery::new(spec.build_view(), params.offset.unwrap_or(0), limit);
        let page = fetch_page(&self.client, params.site_id, &query).await?;

        Ok(ListItemsReport {
            pagination: Pagination {
                offset: page.offset,
                limit: page.limit,
                has_more: page.has_more,
            },
            items: page.items,
            total_count: page.total_count,
            api_usage: page.api_usage,
        })
    }

    /// The same free-text query across up to [`MAX_FANOUT_SITES`] sites,
    /// concurrently, with per-site failure isolation.
    pub async fn multi_site_search(&self, params: MultiSiteSearchParams) -> Result<FanOutReport> {
        if params.site_ids.is_empty() {
            return Err(GriddleError::Validation(
                "at least one site id is required".to_string(),
            ));
        }
        if params.site_ids.len() > MAX_FANOUT_SITES {
            return Err(GriddleError::Validation(format!(
                "at most {} sites per search, got {}",
                MAX_FANOUT_SITES,
                params.site_ids.len()
            )));
        }
        for &site_id in &params.site_ids {
            ensure_site_id(site_id)?;
        }
        if params.search.trim().is_empty() {
            return Err(GriddleError::Validation(
                "search text must not be empty".to_string(),
            ));
        }
        let limit = params.limit.unwrap_or(DEFAULT_FANOUT_LIMIT);
        ensure_limit(limit, MAX_FANOUT_LIMIT)?;

        Ok(search_many(&self.client, &params.site_ids, &params.search, limit).await)
    }

    /// Fetch the trailing window of records for one site and bucket them
    /// into a calendar-aligned series with a coarse trend direction.
    pub async fn trend_analysis(&self, params: TrendAnalysisParams) -> Result<TrendReport> {
        ensure_site_id(params.site_id)?;

        let today = Utc::now().date_naive();
        let from = window_start(today, params.period)
            .format("%Y-%m-%d")
            .to_string();
        let to = today.format("%Y-%m-%d").to_string();

        let mut spec = FilterSpec::default();
        if params.analysis_type == AnalysisType::Completion {
            spec.filters
                .insert("Status".to_string(), STATUS_COMPLETED.to_string());
        }
        spec.date_ranges.insert(
            params.analysis_type.date_column().to_string(),
            DateRange::since(from.clone()),
        );

        let query = ItemQuery::new(spec.build_view(), 0, ANALYSIS_PAGE_SIZE);
        let page = fetch_page(&self.client, params.site_id, &query).await?;
        let analysis = analyze(
            &page.items,
            params.analysis_type,
            params.period,
            params.group_by.as_deref(),
        );

        tracing::info!(
            "trend analysis on site {}: {} items, {} buckets",
            params.site_id,
            page.items.len(),
            analysis.time_series.len()
        );

        Ok(TrendReport {
            analysis_type: params.analysis_type,
            period: params.period,
            date_range: AnalysisWindow { from, to },
            total_items: page.items.len(),
            analysis,
        })
    }

    /// Per-group statistics over one site's current records.
    pub async fn status_summary(&self, params: StatusSummaryParams) -> Result<StatusSummary> {
        ensure_site_id(params.site_id)?;

        let query = ItemQuery::new(Default::default(), 0, ANALYSIS_PAGE_SIZE);
        let page = fetch_page(&self.client, params.site_id, &query).await?;

        Ok(summarize(&page.items, params.group_by.unwrap_or_default()))
    }

    pub async fn create_item(&self, site_id: SiteId, item: &Item) -> Result<MutationReport> {
        ensure_site_id(site_id)?;
        ensure_title(&item.title)?;

        let response = self.client.create_item(site_id, item).await?;
        Ok(MutationReport {
            api_usage: ApiUsage::from(&response),
            item: response.into_items().into_iter().next(),
        })
    }

    pub async fn update_item(&self, site_id: SiteId, item: &Item) -> Result<MutationReport> {
        ensure_site_id(site_id)?;
        if item.issue_id.is_none() {
            return Err(GriddleError::Validation(
                "update requires an item id".to_string(),
            ));
        }
        if !item.title.is_empty() {
            ensure_title(&item.title)?;
        }

        let response = self.client.update_item(site_id, item).await?;
        Ok(MutationReport {
            api_usage: ApiUsage::from(&response),
            item: response.into_items().into_iter().next(),
        })
    }

    pub async fn delete_item(&self, site_id: SiteId, item_id: ItemId) -> Result<DeleteReport> {
        ensure_site_id(site_id)?;
        if item_id == 0 {
            return Err(GriddleError::Validation(
                "item id must be positive".to_string(),
            ));
        }

        let response = self.client.delete_item(site_id, item_id).await?;
        Ok(DeleteReport {
            item_id,
            api_usage: ApiUsage::from(&response),
        })
    }
}

fn ensure_site_id(site_id: SiteId) -> Result<()> {
    if site_id == 0 {
        return Err(GriddleError::Validation(
            "site id must be positive".to_string(),
        ));
    }
    Ok(())
}

fn ensure_limit(limit: u64, max: u64) -> Result<()> {
    if limit == 0 || limit > max {
        return Err(GriddleError::Validation(format!(
            "limit must be between 1 and {}, got {}",
            max, limit
        )));
    }
    Ok(())
}

fn ensure_title(title: &str) -> Result<()> {
    if title.is_empty() {
        return Err(GriddleError::Validation(
            "title must not be empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(GriddleError::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

/// Start of the trailing analysis window: one period back from `today`.
fn window_start(today: NaiveDate, period: Period) -> NaiveDate {
    match period {
        Period::Week => today - chrono::Duration::days(7),
        Period::Month => today.checked_sub_months(Months::new(1)).unwrap_or(today),
        Period::Quarter => today.checked_sub_months(Months::new(3)).unwrap_or(today),
        Period::Year => today.checked_sub_months(Months::new(12)).unwrap_or(today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_start_per_period() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        assert_eq!(
            window_start(today, Period::Week),
            NaiveDate::from_ymd_opt(2024, 6, 8).unwrap()
        );
        assert_eq!(
            window_start(today, Period::Month),
            NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
        );
        assert_eq!(
            window_start(today, Period::Quarter),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
        assert_eq!(
            window_start(today, Period::Year),
            NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
        );
    }

    #[test]
    fn test_window_start_clamps_short_months() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(
            window_start(today, Period::Month),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_title_validation_counts_chars_not_bytes() {
        let ascii = "x".repeat(200);
        assert!(ensure_title(&ascii).is_ok());
        let wide = "課".repeat(200);
        assert!(ensure_title(&wide).is_ok());
        let too_long = "x".repeat(201);
        assert!(ensure_title(&too_long).is_err());
        assert!(ensure_title("").is_err());
    }

    #[test]
    fn test_limit_validation() {
        assert!(ensure_limit(1, MAX_SEARCH_LIMIT).is_ok());
        assert!(ensure_limit(1000, MAX_SEARCH_LIMIT).is_ok());
        assert!(ensure_limit(0, MAX_SEARCH_LIMIT).is_err());
        assert!(ensure_limit(1001, MAX_SEARCH_LIMIT).is_err());
    }
}
