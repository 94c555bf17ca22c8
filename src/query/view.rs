use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::filter::{range_expressions, DateRange, NumericRange};
use crate::types::{GetItemsRequest, SortDirection, View};

/// A fully-specified, caller-supplied filter description.
///
/// This is the typed front door for advanced search: free text, equality
/// filters (pipe-delimited alternations like `"100|200|300"`), per-column
/// date and numeric ranges, and an optional sort. [`FilterSpec::build_view`]
/// assembles the whole thing into one immutable [`View`] value in a single
/// pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub date_ranges: IndexMap<String, DateRange>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub numeric_ranges: IndexMap<String, NumericRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
}

impl FilterSpec {
    /// Assemble the remote `View` clause for this description.
    ///
    /// Equality filters are forwarded unchanged; range maps go through
    /// [`range_expressions`]; a sort field without a direction defaults to
    /// descending. Never fails: empty sections are simply omitted.
    pub fn build_view(&self) -> View {
        let search = self
            .search
            .clone()
            .filter(|s| !s.trim().is_empty());

        let column_filter_hash = if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.clone())
        };

        let expressions = range_expressions(&self.date_ranges, &self.numeric_ranges);
        let column_filter_expressions = if expressions.is_empty() {
            None
        } else {
            Some(expressions)
        };

        let column_sorter_hash = self.sort_by.as_ref().map(|field| {
            let mut sorter = IndexMap::new();
            sorter.insert(
                field.clone(),
                self.sort_direction.unwrap_or(SortDirection::Desc),
            );
            sorter
        });

        View {
            search,
            column_filter_hash,
            column_filter_expressions,
            column_sorter_hash,
        }
    }
}

/// One page worth of query: an assembled [`View`] plus pagination.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemQuery {
    pub view: View,
    pub offset: u64,
    pub limit: u64,
}

impl ItemQuery {
    pub fn new(view: View, offset: u64, limit: u64) -> Self {
        ItemQuery {
            view,
            offset,
            limit,
        }
    }

    pub fn to_request(&self) -> GetItemsRequest {
        GetItemsRequest {
            view: if self.view.is_empty() {
                None
            } else {
                Some(self.view.clone())
            },
            offset: Some(self.offset),
            page_size: Some(self.limit),
        }
    }
}
