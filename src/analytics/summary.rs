//! Grouped aggregates over a fetched record set.
//!
//! Groups a slice of items by one discrete key and reports per-group counts,
//! summed work value, mean progress, and completion ratio, plus a global
//! overview. Missing measures count as zero — including in the progress
//! mean's denominator, so an item with no `ProgressRate` pulls the average
//! down. That skew is part of the reported numbers' contract; do not "fix"
//! it without versioning the output.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::{Item, ItemId};

/// Discriminator used to partition a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupKey {
    Status,
    Assignee,
    Manager,
    ClassA,
    ClassB,
}

impl GroupKey {
    /// Extract the group label for one item. Absent values land in a fixed
    /// per-key sentinel group rather than erroring or vanishing.
    pub fn extract(&self, item: &Item) -> String {
        let non_empty = |v: &Option<String>, sentinel: &str| {
            v.clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| sentinel.to_string())
        };
        match self {
            GroupKey::Status => item
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            GroupKey::Assignee => item
                .owner
                .map(|o| o.to_string())
                .unwrap_or_else(|| "unassigned".to_string()),
            GroupKey::Manager => item
                .manager
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unassigned".to_string()),
            GroupKey::ClassA => non_empty(&item.class_a, "uncategorized"),
            GroupKey::ClassB => non_empty(&item.class_b, "uncategorized"),
        }
    }
}

impl Default for GroupKey {
    fn default() -> Self {
        GroupKey::Status
    }
}

/// A compact per-item line carried inside each group for display purposes.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItemDigest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub count: usize,
    pub total_work_value: f64,
    pub average_progress: f64,
    pub completed_count: usize,
    pub completion_rate: f64,
    pub items: Vec<ItemDigest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_completed: usize,
    /// `None` over an empty record set — the ratio is undefined there and
    /// callers must guard it themselves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_completion_rate: Option<f64>,
    pub total_work_value: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSummary {
    pub group_by: GroupKey,
    pub total_items: usize,
    pub group_count: usize,
    pub summary: IndexMap<String, GroupStats>,
    pub overview: Overview,
}

/// Group `items` by `group_by` and compute per-group and overall statistics.
///
/// Total across groups always equals `items.len()`; group order is first
/// appearance in the input. Never fails, including on an empty slice.
pub fn summarize(items: &[Item], group_by: GroupKey) -> StatusSummary {
    struct Accumulator {
        count: usize,
        total_work_value: f64,
        progress_sum: f64,
        completed_count: usize,
        items: Vec<ItemDigest>,
    }

    let mut groups: IndexMap<String, Accumulator> = IndexMap::new();

    for item in items {
        let key = group_by.extract(item);
        let entry = groups.entry(key).or_insert_with(|| Accumulator {
            count: 0,
            total_work_value: 0.0,
            progress_sum: 0.0,
            completed_count: 0,
            items: Vec::new(),
        });

        entry.count += 1;
        entry.total_work_value += item.work_value.unwrap_or(0.0);
        entry.progress_sum += item.progress_rate.unwrap_or(0.0);
        if item.is_completed() {
            entry.completed_count += 1;
        }
        entry.items.push(ItemDigest {
            id: item.issue_id,
            title: item.title.clone(),
            status: item.status,
            progress: item.progress_rate,
        });
    }

    let summary: IndexMap<String, GroupStats> = groups
        .into_iter()
        .map(|(key, acc)| {
            let count = acc.count;
            (
                key,
                GroupStats {
                    count,
                    total_work_value: acc.total_work_value,
                    average_progress: acc.progress_sum / count as f64,
                    completed_count: acc.completed_count,
                    completion_rate: acc.completed_count as f64 / count as f64 * 100.0,
                    items: acc.items,
                },
            )
        })
        .collect();

    let total_completed = summary.values().map(|g| g.completed_count).sum();
    let overview = Overview {
        total_completed,
        overall_completion_rate: if items.is_empty() {
            None
        } else {
            Some(total_completed as f64 / items.len() as f64 * 100.0)
        },
        total_work_value: items.iter().map(|i| i.work_value.unwrap_or(0.0)).sum(),
    };

    StatusSummary {
        group_by,
        total_items: items.len(),
        group_count: summary.len(),
        summary,
        overview,
    }
}
