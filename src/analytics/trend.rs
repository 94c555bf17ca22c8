//! Calendar-bucketed trend series over a record set.
//!
//! Each item is assigned to a bucket keyed by a deterministic string derived
//! from its analysis date and the requested period. Bucket keys sort
//! lexicographically in time order within a year, and the series is always
//! emitted in sorted key order, so the output is independent of input order.
//!
//! The "week" key is a week-of-month scheme (`2024-W2` = days 8..=14), not
//! ISO-8601 week numbering. Downstream consumers key off these exact
//! strings; the format is frozen.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::Item;

/// What aspect of the items' history is being analyzed. Selects the date
/// column used for bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisType {
    Completion,
    Creation,
    Update,
    Progress,
}

impl AnalysisType {
    /// `Creation` reads `CreatedTime`; everything else follows the latest
    /// touch via `UpdatedTime`.
    pub fn date_column(&self) -> &'static str {
        match self {
            AnalysisType::Creation => "CreatedTime",
            _ => "UpdatedTime",
        }
    }

    fn date_of<'a>(&self, item: &'a Item) -> Option<&'a str> {
        match self {
            AnalysisType::Creation => item.created_time.as_deref(),
            _ => item.updated_time.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    Week,
    Month,
    Quarter,
    Year,
}

/// One point of the emitted series.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimePoint {
    pub period: String,
    pub count: usize,
}

/// Per-group rollup when a secondary group-by column is requested.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendGroup {
    pub name: String,
    pub count: usize,
    pub average_progress: f64,
    pub completion_rate: f64,
}

/// Coarse direction summary of the series.
///
/// `increasing` compares the mean bucket count of the later half of the
/// key-sorted series against the earlier half — a two-half slope estimate,
/// not a statistical trend test. Fewer than two buckets reads as not
/// increasing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    pub increasing: bool,
    pub peak: usize,
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub groups: Vec<TrendGroup>,
    pub time_series: Vec<TimePoint>,
    pub trends: Trends,
}

/// Parse the tracker's timestamp spellings. The service emits local-format
/// strings; clients may also hand in bare dates.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for format in [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Bucket key for one date under the given period granularity.
pub fn bucket_key(date: NaiveDate, period: Period) -> String {
    match period {
        Period::Week => format!("{}-W{}", date.year(), (date.day() + 6) / 7),
        Period::Month => format!("{}-{:02}", date.year(), date.month()),
        Period::Quarter => format!("{}-Q{}", date.year(), (date.month() + 2) / 3),
        Period::Year => date.year().to_string(),
    }
}

/// Bucket `items` into a sorted time series and derive the trend summary,
/// optionally rolling up by a secondary column.
///
/// Items whose analysis date is missing or unparsable are silently excluded
/// from the series (they still count toward the group rollups). Never fails.
pub fn analyze(
    items: &[Item],
    analysis_type: AnalysisType,
    period: Period,
    group_by: Option<&str>,
) -> TrendAnalysis {
    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for item in items {
        let Some(raw) = analysis_type.date_of(item) else {
            continue;
        };
        let Some(timestamp) = parse_timestamp(raw) else {
            continue;
        };
        *buckets
            .entry(bucket_key(timestamp.date(), period))
            .or_insert(0) += 1;
    }

    let time_series: Vec<TimePoint> = buckets
        .iter()
        .map(|(period, &count)| TimePoint {
            period: period.clone(),
            count,
        })
        .collect();

    let counts: Vec<usize> = buckets.values().copied().collect();
    let trends = Trends {
        increasing: is_increasing(&counts),
        peak: counts.iter().copied().max().unwrap_or(0),
        average: if counts.is_empty() {
            0.0
        } else {
            counts.iter().sum::<usize>() as f64 / counts.len() as f64
        },
    };

    TrendAnalysis {
        groups: group_rollups(items, group_by),
        time_series,
        trends,
    }
}

/// Two-half slope estimate over the key-sorted bucket counts.
fn is_increasing(counts: &[usize]) -> bool {
    if counts.len() < 2 {
        return false;
    }
    let midpoint = counts.len() / 2;
    let (earlier, later) = counts.split_at(midpoint);
    let mean = |half: &[usize]| half.iter().sum::<usize>() as f64 / half.len() as f64;
    mean(later) > mean(earlier)
}

fn group_rollups(items: &[Item], group_by: Option<&str>) -> Vec<TrendGroup> {
    struct Accumulator {
        count: usize,
        progress_sum: f64,
        completed: usize,
    }

    let mut groups: indexmap::IndexMap<String, Accumulator> = indexmap::IndexMap::new();
    for item in items {
        let name = match group_by {
            Some(column) => item
                .column(column)
                .unwrap_or_else(|| "unknown".to_string()),
            None => "all".to_string(),
        };
        let entry = groups.entry(name).or_insert_with(|| Accumulator {
            count: 0,
            progress_sum: 0.0,
            completed: 0,
        });
        entry.count += 1;
        entry.progress_sum += item.progress_rate.unwrap_or(0.0);
        if item.is_completed() {
            entry.completed += 1;
        }
    }

    groups
        .into_iter()
        .map(|(name, acc)| TrendGroup {
            name,
            count: acc.count,
            average_progress: acc.progress_sum / acc.count as f64,
            completion_rate: acc.completed as f64 / acc.count as f64 * 100.0,
        })
        .collect()
}
