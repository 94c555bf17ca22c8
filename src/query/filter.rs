//! Translation of structured range filters into the tracker's
//! `ColumnFilterExpressions` grammar.
//!
//! The grammar expects one expression string per column, where a compound
//! range is the lower-bound clause immediately followed by the upper-bound
//! clause: `>=[StartTime]>='2024-01-01'<=[StartTime]<='2024-06-30'`.
//! Date bounds are quoted, numeric bounds are not.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Inclusive date bounds for one column. Either side may be open.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl DateRange {
    pub fn since(date: impl Into<String>) -> Self {
        DateRange {
            from: Some(date.into()),
            to: None,
        }
    }

    pub fn between(from: impl Into<String>, to: impl Into<String>) -> Self {
        DateRange {
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }
}

/// Inclusive numeric bounds for one column. Either side may be open.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NumericRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumericRange {
    pub fn at_least(min: f64) -> Self {
        NumericRange {
            min: Some(min),
            max: None,
        }
    }

    pub fn between(min: f64, max: f64) -> Self {
        NumericRange {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Build the per-column expression map for a set of range filters.
///
/// Pure and total: column names pass through verbatim (the remote service
/// decides what they mean), columns with no bounds contribute no entry, and
/// identical inputs always produce byte-identical expressions.
pub fn range_expressions(
    date_ranges: &IndexMap<String, DateRange>,
    numeric_ranges: &IndexMap<String, NumericRange>,
) -> IndexMap<String, String> {
    let mut expressions = IndexMap::new();

    for (column, range) in date_ranges {
        let mut expression = String::new();
        if let Some(from) = &range.from {
            expression.push_str(&format!(">=[{}]>='{}'", column, from));
        }
        if let Some(to) = &range.to {
            expression.push_str(&format!("<=[{}]<='{}'", column, to));
        }
        if !expression.is_empty() {
            expressions.insert(column.clone(), expression);
        }
    }

    for (column, range) in numeric_ranges {
        let mut expression = String::new();
        if let Some(min) = range.min {
            expression.push_str(&format!(">=[{}]>={}", column, min));
        }
        if let Some(max) = range.max {
            expression.push_str(&format!("<=[{}]<={}", column, max));
        }
        if !expression.is_empty() {
            expressions.insert(column.clone(), expression);
        }
    }

    expressions
}
