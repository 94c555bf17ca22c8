use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Site (project) identifier — an opaque positive integer scoping all item
/// operations. Never cached or validated by this crate.
pub type SiteId = u64;
/// Item identifier, unique within a single site only.
pub type ItemId = u64;

/// Wire protocol version attached to every outgoing payload.
pub const API_VERSION: f64 = 1.0;
/// The one status value the engine treats specially: "complete".
pub const STATUS_COMPLETED: i64 = 900;
/// Conventional pipe-delimited alternation for "still open" statuses.
pub const OPEN_STATUSES: &str = "100|200|300";

/// A trackable item as the remote service serializes it (PascalCase fields).
///
/// Everything except `Title` is optional on the wire; `Status` is an open
/// integer enumeration (100=not-started … 900=completed) and only
/// [`STATUS_COMPLETED`] carries meaning for the analytics here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct Item {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<ItemId>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_work_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_a: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_b: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_c: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_a: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_b: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_c: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_a: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_b: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_c: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updator: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl Item {
    pub fn is_completed(&self) -> bool {
        self.status == Some(STATUS_COMPLETED)
    }

    /// Read a discrete column by its wire name, as a display string.
    ///
    /// Used by the trend analyzer's free-form group-by. Unknown columns and
    /// empty values return `None`; the caller supplies its own sentinel.
    pub fn column(&self, name: &str) -> Option<String> {
        let non_empty = |s: &Option<String>| s.clone().filter(|v| !v.is_empty());
        match name {
            "Status" => self.status.map(|v| v.to_string()),
            "Owner" => self.owner.map(|v| v.to_string()),
            "Manager" => self.manager.map(|v| v.to_string()),
            "Creator" => self.creator.map(|v| v.to_string()),
            "Updator" => self.updator.map(|v| v.to_string()),
            "ClassA" => non_empty(&self.class_a),
            "ClassB" => non_empty(&self.class_b),
            "ClassC" => non_empty(&self.class_c),
            "Title" => Some(self.title.clone()).filter(|v| !v.is_empty()),
            _ => None,
        }
    }
}

/// Sort direction for `ColumnSorterHash` entries. The engine defaults to
/// descending whenever a sort field is given without a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The remote service's `View` clause: one fully-assembled, immutable filter
/// description sent with an item listing request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct View {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_filter_hash: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_filter_expressions: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_sorter_hash: Option<IndexMap<String, SortDirection>>,
}

impl View {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.column_filter_hash.is_none()
            && self.column_filter_expressions.is_none()
            && self.column_sorter_hash.is_none()
    }
}

/// Body of an item listing request. `ApiKey` and `ApiVersion` are attached by
/// the transport client, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase", default)]
pub struct GetItemsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<View>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u64>,
}

/// Response envelope shared by every item-store endpoint.
///
/// The service reports failures both ways: an HTTP error status, or HTTP 200
/// with a body `StatusCode >= 400` and a human-readable `Message`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApiResponse {
    pub id: Option<u64>,
    pub status_code: Option<i64>,
    pub limit_per_date: Option<u64>,
    pub limit_remaining: Option<u64>,
    pub message: Option<String>,
    pub response: Option<ResponseBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResponseBody {
    pub data: Vec<Item>,
    pub total_count: Option<u64>,
}

impl ApiResponse {
    /// Items carried in the envelope, empty when the call returned none.
    pub fn into_items(self) -> Vec<Item> {
        self.response.map(|r| r.data).unwrap_or_default()
    }
}

/// Daily call-quota metadata the service attaches to every response, passed
/// through to callers unmodified.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_calls: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<u64>,
}

impl From<&ApiResponse> for ApiUsage {
    fn from(response: &ApiResponse) -> Self {
        ApiUsage {
            remaining_calls: response.limit_remaining,
            daily_limit: response.limit_per_date,
        }
    }
}
